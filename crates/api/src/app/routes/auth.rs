use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

/// Open route: self-registration. New accounts await admin approval.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services
        .register(&body.name, &body.username, &body.password)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(dto::UserView::from(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Open route: exchange credentials for a session token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.username, &body.password).await {
        Ok(session) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": session.token.to_string(),
                "user": dto::UserView::from(&session.user),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Close the session; its cart goes with it.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    services.logout(current.token());
    StatusCode::NO_CONTENT.into_response()
}

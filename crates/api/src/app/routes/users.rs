use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use almox_core::UserId;

use crate::app::services::{AppServices, UserUpdate};
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", put(update_user).delete(delete_user))
}

fn parse_id(id: &str) -> Result<UserId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&current) {
        return resp;
    }
    match services.users().await {
        Ok(users) => {
            let items: Vec<dto::UserView> = users.iter().map(dto::UserView::from).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Approve pending accounts, change roles, reset passwords. The username
/// itself is immutable.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UserUpdateRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&current) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let update = UserUpdate {
        name: body.name,
        password: body.password,
        role: body.role,
        status: body.status,
    };
    match services.update_user(id, update).await {
        Ok(user) => (StatusCode::OK, Json(dto::UserView::from(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&current) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_user(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

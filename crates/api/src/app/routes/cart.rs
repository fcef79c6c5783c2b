use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use almox_core::ProductId;

use crate::app::services::{AppServices, ServiceError};
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(view_cart).delete(clear_cart))
        .route("/items", post(apply_delta))
        .route("/items/:product_id", delete(remove_item))
        .route("/checkout", post(checkout))
}

pub async fn view_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    let cart = services.cart(current.token());
    (StatusCode::OK, Json(dto::CartView::from(&cart))).into_response()
}

/// Merge a quantity delta into the session cart.
pub async fn apply_delta(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CartDeltaRequest>,
) -> axum::response::Response {
    match services
        .cart_apply(current.token(), body.product_id, body.delta)
        .await
    {
        Ok(cart) => (StatusCode::OK, Json(dto::CartView::from(&cart))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    let cart = services.cart_remove(current.token(), product_id);
    (StatusCode::OK, Json(dto::CartView::from(&cart))).into_response()
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    services.cart_clear(current.token());
    StatusCode::NO_CONTENT.into_response()
}

/// Submit the cart: persist requisition + movements + stock, hand back the
/// messaging deep link. On persistence failure the cart is kept so the user
/// can retry.
pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    match services.checkout(current.session()).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "requisition": outcome.requisition,
                "message": outcome.message,
                "whatsapp_link": outcome.link.to_string(),
            })),
        )
            .into_response(),
        Err(ServiceError::Domain(e)) => errors::domain_error_to_response(e),
        Err(ServiceError::Store(e)) => {
            tracing::error!(error = %e, "checkout write failed; cart kept");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "checkout_failed",
                "checkout failed, your cart was kept",
            )
        }
    }
}

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::get};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_catalog))
}

/// Products ordered by name, each with its derived whole-unit availability.
pub async fn list_catalog(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().await {
        Ok(products) => {
            let items: Vec<dto::CatalogEntry> =
                products.into_iter().map(dto::CatalogEntry::from).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

use axum::{Router, routing::post};

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod movements;
pub mod products;
pub mod requisitions;
pub mod system;
pub mod users;

/// Protected router (everything behind the session middleware).
pub fn router() -> Router {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/cart", cart::router())
        .nest("/products", products::router())
        .nest("/requisitions", requisitions::router())
        .nest("/movements", movements::router())
        .nest("/users", users::router())
        .route("/auth/logout", post(auth::logout))
}

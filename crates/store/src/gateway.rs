use async_trait::async_trait;
use thiserror::Error;

use almox_auth::User;
use almox_catalog::Product;
use almox_requisition::{Requisition, StockMovement};

/// Persistence-layer error.
///
/// Callers surface these as one generic failure; the variants exist for
/// logging, not for user-facing differentiation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Contract with the persistence backend.
///
/// Products and users are read and written as whole lists (replace-on-write);
/// requisitions and movements are append-only. Each method is an independent
/// operation: there is no transaction spanning several calls, and a sequence
/// of writes can partially succeed.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// All products, ordered by name.
    async fn products(&self) -> StoreResult<Vec<Product>>;

    /// Replace the full product list.
    async fn replace_products(&self, products: Vec<Product>) -> StoreResult<()>;

    /// All user accounts.
    async fn users(&self) -> StoreResult<Vec<User>>;

    /// Replace the full user list.
    async fn replace_users(&self, users: Vec<User>) -> StoreResult<()>;

    /// All requisitions, newest first.
    async fn requisitions(&self) -> StoreResult<Vec<Requisition>>;

    /// Append one requisition.
    async fn append_requisition(&self, requisition: Requisition) -> StoreResult<()>;

    /// All stock movements, newest first.
    async fn movements(&self) -> StoreResult<Vec<StockMovement>>;

    /// Append a batch of stock movements.
    async fn append_movements(&self, movements: Vec<StockMovement>) -> StoreResult<()>;
}

//! `almox-store` — the persistence gateway seam.
//!
//! The application owns only transient copies of its entities; everything is
//! stored through the [`Gateway`] trait. The in-memory implementation backs
//! tests and development; a Postgres implementation lives behind the
//! `postgres` feature.

pub mod gateway;
pub mod images;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use gateway::{Gateway, StoreError, StoreResult};
pub use images::{ImageStore, InMemoryImageStore};
pub use memory::InMemoryGateway;
#[cfg(feature = "postgres")]
pub use postgres::PostgresGateway;

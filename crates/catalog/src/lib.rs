//! `almox-catalog` — product catalog domain.
//!
//! Products track stock in a base unit (e.g. liters) and are displayed and
//! requested in a delivery unit related to it by a conversion factor.

pub mod product;

pub use product::{
    Product, ProductDraft, ProductStatus, ProductUnit, remove_product, upsert_product,
};

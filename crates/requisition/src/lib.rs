//! `almox-requisition` — cart aggregation and the checkout workflow.
//!
//! The cart lives only for the duration of a login session. Checkout is split
//! in two: a pure planning step here (requisition + movements + post-checkout
//! stock), and the persistence/notification orchestration in the API layer.

pub mod cart;
pub mod checkout;

pub use cart::{Cart, CartLine};
pub use checkout::{
    CheckoutPlan, MovementKind, Requisition, RequisitionItem, StockMovement, plan_checkout,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use almox_catalog::{Product, ProductUnit};
use almox_core::{DomainError, DomainResult, MovementId, ProductId, RequisitionId, UserId};

use crate::cart::Cart;

/// One line of a submitted requisition.
///
/// Name and unit are snapshotted at submission time so later product edits
/// cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit: ProductUnit,
}

/// A submitted, immutable requisition tied to one user and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: RequisitionId,
    pub user_id: UserId,
    pub user_name: String,
    pub items: Vec<RequisitionItem>,
    pub timestamp: DateTime<Utc>,
}

/// Direction of a stock ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

/// Immutable ledger entry recording one stock change, in delivery units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub product_name: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub user_id: UserId,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything checkout wants persisted, computed up front.
///
/// The caller issues the three writes independently; they are not a
/// transaction and can partially succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub requisition: Requisition,
    pub movements: Vec<StockMovement>,
    pub updated_products: Vec<Product>,
}

/// Plan a checkout: build the requisition, one OUT movement per cart line,
/// and the post-checkout product list.
///
/// Pure with respect to its inputs; nothing is persisted here. Stock is
/// decremented by `quantity * conversion_factor` base units and may go
/// negative when concurrent checkouts race (accepted, not guarded).
pub fn plan_checkout(
    cart: &Cart,
    user_id: UserId,
    user_name: &str,
    products: &[Product],
    now: DateTime<Utc>,
) -> DomainResult<CheckoutPlan> {
    if cart.is_empty() {
        return Err(DomainError::invariant("cart is empty"));
    }

    let requisition = Requisition {
        id: RequisitionId::new(),
        user_id,
        user_name: user_name.to_string(),
        items: cart
            .lines()
            .iter()
            .map(|l| RequisitionItem {
                product_id: l.product_id,
                product_name: l.product.name.clone(),
                quantity: l.quantity,
                unit: l.product.unit,
            })
            .collect(),
        timestamp: now,
    };

    let movements = cart
        .lines()
        .iter()
        .map(|l| StockMovement {
            id: MovementId::new(),
            product_id: l.product_id,
            product_name: l.product.name.clone(),
            kind: MovementKind::Out,
            quantity: l.quantity,
            user_id,
            user_name: user_name.to_string(),
            timestamp: now,
        })
        .collect();

    let updated_products = products
        .iter()
        .map(|p| match cart.lines().iter().find(|l| l.product_id == p.id) {
            Some(line) => {
                let mut updated = p.clone();
                updated.stock -= p.base_units_for(line.quantity);
                updated.updated_at = now;
                updated
            }
            None => p.clone(),
        })
        .collect();

    Ok(CheckoutPlan {
        requisition,
        movements,
        updated_products,
    })
}

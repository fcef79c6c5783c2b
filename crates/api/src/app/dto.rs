//! Request/response DTOs and JSON mapping helpers.

use serde::{Deserialize, Serialize};

use almox_auth::{Role, User, UserStatus};
use almox_catalog::Product;
use almox_core::ProductId;
use almox_requisition::{Cart, CartLine};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User view without the password field.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: almox_core::UserId,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            username: u.username.clone(),
            role: u.role,
            status: u.status,
        }
    }
}

/// Catalog entry: the product plus its derived whole-unit availability.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,
    pub units_available: i64,
}

impl From<Product> for CatalogEntry {
    fn from(product: Product) -> Self {
        let units_available = product.units_available();
        Self {
            product,
            units_available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartDeltaRequest {
    pub product_id: ProductId,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
        }
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product.name.clone(),
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

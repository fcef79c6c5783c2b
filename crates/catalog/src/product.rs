use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use almox_core::{DomainError, DomainResult, ProductId};

/// Delivery unit a product is requested in.
///
/// Wire tokens match the historical catalog data ("pç" included), so renames
/// here are load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductUnit {
    #[serde(rename = "un")]
    Un,
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "cx")]
    Cx,
    #[serde(rename = "pç")]
    Pc,
    #[serde(rename = "mt")]
    Mt,
    #[serde(rename = "lt")]
    Lt,
}

impl core::fmt::Display for ProductUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Uppercased form used in requisition summaries.
        let s = match self {
            ProductUnit::Un => "UN",
            ProductUnit::Kg => "KG",
            ProductUnit::Cx => "CX",
            ProductUnit::Pc => "PÇ",
            ProductUnit::Mt => "MT",
            ProductUnit::Lt => "LT",
        };
        f.write_str(s)
    }
}

/// Product visibility lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

/// Catalog product.
///
/// `stock` is tracked in base units (e.g. liters); the catalog displays
/// `units_available()`, i.e. whole delivery units, derived via the
/// conversion factor (base units per delivery unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub stock: f64,
    pub unit: ProductUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_factor: Option<f64>,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Effective conversion factor. A missing, zero, negative or non-finite
    /// factor falls back to 1 (no error case).
    pub fn effective_factor(&self) -> f64 {
        match self.conversion_factor {
            Some(f) if f.is_finite() && f > 0.0 => f,
            _ => 1.0,
        }
    }

    /// Whole delivery units available: `floor(stock / factor)`.
    ///
    /// Negative stock (accepted lost-update outcome) yields a negative count.
    pub fn units_available(&self) -> i64 {
        (self.stock / self.effective_factor()).floor() as i64
    }

    /// Base units consumed by `quantity` delivery units.
    pub fn base_units_for(&self, quantity: i64) -> f64 {
        quantity as f64 * self.effective_factor()
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Typed payload for creating or editing a product.
///
/// Every field the admin form can set is enumerated here; there is no
/// loosely-typed pass-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: String,
    #[serde(default)]
    pub internal_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub stock: f64,
    pub unit: ProductUnit,
    #[serde(default)]
    pub conversion_factor: Option<f64>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductDraft {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if !self.stock.is_finite() {
            return Err(DomainError::validation("stock must be a finite number"));
        }
        if let Some(f) = self.conversion_factor {
            if !f.is_finite() {
                return Err(DomainError::validation(
                    "conversion factor must be a finite number",
                ));
            }
        }
        Ok(())
    }

    /// Materialize a new product with a fresh identifier.
    pub fn build(self, now: DateTime<Utc>) -> DomainResult<Product> {
        self.validate()?;
        Ok(Product {
            id: ProductId::new(),
            sku: self.sku.trim().to_string(),
            internal_code: self.internal_code,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            stock: self.stock,
            unit: self.unit,
            conversion_factor: self.conversion_factor,
            status: self.status,
            image_url: self.image_url,
            updated_at: now,
        })
    }

    /// Apply this draft to an existing product, keeping its identifier and
    /// refreshing the edit timestamp.
    pub fn apply_to(self, existing: &Product, now: DateTime<Utc>) -> DomainResult<Product> {
        self.validate()?;
        Ok(Product {
            id: existing.id,
            sku: self.sku.trim().to_string(),
            internal_code: self.internal_code,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            stock: self.stock,
            unit: self.unit,
            conversion_factor: self.conversion_factor,
            status: self.status,
            image_url: self.image_url,
            updated_at: now,
        })
    }
}

/// Insert or replace `product` in `list` by id, keeping name order.
///
/// The admin flow edits the full in-memory list and replaces it wholesale in
/// the gateway afterwards.
pub fn upsert_product(mut list: Vec<Product>, product: Product) -> Vec<Product> {
    match list.iter_mut().find(|p| p.id == product.id) {
        Some(slot) => *slot = product,
        None => list.push(product),
    }
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

/// Remove a product by id, returning the new list.
pub fn remove_product(mut list: Vec<Product>, id: ProductId) -> Vec<Product> {
    list.retain(|p| p.id != id);
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn product(name: &str, stock: f64, factor: Option<f64>) -> Product {
        Product {
            id: ProductId::new(),
            sku: format!("SKU-{name}"),
            internal_code: None,
            name: name.to_string(),
            description: String::new(),
            category: "geral".to_string(),
            stock,
            unit: ProductUnit::Un,
            conversion_factor: factor,
            status: ProductStatus::Active,
            image_url: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn units_available_divides_by_factor_and_floors() {
        let p = product("Tinta", 20.0, Some(5.0));
        assert_eq!(p.units_available(), 4);

        let p = product("Tinta", 23.0, Some(5.0));
        assert_eq!(p.units_available(), 4);
    }

    #[test]
    fn missing_zero_or_negative_factor_defaults_to_one() {
        assert_eq!(product("A", 7.0, None).units_available(), 7);
        assert_eq!(product("B", 7.0, Some(0.0)).units_available(), 7);
        assert_eq!(product("C", 7.0, Some(-3.0)).units_available(), 7);
        assert_eq!(product("D", 7.0, Some(f64::NAN)).units_available(), 7);
    }

    #[test]
    fn negative_stock_yields_negative_availability() {
        assert_eq!(product("A", -6.0, Some(5.0)).units_available(), -2);
    }

    #[test]
    fn same_category_products_convert_independently() {
        let a = product("Areia", 10.0, Some(1.0));
        let b = product("Brita", 10.0, Some(4.0));
        assert_eq!(a.category, b.category);
        assert_eq!(a.units_available(), 10);
        assert_eq!(b.units_available(), 2);
    }

    #[test]
    fn base_units_scale_by_factor() {
        let p = product("Tinta", 0.0, Some(5.0));
        assert_eq!(p.base_units_for(3), 15.0);

        let p = product("Prego", 0.0, None);
        assert_eq!(p.base_units_for(3), 3.0);
    }

    #[test]
    fn draft_rejects_blank_required_fields() {
        let draft = ProductDraft {
            sku: "  ".to_string(),
            internal_code: None,
            name: "Cimento".to_string(),
            description: String::new(),
            category: "obra".to_string(),
            stock: 10.0,
            unit: ProductUnit::Kg,
            conversion_factor: None,
            status: ProductStatus::Active,
            image_url: None,
        };
        let err = draft.build(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn draft_apply_keeps_id_and_refreshes_timestamp() {
        let existing = product("Cimento", 50.0, None);
        let before = existing.updated_at;
        let draft = ProductDraft {
            sku: existing.sku.clone(),
            internal_code: None,
            name: "Cimento CP-II".to_string(),
            description: String::new(),
            category: existing.category.clone(),
            stock: 40.0,
            unit: ProductUnit::Kg,
            conversion_factor: Some(25.0),
            status: ProductStatus::Active,
            image_url: None,
        };
        let now = before + chrono::Duration::seconds(5);
        let updated = draft.apply_to(&existing, now).unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.name, "Cimento CP-II");
        assert_eq!(updated.updated_at, now);
    }

    #[test]
    fn upsert_inserts_and_keeps_name_order() {
        let list = vec![product("Brita", 1.0, None), product("Tinta", 1.0, None)];
        let list = upsert_product(list, product("Areia", 1.0, None));
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Areia", "Brita", "Tinta"]);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let a = product("Areia", 1.0, None);
        let mut renamed = a.clone();
        renamed.name = "Areia fina".to_string();
        let list = upsert_product(vec![a.clone()], renamed);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Areia fina");
        assert_eq!(list[0].id, a.id);
    }

    #[test]
    fn remove_drops_only_the_target() {
        let a = product("Areia", 1.0, None);
        let b = product("Brita", 1.0, None);
        let list = remove_product(vec![a.clone(), b.clone()], a.id);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, b.id);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Availability always matches the floor-division formula with the
            /// factor fallback applied.
            #[test]
            fn units_available_matches_formula(
                stock in -1_000_000.0f64..1_000_000.0,
                factor in proptest::option::of(-100.0f64..100.0),
            ) {
                let p = product("X", stock, factor);
                let eff = match factor {
                    Some(f) if f > 0.0 => f,
                    _ => 1.0,
                };
                prop_assert_eq!(p.units_available(), (stock / eff).floor() as i64);
            }

            /// Consuming the planned base units shifts availability down by
            /// the requested quantity (within one unit of float rounding).
            #[test]
            fn consuming_base_units_reduces_availability(
                stock in 0.0f64..1_000_000.0,
                factor in 0.5f64..100.0,
                qty in 1i64..1000,
            ) {
                let p = product("X", stock, Some(factor));
                let mut after = p.clone();
                after.stock -= p.base_units_for(qty);
                let expected = p.units_available() - qty;
                prop_assert!((after.units_available() - expected).abs() <= 1);
            }
        }
    }
}

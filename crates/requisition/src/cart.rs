use serde::{Deserialize, Serialize};

use almox_catalog::Product;
use almox_core::ProductId;

/// One requested product with its quantity in delivery units.
///
/// The product snapshot rides along so checkout can read name, unit and
/// conversion factor without another catalog lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub product: Product,
}

/// Session-scoped cart: an ordered list of lines, one per product.
///
/// Invariant: every present line has `quantity > 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a quantity delta for `product` into the cart.
    ///
    /// - existing line: new quantity = existing + delta; the line is removed
    ///   entirely when the result drops to zero or below;
    /// - no line and delta > 0: a new line is appended;
    /// - no line and delta <= 0: no-op.
    pub fn apply_delta(&mut self, product: &Product, delta: i64) {
        if let Some(pos) = self.lines.iter().position(|l| l.product_id == product.id) {
            let new_quantity = self.lines[pos].quantity + delta;
            if new_quantity <= 0 {
                self.lines.remove(pos);
            } else {
                self.lines[pos].quantity = new_quantity;
            }
        } else if delta > 0 {
            self.lines.push(CartLine {
                product_id: product.id,
                quantity: delta,
                product: product.clone(),
            });
        }
    }

    /// Drop a line regardless of its quantity.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, product_id: ProductId) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almox_catalog::{ProductStatus, ProductUnit};
    use chrono::Utc;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            sku: format!("SKU-{name}"),
            internal_code: None,
            name: name.to_string(),
            description: String::new(),
            category: "geral".to_string(),
            stock: 100.0,
            unit: ProductUnit::Un,
            conversion_factor: None,
            status: ProductStatus::Active,
            image_url: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn positive_delta_inserts_a_line() {
        let p = product("Areia");
        let mut cart = Cart::new();
        cart.apply_delta(&p, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(p.id), 2);
    }

    #[test]
    fn deltas_merge_into_one_line() {
        let p = product("Areia");
        let mut cart = Cart::new();
        cart.apply_delta(&p, 2);
        cart.apply_delta(&p, 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(p.id), 5);
    }

    #[test]
    fn net_effect_is_what_counts() {
        // +2 then -1 leaves the same cart as a single +1.
        let p = product("Areia");

        let mut stepped = Cart::new();
        stepped.apply_delta(&p, 2);
        stepped.apply_delta(&p, -1);

        let mut direct = Cart::new();
        direct.apply_delta(&p, 1);

        assert_eq!(stepped, direct);
    }

    #[test]
    fn delta_to_zero_or_below_removes_the_line() {
        let p = product("Areia");
        let mut cart = Cart::new();
        cart.apply_delta(&p, 3);
        cart.apply_delta(&p, -3);
        assert!(cart.is_empty());

        cart.apply_delta(&p, 2);
        cart.apply_delta(&p, -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn negative_delta_on_absent_product_is_a_noop() {
        let p = product("Areia");
        let mut cart = Cart::new();
        cart.apply_delta(&p, -1);
        cart.apply_delta(&p, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_drops_the_whole_line() {
        let a = product("Areia");
        let b = product("Brita");
        let mut cart = Cart::new();
        cart.apply_delta(&a, 4);
        cart.apply_delta(&b, 1);
        cart.remove(a.id);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(b.id), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The cart state depends only on the net delta per product.
            #[test]
            fn sequence_of_deltas_equals_their_sum(deltas in proptest::collection::vec(-5i64..=5, 1..20)) {
                let p = product("X");

                let mut stepped = Cart::new();
                for d in &deltas {
                    stepped.apply_delta(&p, *d);
                }

                // Reference model: 0 means "no line"; a present line is
                // removed whenever the merged quantity drops to 0 or below,
                // and a negative delta on an absent line does nothing.
                let mut model = 0i64;
                for d in &deltas {
                    if model > 0 {
                        model = (model + d).max(0);
                    } else if *d > 0 {
                        model = *d;
                    }
                }

                prop_assert_eq!(stepped.quantity_of(p.id), model);
                prop_assert_eq!(stepped.is_empty(), model == 0);
            }

            /// Quantities in the cart are always strictly positive.
            #[test]
            fn present_lines_have_positive_quantity(deltas in proptest::collection::vec(-5i64..=5, 0..30)) {
                let a = product("A");
                let b = product("B");
                let mut cart = Cart::new();
                for (i, d) in deltas.iter().enumerate() {
                    cart.apply_delta(if i % 2 == 0 { &a } else { &b }, *d);
                }
                for line in cart.lines() {
                    prop_assert!(line.quantity > 0);
                }
            }
        }
    }
}

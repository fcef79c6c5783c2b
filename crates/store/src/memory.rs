use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use almox_auth::User;
use almox_catalog::Product;
use almox_requisition::{Requisition, StockMovement};

use crate::gateway::{Gateway, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    users: Vec<User>,
    requisitions: Vec<Requisition>,
    movements: Vec<StockMovement>,
}

/// In-memory gateway.
///
/// Intended for tests/dev. Ordering guarantees are enforced on read, the same
/// way the real backend orders its queries.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    fail_next_write: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write call fail once, to exercise partial-failure paths.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn products(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn replace_products(&self, products: Vec<Product>) -> StoreResult<()> {
        self.check_write()?;
        self.lock().products = products;
        Ok(())
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock().users.clone())
    }

    async fn replace_users(&self, users: Vec<User>) -> StoreResult<()> {
        self.check_write()?;
        self.lock().users = users;
        Ok(())
    }

    async fn requisitions(&self) -> StoreResult<Vec<Requisition>> {
        let mut requisitions = self.lock().requisitions.clone();
        requisitions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(requisitions)
    }

    async fn append_requisition(&self, requisition: Requisition) -> StoreResult<()> {
        self.check_write()?;
        self.lock().requisitions.push(requisition);
        Ok(())
    }

    async fn movements(&self) -> StoreResult<Vec<StockMovement>> {
        let mut movements = self.lock().movements.clone();
        movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(movements)
    }

    async fn append_movements(&self, movements: Vec<StockMovement>) -> StoreResult<()> {
        self.check_write()?;
        self.lock().movements.extend(movements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almox_catalog::{ProductStatus, ProductUnit};
    use almox_core::{MovementId, ProductId, RequisitionId, UserId};
    use almox_requisition::MovementKind;
    use chrono::{Duration, Utc};

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            sku: format!("SKU-{name}"),
            internal_code: None,
            name: name.to_string(),
            description: String::new(),
            category: "geral".to_string(),
            stock: 1.0,
            unit: ProductUnit::Un,
            conversion_factor: None,
            status: ProductStatus::Active,
            image_url: None,
            updated_at: Utc::now(),
        }
    }

    fn requisition(age_minutes: i64) -> Requisition {
        Requisition {
            id: RequisitionId::new(),
            user_id: UserId::new(),
            user_name: "Maria".to_string(),
            items: vec![],
            timestamp: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn products_come_back_ordered_by_name() {
        let gw = InMemoryGateway::new();
        gw.replace_products(vec![product("Tinta"), product("Areia"), product("Brita")])
            .await
            .unwrap();
        let names: Vec<_> = gw
            .products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Areia", "Brita", "Tinta"]);
    }

    #[tokio::test]
    async fn requisitions_come_back_newest_first() {
        let gw = InMemoryGateway::new();
        gw.append_requisition(requisition(10)).await.unwrap();
        let newest = requisition(0);
        gw.append_requisition(newest.clone()).await.unwrap();
        gw.append_requisition(requisition(5)).await.unwrap();

        let list = gw.requisitions().await.unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].id, newest.id);
        assert!(list.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn injected_failure_hits_exactly_one_write() {
        let gw = InMemoryGateway::new();
        gw.fail_next_write();

        let err = gw.replace_products(vec![product("Areia")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        // Next write goes through.
        gw.replace_products(vec![product("Areia")]).await.unwrap();
        assert_eq!(gw.products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movements_append_as_a_batch() {
        let gw = InMemoryGateway::new();
        let mk = |name: &str| StockMovement {
            id: MovementId::new(),
            product_id: ProductId::new(),
            product_name: name.to_string(),
            kind: MovementKind::Out,
            quantity: 1,
            user_id: UserId::new(),
            user_name: "Maria".to_string(),
            timestamp: Utc::now(),
        };
        gw.append_movements(vec![mk("Areia"), mk("Brita")]).await.unwrap();
        assert_eq!(gw.movements().await.unwrap().len(), 2);
    }
}

//! Postgres-backed gateway.
//!
//! Mirrors the backend contract of the in-memory gateway: products and users
//! are replaced wholesale (delete + insert inside one transaction per list),
//! requisitions and movements are append-only, and read ordering comes from
//! the queries. There is still no transaction *across* gateway calls; the
//! checkout writes remain independent operations.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use almox_auth::User;
use almox_catalog::Product;
use almox_core::{MovementId, ProductId, RequisitionId, UserId};
use almox_requisition::{Requisition, StockMovement};

use crate::gateway::{Gateway, StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY,
    sku TEXT NOT NULL,
    internal_code TEXT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    stock DOUBLE PRECISION NOT NULL,
    unit TEXT NOT NULL,
    conversion_factor DOUBLE PRECISION,
    status TEXT NOT NULL,
    image_url TEXT,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    role TEXT NOT NULL,
    status TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS requisitions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    user_name TEXT NOT NULL,
    items JSONB NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS stock_movements (
    id UUID PRIMARY KEY,
    product_id UUID NOT NULL,
    product_name TEXT NOT NULL,
    type TEXT NOT NULL,
    quantity BIGINT NOT NULL,
    user_id UUID NOT NULL,
    user_name TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL
);
"#;

/// Postgres gateway over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresGateway {
    pool: PgPool,
}

impl PostgresGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Serialize a unit-variant enum to its wire token ("un", "OUT", ...).
fn to_token<T: Serialize>(value: &T) -> StoreResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        Ok(other) => Err(StoreError::Backend(format!(
            "expected string token, got {other}"
        ))),
        Err(e) => Err(StoreError::Backend(e.to_string())),
    }
}

fn from_token<T: DeserializeOwned>(token: String) -> StoreResult<T> {
    serde_json::from_value(serde_json::Value::String(token))
        .map_err(|e| StoreError::Backend(e.to_string()))
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(backend)?),
        sku: row.try_get("sku").map_err(backend)?,
        internal_code: row.try_get("internal_code").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        category: row.try_get("category").map_err(backend)?,
        stock: row.try_get("stock").map_err(backend)?,
        unit: from_token(row.try_get("unit").map_err(backend)?)?,
        conversion_factor: row.try_get("conversion_factor").map_err(backend)?,
        status: from_token(row.try_get("status").map_err(backend)?)?,
        image_url: row.try_get("image_url").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        username: row.try_get("username").map_err(backend)?,
        password: row.try_get("password").map_err(backend)?,
        role: from_token(row.try_get("role").map_err(backend)?)?,
        status: from_token(row.try_get("status").map_err(backend)?)?,
    })
}

fn requisition_from_row(row: &PgRow) -> StoreResult<Requisition> {
    let items: serde_json::Value = row.try_get("items").map_err(backend)?;
    Ok(Requisition {
        id: RequisitionId::from_uuid(row.try_get("id").map_err(backend)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(backend)?),
        user_name: row.try_get("user_name").map_err(backend)?,
        items: serde_json::from_value(items).map_err(|e| StoreError::Backend(e.to_string()))?,
        timestamp: row.try_get("timestamp").map_err(backend)?,
    })
}

fn movement_from_row(row: &PgRow) -> StoreResult<StockMovement> {
    Ok(StockMovement {
        id: MovementId::from_uuid(row.try_get("id").map_err(backend)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(backend)?),
        product_name: row.try_get("product_name").map_err(backend)?,
        kind: from_token(row.try_get("type").map_err(backend)?)?,
        quantity: row.try_get("quantity").map_err(backend)?,
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(backend)?),
        user_name: row.try_get("user_name").map_err(backend)?,
        timestamp: row.try_get("timestamp").map_err(backend)?,
    })
}

#[async_trait]
impl Gateway for PostgresGateway {
    async fn products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn replace_products(&self, products: Vec<Product>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        for p in &products {
            sqlx::query(
                "INSERT INTO products \
                 (id, sku, internal_code, name, description, category, stock, unit, \
                  conversion_factor, status, image_url, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(*p.id.as_uuid())
            .bind(&p.sku)
            .bind(&p.internal_code)
            .bind(&p.name)
            .bind(&p.description)
            .bind(&p.category)
            .bind(p.stock)
            .bind(to_token(&p.unit)?)
            .bind(p.conversion_factor)
            .bind(to_token(&p.status)?)
            .bind(&p.image_url)
            .bind(p.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn replace_users(&self, users: Vec<User>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query("DELETE FROM users")
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        for u in &users {
            sqlx::query(
                "INSERT INTO users (id, name, username, password, role, status) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(*u.id.as_uuid())
            .bind(&u.name)
            .bind(&u.username)
            .bind(&u.password)
            .bind(to_token(&u.role)?)
            .bind(to_token(&u.status)?)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)
    }

    async fn requisitions(&self) -> StoreResult<Vec<Requisition>> {
        let rows = sqlx::query("SELECT * FROM requisitions ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(requisition_from_row).collect()
    }

    async fn append_requisition(&self, requisition: Requisition) -> StoreResult<()> {
        let items = serde_json::to_value(&requisition.items)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        sqlx::query(
            "INSERT INTO requisitions (id, user_id, user_name, items, timestamp) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*requisition.id.as_uuid())
        .bind(*requisition.user_id.as_uuid())
        .bind(&requisition.user_name)
        .bind(items)
        .bind(requisition.timestamp)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn movements(&self) -> StoreResult<Vec<StockMovement>> {
        let rows = sqlx::query("SELECT * FROM stock_movements ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(movement_from_row).collect()
    }

    async fn append_movements(&self, movements: Vec<StockMovement>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        for m in &movements {
            sqlx::query(
                "INSERT INTO stock_movements \
                 (id, product_id, product_name, type, quantity, user_id, user_name, timestamp) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(*m.id.as_uuid())
            .bind(*m.product_id.as_uuid())
            .bind(&m.product_name)
            .bind(to_token(&m.kind)?)
            .bind(m.quantity)
            .bind(*m.user_id.as_uuid())
            .bind(&m.user_name)
            .bind(m.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)
    }
}

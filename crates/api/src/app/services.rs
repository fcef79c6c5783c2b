use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use url::Url;

use almox_auth::{Role, Session, SessionStore, User, UserStatus, authenticate, register};
use almox_catalog::{Product, ProductDraft, remove_product, upsert_product};
use almox_core::{DomainError, ProductId, SessionToken, UserId};
use almox_notify::{NotificationChannel, format_summary};
use almox_requisition::{Cart, Requisition, StockMovement, plan_checkout};
use almox_store::{Gateway, ImageStore, StoreError};

/// Failure of a service operation: either a deterministic domain rejection or
/// a persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Everything checkout hands back to the client.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub requisition: Requisition,
    pub message: String,
    pub link: Url,
}

/// Admin edit payload for a user account. Unset fields are left untouched;
/// the username is immutable.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Shared application services: the persistence gateway, sessions, the
/// per-session carts and the notification channel.
pub struct AppServices {
    gateway: Arc<dyn Gateway>,
    images: Arc<dyn ImageStore>,
    channel: Arc<dyn NotificationChannel>,
    sessions: SessionStore,
    carts: Mutex<HashMap<SessionToken, Cart>>,
}

impl AppServices {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        images: Arc<dyn ImageStore>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            gateway,
            images,
            channel,
            sessions: SessionStore::new(),
            carts: Mutex::new(HashMap::new()),
        }
    }

    /// Startup pass: fetch the four entity lists concurrently and seed the
    /// bootstrap administrator when no user exists yet.
    pub async fn bootstrap(
        &self,
        admin_name: &str,
        admin_username: &str,
        admin_password: &str,
    ) -> ServiceResult<()> {
        let (products, users, requisitions, movements) = tokio::join!(
            self.gateway.products(),
            self.gateway.users(),
            self.gateway.requisitions(),
            self.gateway.movements(),
        );
        let products = products?;
        let users = users?;
        let requisitions = requisitions?;
        let movements = movements?;

        tracing::info!(
            products = products.len(),
            users = users.len(),
            requisitions = requisitions.len(),
            movements = movements.len(),
            "store reachable"
        );

        if users.is_empty() {
            let admin = User {
                id: UserId::new(),
                name: admin_name.to_string(),
                username: admin_username.to_lowercase(),
                password: admin_password.to_string(),
                role: Role::Admin,
                status: UserStatus::Active,
            };
            tracing::info!(username = %admin.username, "seeding bootstrap administrator");
            self.gateway.replace_users(vec![admin]).await?;
        }

        Ok(())
    }

    // ───────────────────────── sessions ─────────────────────────

    pub fn resolve_session(&self, token: SessionToken) -> Option<Session> {
        self.sessions.resolve(token)
    }

    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Session> {
        let users = self.gateway.users().await?;
        let user = authenticate(&users, username, password)?.clone();
        Ok(self.sessions.open(user))
    }

    /// Close the session and drop its cart. Both are gone afterwards no
    /// matter how the call interleaves with others.
    pub fn logout(&self, token: SessionToken) -> bool {
        self.carts.lock().unwrap().remove(&token);
        self.sessions.close(token)
    }

    pub async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let mut users = self.gateway.users().await?;
        let user = register(&users, name, username, password)?;
        users.push(user.clone());
        self.gateway.replace_users(users).await?;
        Ok(user)
    }

    // ───────────────────────── catalog ─────────────────────────

    pub async fn catalog(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.gateway.products().await?)
    }

    async fn product_by_id(&self, id: ProductId) -> ServiceResult<Product> {
        self.gateway
            .products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found().into())
    }

    // ───────────────────────── cart ─────────────────────────

    pub fn cart(&self, token: SessionToken) -> Cart {
        self.carts
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn cart_apply(
        &self,
        token: SessionToken,
        product_id: ProductId,
        delta: i64,
    ) -> ServiceResult<Cart> {
        let product = self.product_by_id(product_id).await?;
        if !product.is_active() {
            return Err(DomainError::invariant("product is inactive").into());
        }

        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(token).or_default();
        cart.apply_delta(&product, delta);
        Ok(cart.clone())
    }

    pub fn cart_remove(&self, token: SessionToken, product_id: ProductId) -> Cart {
        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(token).or_default();
        cart.remove(product_id);
        cart.clone()
    }

    pub fn cart_clear(&self, token: SessionToken) {
        self.carts.lock().unwrap().remove(&token);
    }

    // ───────────────────────── checkout ─────────────────────────

    /// Run the checkout workflow for a session.
    ///
    /// The requisition, the movements and the product list are persisted as
    /// three independent writes; if any fails the cart is left intact so the
    /// user can retry, and nothing already written is rolled back.
    pub async fn checkout(&self, session: &Session) -> ServiceResult<CheckoutOutcome> {
        let cart = self.cart(session.token);
        let products = self.gateway.products().await?;

        let plan = plan_checkout(
            &cart,
            session.user.id,
            &session.user.name,
            &products,
            Utc::now(),
        )?;

        self.gateway
            .append_requisition(plan.requisition.clone())
            .await?;
        self.gateway.append_movements(plan.movements.clone()).await?;
        self.gateway.replace_products(plan.updated_products).await?;

        let message = format_summary(&plan.requisition);
        let link = self.channel.notify(&message);

        self.cart_clear(session.token);
        tracing::info!(
            requisition = %plan.requisition.id,
            user = %session.user.username,
            lines = plan.requisition.items.len(),
            "requisition submitted"
        );

        Ok(CheckoutOutcome {
            requisition: plan.requisition,
            message,
            link,
        })
    }

    // ───────────────────────── history ─────────────────────────

    /// Admins see every requisition, regular users only their own.
    pub async fn requisitions_visible_to(&self, user: &User) -> ServiceResult<Vec<Requisition>> {
        let mut requisitions = self.gateway.requisitions().await?;
        if !user.is_admin() {
            requisitions.retain(|r| r.user_id == user.id);
        }
        Ok(requisitions)
    }

    pub async fn movements(&self) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.gateway.movements().await?)
    }

    // ───────────────────────── admin: products ─────────────────────────

    pub async fn create_product(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let product = draft.build(Utc::now())?;
        let list = upsert_product(self.gateway.products().await?, product.clone());
        self.gateway.replace_products(list).await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> ServiceResult<Product> {
        let existing = self.product_by_id(id).await?;
        let updated = draft.apply_to(&existing, Utc::now())?;
        let list = upsert_product(self.gateway.products().await?, updated.clone());
        self.gateway.replace_products(list).await?;
        Ok(updated)
    }

    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<()> {
        // Presence check keeps delete-of-unknown a 404 instead of a silent
        // no-op.
        self.product_by_id(id).await?;
        let list = remove_product(self.gateway.products().await?, id);
        self.gateway.replace_products(list).await?;
        Ok(())
    }

    pub async fn set_product_image(
        &self,
        id: ProductId,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ServiceResult<Product> {
        let mut product = self.product_by_id(id).await?;
        if let Some(old) = product.image_url.take() {
            self.images.delete(&old).await?;
        }
        let url = self.images.upload(bytes, content_type).await?;
        product.image_url = Some(url);
        product.updated_at = Utc::now();
        let list = upsert_product(self.gateway.products().await?, product.clone());
        self.gateway.replace_products(list).await?;
        Ok(product)
    }

    pub async fn clear_product_image(&self, id: ProductId) -> ServiceResult<Product> {
        let mut product = self.product_by_id(id).await?;
        if let Some(old) = product.image_url.take() {
            self.images.delete(&old).await?;
        }
        product.updated_at = Utc::now();
        let list = upsert_product(self.gateway.products().await?, product.clone());
        self.gateway.replace_products(list).await?;
        Ok(product)
    }

    // ───────────────────────── admin: users ─────────────────────────

    pub async fn users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.gateway.users().await?)
    }

    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> ServiceResult<User> {
        let mut users = self.gateway.users().await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::NotFound)?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty").into());
            }
            user.name = name.trim().to_string();
        }
        if let Some(password) = update.password {
            if password.is_empty() {
                return Err(DomainError::validation("password cannot be empty").into());
            }
            user.password = password;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }

        let updated = user.clone();
        self.gateway.replace_users(users).await?;
        Ok(updated)
    }

    pub async fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        let mut users = self.gateway.users().await?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(DomainError::NotFound.into());
        }
        self.gateway.replace_users(users).await?;
        Ok(())
    }
}

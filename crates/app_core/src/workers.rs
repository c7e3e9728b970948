//! Data-access seam for the interactors.
//!
//! The store-backed workers stand in for a real backend: they wait a fixed
//! delay and answer from the [`AppStore`]. Swapping in a network client only
//! means implementing the same traits.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared::{
    domain::{AuthProvider, MealPlan, ShoppingCart, User, UserId},
    error::AppError,
    request::SignInRequest,
};
use tracing::debug;

use crate::store::AppStore;

pub const DEFAULT_WORKER_DELAY: Duration = Duration::from_millis(350);

#[async_trait]
pub trait AuthWorker: Send + Sync {
    async fn sign_in(&self, request: &SignInRequest) -> Result<User, AppError>;
    async fn sign_out(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait MealPlanWorker: Send + Sync {
    async fn fetch_meal_plan(&self) -> Result<MealPlan, AppError>;
}

#[async_trait]
pub trait ShoppingListWorker: Send + Sync {
    async fn fetch_shopping_cart(&self) -> Result<ShoppingCart, AppError>;
}

#[derive(Clone)]
pub struct Workers {
    pub auth: Arc<dyn AuthWorker>,
    pub meal_plan: Arc<dyn MealPlanWorker>,
    pub shopping_list: Arc<dyn ShoppingListWorker>,
}

impl Workers {
    pub fn store_backed(store: &Arc<AppStore>, delay: Duration) -> Self {
        Self {
            auth: Arc::new(LocalAuthWorker::new(delay)),
            meal_plan: Arc::new(StoreMealPlanWorker::new(Arc::clone(store), delay)),
            shopping_list: Arc::new(StoreShoppingListWorker::new(Arc::clone(store), delay)),
        }
    }
}

/// Accepts any well-formed request and derives a stable user from it.
pub struct LocalAuthWorker {
    delay: Duration,
}

impl LocalAuthWorker {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// First 63 bits of `SHA-256(provider || 0x00 || subject)`, so the same
/// account maps to the same id across runs and builds.
fn stable_user_id(provider: AuthProvider, subject: &str) -> UserId {
    let tag = match provider {
        AuthProvider::Local => "local",
        AuthProvider::Apple => "apple",
        AuthProvider::Google => "google",
    };
    let digest = Sha256::new()
        .chain_update(tag.as_bytes())
        .chain_update([0u8])
        .chain_update(subject.as_bytes())
        .finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    UserId((u64::from_be_bytes(prefix) >> 1) as i64)
}

#[async_trait]
impl AuthWorker for LocalAuthWorker {
    async fn sign_in(&self, request: &SignInRequest) -> Result<User, AppError> {
        tokio::time::sleep(self.delay).await;
        request.validate()?;

        let provider = request.provider();
        let user = match request {
            SignInRequest::Password { email, .. } => {
                let email = email.trim().to_ascii_lowercase();
                let display_name = email
                    .split_once('@')
                    .map(|(local, _)| local.to_string())
                    .unwrap_or_else(|| email.clone());
                User {
                    user_id: stable_user_id(provider, &email),
                    display_name,
                    email: Some(email),
                    provider,
                }
            }
            SignInRequest::Apple { identity_token } => User {
                user_id: stable_user_id(provider, identity_token),
                display_name: "Apple user".to_string(),
                email: None,
                provider,
            },
            SignInRequest::Google { id_token } => User {
                user_id: stable_user_id(provider, id_token),
                display_name: "Google user".to_string(),
                email: None,
                provider,
            },
        };
        debug!(user_id = user.user_id.0, ?provider, "local sign-in accepted");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

pub struct StoreMealPlanWorker {
    store: Arc<AppStore>,
    delay: Duration,
}

impl StoreMealPlanWorker {
    pub fn new(store: Arc<AppStore>, delay: Duration) -> Self {
        Self { store, delay }
    }
}

#[async_trait]
impl MealPlanWorker for StoreMealPlanWorker {
    async fn fetch_meal_plan(&self) -> Result<MealPlan, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.store.read(|state| state.meal_plan.clone()))
    }
}

pub struct StoreShoppingListWorker {
    store: Arc<AppStore>,
    delay: Duration,
}

impl StoreShoppingListWorker {
    pub fn new(store: Arc<AppStore>, delay: Duration) -> Self {
        Self { store, delay }
    }
}

#[async_trait]
impl ShoppingListWorker for StoreShoppingListWorker {
    async fn fetch_shopping_cart(&self) -> Result<ShoppingCart, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.store.read(|state| state.shopping_cart.clone()))
    }
}

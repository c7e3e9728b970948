//! Test doubles shared by the feature and shell suites.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, OnceLock,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{MealPlan, ShoppingCart, User},
    error::AppError,
    request::SignInRequest,
};
use tokio::runtime::{Handle, Runtime};

use crate::{
    features::ModuleContext,
    navigation::{Destination, Navigator},
    store::{AppState, AppStore},
    ui::UiContext,
    workers::{AuthWorker, MealPlanWorker, ShoppingListWorker, Workers},
};

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).expect("date")
}

pub(crate) fn sample_store() -> Arc<AppStore> {
    AppStore::new(AppState::with_sample_data(today()))
}

pub(crate) fn signed_in_store() -> Arc<AppStore> {
    let mut state = AppState::with_sample_data(today());
    state.is_authenticated = true;
    AppStore::new(state)
}

/// The test's own runtime when there is one, otherwise a shared background
/// runtime for plain `#[test]` functions.
pub(crate) fn runtime_handle() -> Handle {
    static BACKGROUND: OnceLock<Runtime> = OnceLock::new();
    Handle::try_current().unwrap_or_else(|_| {
        BACKGROUND
            .get_or_init(|| {
                tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .expect("background runtime")
            })
            .handle()
            .clone()
    })
}

/// Runs the next UI job, failing the test if none shows up in time.
pub(crate) async fn run_next_job(ui: &mut UiContext) {
    tokio::time::timeout(Duration::from_secs(5), ui.run_next())
        .await
        .expect("UI job should arrive");
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    opened: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub(crate) fn opened(&self) -> Vec<Destination> {
        self.opened.lock().expect("lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, destination: Destination) {
        self.opened.lock().expect("lock").push(destination);
    }
}

/// Worker double answering every use case with a fixed outcome after `delay`.
pub(crate) struct ScriptedWorker {
    delay: Duration,
    fail_with: Option<AppError>,
    meal_plan: MealPlan,
    cart: ShoppingCart,
    user: Option<User>,
    calls: AtomicUsize,
}

impl ScriptedWorker {
    pub(crate) fn ok(meal_plan: MealPlan, cart: ShoppingCart) -> Self {
        Self {
            delay: Duration::ZERO,
            fail_with: None,
            meal_plan,
            cart,
            user: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(err: AppError) -> Self {
        let mut worker = Self::ok(MealPlan::week_starting(today()), ShoppingCart::new());
        worker.fail_with = Some(err);
        worker
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, value: T) -> Result<T, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl MealPlanWorker for ScriptedWorker {
    async fn fetch_meal_plan(&self) -> Result<MealPlan, AppError> {
        self.answer(self.meal_plan.clone()).await
    }
}

#[async_trait]
impl ShoppingListWorker for ScriptedWorker {
    async fn fetch_shopping_cart(&self) -> Result<ShoppingCart, AppError> {
        self.answer(self.cart.clone()).await
    }
}

#[async_trait]
impl AuthWorker for ScriptedWorker {
    async fn sign_in(&self, _request: &SignInRequest) -> Result<User, AppError> {
        let user = self.answer(self.user.clone()).await?;
        user.ok_or_else(|| AppError::from_message("no scripted user"))
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.answer(()).await
    }
}

pub(crate) fn scripted_workers(worker: Arc<ScriptedWorker>) -> Workers {
    Workers {
        auth: worker.clone(),
        meal_plan: worker.clone(),
        shopping_list: worker,
    }
}

pub(crate) fn context(
    store: &Arc<AppStore>,
    ui: &UiContext,
    workers: Workers,
    navigator: Arc<RecordingNavigator>,
) -> ModuleContext {
    ModuleContext::new(
        Arc::clone(store),
        ui.dispatcher(),
        navigator,
        workers,
        runtime_handle(),
    )
}

pub(crate) fn store_context(store: &Arc<AppStore>, ui: &UiContext) -> ModuleContext {
    context(
        store,
        ui,
        Workers::store_backed(store, Duration::ZERO),
        Arc::new(RecordingNavigator::default()),
    )
}

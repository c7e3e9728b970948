use std::sync::{Arc, Weak};

use serde::Serialize;
use shared::{
    domain::{ShoppingCart, ShoppingItem, Tab},
    error::AppError,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{info, warn};

use super::{deliver, BackRef, LoadState, LoadStatus, ModuleContext};
use crate::{
    presentation::{user_message, GENERIC_MESSAGE},
    store::AppStore,
    tasks::InFlight,
    ui::UiDispatcher,
    workers::ShoppingListWorker,
};

pub trait ShoppingListBusinessLogic: Send + Sync {
    fn load_shopping_cart(&self) -> JoinHandle<()>;
}

pub trait ShoppingListPresentationLogic: Send + Sync {
    fn present_shopping_cart(&self, response: Result<ShoppingCart, AppError>);
}

pub struct ShoppingListInteractor {
    worker: Arc<dyn ShoppingListWorker>,
    ui: UiDispatcher,
    presenter: Weak<dyn ShoppingListPresentationLogic>,
    in_flight: InFlight,
}

impl ShoppingListInteractor {
    pub fn new(
        worker: Arc<dyn ShoppingListWorker>,
        ui: UiDispatcher,
        runtime: Handle,
        presenter: Weak<dyn ShoppingListPresentationLogic>,
    ) -> Self {
        Self {
            worker,
            ui,
            presenter,
            in_flight: InFlight::new(runtime),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.running()
    }
}

impl ShoppingListBusinessLogic for ShoppingListInteractor {
    fn load_shopping_cart(&self) -> JoinHandle<()> {
        let worker = Arc::clone(&self.worker);
        let ui = self.ui.clone();
        let presenter = self.presenter.clone();
        self.in_flight.spawn(async move {
            info!("loading shopping cart");
            let response = worker.fetch_shopping_cart().await;
            deliver(&ui, presenter, "load_shopping_cart", move |presenter| {
                presenter.present_shopping_cart(response)
            });
        })
    }
}

pub struct ShoppingListPresenter {
    store: Arc<AppStore>,
    view_model: Weak<ShoppingListViewModel>,
}

impl ShoppingListPresenter {
    pub fn new(store: Arc<AppStore>, view_model: Weak<ShoppingListViewModel>) -> Self {
        Self { store, view_model }
    }
}

impl ShoppingListPresentationLogic for ShoppingListPresenter {
    fn present_shopping_cart(&self, response: Result<ShoppingCart, AppError>) {
        match response {
            Ok(cart) => {
                info!(total_items = cart.total_items(), "shopping cart loaded");
                self.store.update(|state| state.shopping_cart = cart);
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.finish();
                }
            }
            Err(err) => {
                warn!("shopping cart load failed: {err}");
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.fail(user_message(&err));
                }
            }
        }
    }
}

pub struct ShoppingListViewModel {
    store: Arc<AppStore>,
    status: LoadStatus,
    interactor: BackRef<dyn ShoppingListBusinessLogic>,
    router: BackRef<ShoppingListRouter>,
}

impl ShoppingListViewModel {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self {
            store,
            status: LoadStatus::new(),
            interactor: BackRef::new(),
            router: BackRef::new(),
        }
    }

    pub fn bind(
        &self,
        interactor: &Arc<dyn ShoppingListBusinessLogic>,
        router: &Arc<ShoppingListRouter>,
    ) {
        self.interactor.bind(Arc::downgrade(interactor));
        self.router.bind(Arc::downgrade(router));
    }

    pub fn load_shopping_cart(&self) -> Option<JoinHandle<()>> {
        self.status.begin();
        match self.interactor.upgrade() {
            Some(interactor) => Some(interactor.load_shopping_cart()),
            None => {
                self.status.fail(GENERIC_MESSAGE.to_string());
                None
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.status.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.status.snapshot().is_loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.status.snapshot().error_message
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.status.subscribe()
    }

    pub fn cart(&self) -> ShoppingCart {
        self.store.read(|state| state.shopping_cart.clone())
    }

    pub fn total_items(&self) -> u32 {
        self.store.read(|state| state.shopping_cart.total_items())
    }

    pub fn navigate_to_meal_planner(&self) {
        if let Some(router) = self.router.upgrade() {
            router.navigate_to_meal_planner();
        }
    }
}

pub struct ShoppingListRouter {
    store: Arc<AppStore>,
}

impl ShoppingListRouter {
    pub fn create_module(context: &ModuleContext) -> ShoppingListModule {
        let view_model = Arc::new(ShoppingListViewModel::new(Arc::clone(&context.store)));
        let presenter = Arc::new(ShoppingListPresenter::new(
            Arc::clone(&context.store),
            Arc::downgrade(&view_model),
        ));
        let presentation: Arc<dyn ShoppingListPresentationLogic> = presenter.clone();
        let interactor = Arc::new(ShoppingListInteractor::new(
            Arc::clone(&context.workers.shopping_list),
            context.ui.clone(),
            context.runtime.clone(),
            Arc::downgrade(&presentation),
        ));
        let router = Arc::new(ShoppingListRouter {
            store: Arc::clone(&context.store),
        });

        let business: Arc<dyn ShoppingListBusinessLogic> = interactor.clone();
        view_model.bind(&business, &router);

        ShoppingListModule {
            interactor,
            presenter,
            router,
            view_model,
        }
    }

    pub fn navigate_to_meal_planner(&self) {
        self.store
            .update(|state| state.selected_tab = Tab::MealPlanner);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListScreen {
    #[serde(flatten)]
    pub state: LoadState,
    pub items: Vec<ShoppingItem>,
    pub total_items: u32,
}

pub struct ShoppingListModule {
    interactor: Arc<ShoppingListInteractor>,
    presenter: Arc<ShoppingListPresenter>,
    router: Arc<ShoppingListRouter>,
    view_model: Arc<ShoppingListViewModel>,
}

impl ShoppingListModule {
    pub fn view_model(&self) -> &ShoppingListViewModel {
        &self.view_model
    }

    pub fn router(&self) -> &ShoppingListRouter {
        &self.router
    }

    pub fn interactor(&self) -> &ShoppingListInteractor {
        &self.interactor
    }

    pub fn presenter(&self) -> &ShoppingListPresenter {
        &self.presenter
    }

    pub fn render(&self) -> ShoppingListScreen {
        let cart = self.view_model.cart();
        ShoppingListScreen {
            state: self.view_model.state(),
            total_items: cart.total_items(),
            items: cart.items().to_vec(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/shopping_list_tests.rs"]
mod tests;

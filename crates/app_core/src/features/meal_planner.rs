use std::sync::{Arc, Weak};

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    domain::{MealPlan, MealSlot, PlannedMeal, Recipe, RecipeId, Tab},
    error::AppError,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{info, warn};

use super::{deliver, BackRef, LoadState, LoadStatus, ModuleContext};
use crate::{
    navigation::{Destination, Navigator},
    presentation::{user_message, GENERIC_MESSAGE},
    store::AppStore,
    tasks::InFlight,
    ui::UiDispatcher,
    workers::MealPlanWorker,
};

pub trait MealPlannerBusinessLogic: Send + Sync {
    fn load_meal_plan(&self) -> JoinHandle<()>;
}

pub trait MealPlannerPresentationLogic: Send + Sync {
    fn present_meal_plan(&self, response: Result<MealPlan, AppError>);
}

pub struct MealPlannerInteractor {
    worker: Arc<dyn MealPlanWorker>,
    ui: UiDispatcher,
    presenter: Weak<dyn MealPlannerPresentationLogic>,
    in_flight: InFlight,
}

impl MealPlannerInteractor {
    pub fn new(
        worker: Arc<dyn MealPlanWorker>,
        ui: UiDispatcher,
        runtime: Handle,
        presenter: Weak<dyn MealPlannerPresentationLogic>,
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

impl MealPlannerBusinessLogic for MealPlannerInteractor {
    fn load_meal_plan(&self) -> JoinHandle<()> {
        let worker = Arc::clone(&self.worker);
        let ui = self.ui.clone();
        let presenter = self.presenter.clone();
        self.in_flight.spawn(async move {
            info!("loading meal plan");
            let response = worker.fetch_meal_plan().await;
            deliver(&ui, presenter, "load_meal_plan", move |presenter| {
                presenter.present_meal_plan(response)
            });
        })
    }
}

pub struct MealPlannerPresenter {
    store: Arc<AppStore>,
    view_model: Weak<MealPlannerViewModel>,
}

impl MealPlannerPresenter {
    pub fn new(store: Arc<AppStore>, view_model: Weak<MealPlannerViewModel>) -> Self {
        Self { store, view_model }
    }
}

impl MealPlannerPresentationLogic for MealPlannerPresenter {
    fn present_meal_plan(&self, response: Result<MealPlan, AppError>) {
        match response {
            Ok(plan) => {
                info!(meals = plan.meals().len(), "meal plan loaded");
                self.store.update(|state| state.meal_plan = plan);
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.finish();
                }
            }
            Err(err) => {
                warn!("meal plan load failed: {err}");
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.fail(user_message(&err));
                }
            }
        }
    }
}

pub struct MealPlannerViewModel {
    store: Arc<AppStore>,
    status: LoadStatus,
    interactor: BackRef<dyn MealPlannerBusinessLogic>,
    router: BackRef<MealPlannerRouter>,
}

impl MealPlannerViewModel {
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
        interactor: &Arc<dyn MealPlannerBusinessLogic>,
        router: &Arc<MealPlannerRouter>,
    ) {
        self.interactor.bind(Arc::downgrade(interactor));
        self.router.bind(Arc::downgrade(router));
    }

    pub fn load_meal_plan(&self) -> Option<JoinHandle<()>> {
        self.status.begin();
        match self.interactor.upgrade() {
            Some(interactor) => Some(interactor.load_meal_plan()),
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

    pub fn meal_plan(&self) -> MealPlan {
        self.store.read(|state| state.meal_plan.clone())
    }

    pub fn meals_on(&self, date: NaiveDate) -> Vec<PlannedMeal> {
        self.store.read(|state| {
            state
                .meal_plan
                .meals_on(date)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn want_today(&self) -> Vec<Recipe> {
        self.store.read(|state| {
            state
                .want_today
                .iter()
                .filter_map(|recipe_id| state.recipe(*recipe_id).cloned())
                .collect()
        })
    }

    pub fn navigate_to_shopping_list(&self) {
        if let Some(router) = self.router.upgrade() {
            router.navigate_to_shopping_list();
        }
    }

    pub fn navigate_to_recipe(&self, recipe_id: RecipeId) {
        if let Some(router) = self.router.upgrade() {
            router.navigate_to_recipe(recipe_id);
        }
    }
}

pub struct MealPlannerRouter {
    store: Arc<AppStore>,
    navigator: Arc<dyn Navigator>,
}

impl MealPlannerRouter {
    pub fn create_module(context: &ModuleContext) -> MealPlannerModule {
        let view_model = Arc::new(MealPlannerViewModel::new(Arc::clone(&context.store)));
        let presenter = Arc::new(MealPlannerPresenter::new(
            Arc::clone(&context.store),
            Arc::downgrade(&view_model),
        ));
        let presentation: Arc<dyn MealPlannerPresentationLogic> = presenter.clone();
        let interactor = Arc::new(MealPlannerInteractor::new(
            Arc::clone(&context.workers.meal_plan),
            context.ui.clone(),
            context.runtime.clone(),
            Arc::downgrade(&presentation),
        ));
        let router = Arc::new(MealPlannerRouter {
            store: Arc::clone(&context.store),
            navigator: Arc::clone(&context.navigator),
        });

        let business: Arc<dyn MealPlannerBusinessLogic> = interactor.clone();
        view_model.bind(&business, &router);

        MealPlannerModule {
            interactor,
            presenter,
            router,
            view_model,
        }
    }

    pub fn navigate_to_shopping_list(&self) {
        self.store
            .update(|state| state.selected_tab = Tab::ShoppingList);
    }

    pub fn navigate_to_recipe(&self, recipe_id: RecipeId) {
        self.navigator.open(Destination::RecipeDetail { recipe_id });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealRow {
    pub slot: MealSlot,
    pub recipe_id: RecipeId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub meals: Vec<MealRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealPlannerScreen {
    #[serde(flatten)]
    pub state: LoadState,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayPlan>,
    pub want_today: Vec<String>,
}

pub struct MealPlannerModule {
    interactor: Arc<MealPlannerInteractor>,
    presenter: Arc<MealPlannerPresenter>,
    router: Arc<MealPlannerRouter>,
    view_model: Arc<MealPlannerViewModel>,
}

impl MealPlannerModule {
    pub fn view_model(&self) -> &MealPlannerViewModel {
        &self.view_model
    }

    pub fn router(&self) -> &MealPlannerRouter {
        &self.router
    }

    pub fn interactor(&self) -> &MealPlannerInteractor {
        &self.interactor
    }

    pub fn presenter(&self) -> &MealPlannerPresenter {
        &self.presenter
    }

    pub fn render(&self) -> MealPlannerScreen {
        let state = self.view_model.state();
        let want_today = self
            .view_model
            .want_today()
            .into_iter()
            .map(|recipe| recipe.title)
            .collect();

        self.view_model.store.read(|app| {
            let plan = &app.meal_plan;
            let days = plan
                .start_date()
                .iter_days()
                .take_while(|date| *date <= plan.end_date())
                .map(|date| DayPlan {
                    date,
                    meals: plan
                        .meals_on(date)
                        .into_iter()
                        .map(|meal| MealRow {
                            slot: meal.slot,
                            recipe_id: meal.recipe_id,
                            title: app
                                .recipe(meal.recipe_id)
                                .map(|recipe| recipe.title.clone())
                                .unwrap_or_else(|| "Unknown recipe".to_string()),
                        })
                        .collect(),
                })
                .collect();

            MealPlannerScreen {
                state,
                start_date: plan.start_date(),
                end_date: plan.end_date(),
                days,
                want_today,
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/meal_planner_tests.rs"]
mod tests;

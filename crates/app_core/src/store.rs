//! Process-wide observable application state.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::domain::{
    Ingredient, MealPlan, MealSlot, PlannedMeal, PlannedMealId, Recipe, RecipeId, ShoppingCart,
    ShoppingItem, ShoppingItemId, Tab, User,
};
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootFlow {
    Authentication,
    Main,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub is_authenticated: bool,
    #[serde(default)]
    pub current_user: Option<User>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    pub meal_plan: MealPlan,
    #[serde(default)]
    pub shopping_cart: ShoppingCart,
    #[serde(default)]
    pub selected_tab: Tab,
    #[serde(default)]
    pub want_today: Vec<RecipeId>,
}

impl AppState {
    /// Signed-out state with an empty plan for the week starting `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            is_authenticated: false,
            current_user: None,
            recipes: Vec::new(),
            meal_plan: MealPlan::week_starting(today),
            shopping_cart: ShoppingCart::new(),
            selected_tab: Tab::default(),
            want_today: Vec::new(),
        }
    }

    pub fn with_sample_data(today: NaiveDate) -> Self {
        let mut state = Self::new(today);
        state.recipes = sample_recipes();

        let day = |offset: u64| today.checked_add_days(Days::new(offset)).unwrap_or(today);
        let planned = [
            (1, 1, day(0), MealSlot::Breakfast),
            (2, 2, day(0), MealSlot::Dinner),
            (3, 3, day(1), MealSlot::Lunch),
            (4, 2, day(2), MealSlot::Dinner),
        ];
        for (meal_id, recipe_id, date, slot) in planned {
            let meal = PlannedMeal {
                meal_id: PlannedMealId(meal_id),
                recipe_id: RecipeId(recipe_id),
                date,
                slot,
            };
            if let Err(err) = state.meal_plan.add_meal(meal) {
                warn!("skipping sample meal {meal_id}: {err}");
            }
        }

        for (item_id, name, quantity) in [(1, "Eggs", 2), (2, "Spinach", 1), (3, "Tomatoes", 4)] {
            state.shopping_cart.add_item(ShoppingItem {
                item_id: ShoppingItemId(item_id),
                name: name.to_string(),
                quantity,
                checked: false,
            });
        }
        state.want_today = vec![RecipeId(2)];
        state
    }

    /// Reads a JSON snapshot of the whole state.
    pub fn load_seed(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse seed file '{}'", path.display()))
    }

    pub fn root_flow(&self) -> RootFlow {
        if self.is_authenticated {
            RootFlow::Main
        } else {
            RootFlow::Authentication
        }
    }

    pub fn recipe(&self, recipe_id: RecipeId) -> Option<&Recipe> {
        self.recipes
            .iter()
            .find(|recipe| recipe.recipe_id == recipe_id)
    }
}

fn sample_recipes() -> Vec<Recipe> {
    let ingredient = |name: &str, quantity: f32, unit: &str| Ingredient {
        name: name.to_string(),
        quantity,
        unit: unit.to_string(),
    };
    vec![
        Recipe {
            recipe_id: RecipeId(1),
            title: "Spinach omelette".to_string(),
            servings: 1,
            prep_minutes: 10,
            ingredients: vec![ingredient("Eggs", 2.0, "pcs"), ingredient("Spinach", 50.0, "g")],
        },
        Recipe {
            recipe_id: RecipeId(2),
            title: "Tomato pasta".to_string(),
            servings: 2,
            prep_minutes: 25,
            ingredients: vec![
                ingredient("Spaghetti", 200.0, "g"),
                ingredient("Tomatoes", 4.0, "pcs"),
            ],
        },
        Recipe {
            recipe_id: RecipeId(3),
            title: "Lentil salad".to_string(),
            servings: 2,
            prep_minutes: 15,
            ingredients: vec![ingredient("Lentils", 150.0, "g")],
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Shared state container, created once and handed to workers and presenters.
///
/// Writers go through [`AppStore::update`], which serializes mutations and then
/// notifies every observer with the same post-mutation snapshot. Observers must
/// not write to the store from inside their callback.
pub struct AppStore {
    state: watch::Sender<AppState>,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
    write_lock: Mutex<()>,
    next_observer_id: AtomicU64,
}

impl AppStore {
    pub fn new(initial: AppState) -> Arc<Self> {
        let (state, _rx) = watch::channel(initial);
        Arc::new(Self {
            state,
            observers: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
            next_observer_id: AtomicU64::new(1),
        })
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = self.state.borrow().clone();
        let output = f(&mut next);
        self.state.send_replace(next.clone());

        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
        output
    }

    /// Receiver that always sees the latest state; usable from async views.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn observe(&self, observer: impl Fn(&AppState) + Send + Sync + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        debug!(observer = id.0, "store observer registered");
        id
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        before != observers.len()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

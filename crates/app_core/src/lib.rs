//! Presentation core for the meal-planning app.
//!
//! Each feature is a module of Interactor, Presenter, ViewModel and Router.
//! A ViewModel intent hands the use case to its Interactor, which runs the
//! Worker on a background task and posts the outcome back onto the
//! [`ui::UiContext`], where the Presenter writes the [`store::AppStore`] and
//! the ViewModel. The [`shell::AppShell`] decides which module is on screen.

pub mod config;
pub mod features;
pub mod navigation;
pub mod presentation;
pub mod shell;
pub mod store;
pub mod tasks;
pub mod ui;
pub mod workers;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use features::{
    auth::{AuthModule, AuthRouter, AuthViewModel},
    meal_planner::{MealPlannerModule, MealPlannerRouter, MealPlannerViewModel},
    shopping_list::{ShoppingListModule, ShoppingListRouter, ShoppingListViewModel},
    LoadState, ModuleContext,
};
pub use navigation::{Destination, LoggingNavigator, Navigator};
pub use shell::{ActiveScreen, AppShell, RenderedScreen};
pub use store::{AppState, AppStore, ObserverId, RootFlow};
pub use ui::{UiContext, UiDispatcher};
pub use workers::Workers;

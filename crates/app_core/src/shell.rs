//! Root flow selection and the tab shell.

use serde::Serialize;
use shared::domain::Tab;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    features::{
        auth::{AuthModule, AuthRouter, AuthScreen},
        meal_planner::{MealPlannerModule, MealPlannerRouter, MealPlannerScreen},
        shopping_list::{ShoppingListModule, ShoppingListRouter, ShoppingListScreen},
        ModuleContext,
    },
    store::{AppState, RootFlow},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenKey {
    Authentication,
    Tab(Tab),
}

impl ScreenKey {
    fn for_state(state: &AppState) -> Self {
        match state.root_flow() {
            RootFlow::Authentication => ScreenKey::Authentication,
            RootFlow::Main => ScreenKey::Tab(state.selected_tab),
        }
    }
}

pub enum ActiveScreen {
    Authentication(AuthModule),
    MealPlanner(MealPlannerModule),
    ShoppingList(ShoppingListModule),
    /// A tab with no feature module behind it.
    Placeholder(Tab),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum RenderedScreen {
    Authentication(AuthScreen),
    MealPlanner(MealPlannerScreen),
    ShoppingList(ShoppingListScreen),
    Placeholder { tab: Tab },
}

/// Holds exactly one live screen: the sign-in module while signed out, the
/// selected tab's module while signed in. While signed in it also keeps an
/// auth module for the session so sign-out is reachable from any tab.
pub struct AppShell {
    context: ModuleContext,
    key: ScreenKey,
    active: ActiveScreen,
    session: Option<AuthModule>,
}

impl AppShell {
    pub fn new(context: ModuleContext) -> Self {
        let key = context.store.read(ScreenKey::for_state);
        let active = build_screen(&context, key);
        let session = build_session(&context, key);
        Self {
            context,
            key,
            active,
            session,
        }
    }

    pub fn root_flow(&self) -> RootFlow {
        match self.key {
            ScreenKey::Authentication => RootFlow::Authentication,
            ScreenKey::Tab(_) => RootFlow::Main,
        }
    }

    pub fn selected_tab(&self) -> Option<Tab> {
        match self.key {
            ScreenKey::Authentication => None,
            ScreenKey::Tab(tab) => Some(tab),
        }
    }

    pub fn active(&self) -> &ActiveScreen {
        &self.active
    }

    /// Re-reads the store and swaps the live module if the flow or tab moved.
    /// The replaced module is dropped, aborting its pending work.
    pub fn sync(&mut self) -> bool {
        let key = self.context.store.read(ScreenKey::for_state);
        if key == self.key {
            return false;
        }
        info!(from = ?self.key, to = ?key, "switching screen");
        let flow_changed = matches!(self.key, ScreenKey::Authentication)
            != matches!(key, ScreenKey::Authentication);
        self.active = build_screen(&self.context, key);
        if flow_changed {
            self.session = build_session(&self.context, key);
        }
        self.key = key;
        true
    }

    /// Starts sign-out for the current session. Returns `None` when nobody
    /// is signed in. The shell flips back to authentication on the next
    /// `sync` after the result is presented.
    pub fn sign_out(&self) -> Option<JoinHandle<()>> {
        match &self.session {
            Some(session) => session.view_model().sign_out(),
            None => {
                debug!("sign-out requested while signed out");
                None
            }
        }
    }

    /// Loading and error state of the session's auth module.
    pub fn session(&self) -> Option<&AuthModule> {
        self.session.as_ref()
    }

    pub fn select_tab(&mut self, tab: Tab) -> bool {
        self.context.store.update(|state| state.selected_tab = tab);
        self.sync()
    }

    pub fn render(&self) -> RenderedScreen {
        match &self.active {
            ActiveScreen::Authentication(module) => RenderedScreen::Authentication(module.render()),
            ActiveScreen::MealPlanner(module) => RenderedScreen::MealPlanner(module.render()),
            ActiveScreen::ShoppingList(module) => RenderedScreen::ShoppingList(module.render()),
            ActiveScreen::Placeholder(tab) => RenderedScreen::Placeholder { tab: *tab },
        }
    }
}

fn build_screen(context: &ModuleContext, key: ScreenKey) -> ActiveScreen {
    match key {
        ScreenKey::Authentication => {
            ActiveScreen::Authentication(AuthRouter::create_module(context))
        }
        ScreenKey::Tab(Tab::MealPlanner) => {
            ActiveScreen::MealPlanner(MealPlannerRouter::create_module(context))
        }
        ScreenKey::Tab(Tab::ShoppingList) => {
            ActiveScreen::ShoppingList(ShoppingListRouter::create_module(context))
        }
        ScreenKey::Tab(tab) => ActiveScreen::Placeholder(tab),
    }
}

fn build_session(context: &ModuleContext, key: ScreenKey) -> Option<AuthModule> {
    match key {
        ScreenKey::Authentication => None,
        ScreenKey::Tab(_) => Some(AuthRouter::create_module(context)),
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;

use serde::Serialize;
use shared::domain::RecipeId;
use tracing::info;

/// Screens opened outside the tab shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Destination {
    SignUp,
    PasswordReset,
    RecipeDetail { recipe_id: RecipeId },
}

/// Platform navigation coordinator that routers delegate to.
pub trait Navigator: Send + Sync {
    fn open(&self, destination: Destination);
}

pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn open(&self, destination: Destination) {
        info!(?destination, "navigation requested");
    }
}

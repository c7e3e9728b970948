use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use app_core::{
    config::{load_settings, load_settings_from},
    ActiveScreen, AppShell, AppState, AppStore, LoggingNavigator, ModuleContext, UiContext,
    Workers,
};
use chrono::Local;
use clap::{Parser, ValueEnum};
use shared::{domain::Tab, request::SignInRequest};
use tokio::runtime::Handle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    Local,
    Apple,
    Google,
}

#[derive(Parser, Debug)]
struct Args {
    /// Config file; defaults to ./mealplan.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Provider::Local)]
    provider: Provider,
    #[arg(long, default_value = "cook@example.com")]
    email: String,
    #[arg(long, default_value = "password")]
    password: String,
    /// Identity token for Apple or Google sign-in.
    #[arg(long)]
    token: Option<String>,
    /// Sign out again after showing the tabs.
    #[arg(long)]
    sign_out: bool,
}

fn sign_in_request(args: &Args) -> SignInRequest {
    let token = args.token.clone().unwrap_or_default();
    match args.provider {
        Provider::Local => SignInRequest::Password {
            email: args.email.clone(),
            password: args.password.clone(),
        },
        Provider::Apple => SignInRequest::Apple {
            identity_token: token,
        },
        Provider::Google => SignInRequest::Google { id_token: token },
    }
}

fn print_screen(shell: &AppShell) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&shell.render())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let initial = match &settings.seed_path {
        Some(path) => AppState::load_seed(path)?,
        None => AppState::with_sample_data(Local::now().date_naive()),
    };
    let store = AppStore::new(initial);
    store.observe(|state| {
        debug!(
            authenticated = state.is_authenticated,
            tab = ?state.selected_tab,
            "app state changed"
        );
    });

    let mut ui = UiContext::new();
    let context = ModuleContext::new(
        Arc::clone(&store),
        ui.dispatcher(),
        Arc::new(LoggingNavigator),
        Workers::store_backed(&store, settings.worker_delay()),
        Handle::current(),
    );
    let mut shell = AppShell::new(context);

    if let ActiveScreen::Authentication(module) = shell.active() {
        module.view_model().sign_in(sign_in_request(&args));
        ui.run_next().await;
        if let Some(message) = module.view_model().error_message() {
            print_screen(&shell)?;
            bail!("sign-in failed: {message}");
        }
    }
    shell.sync();
    info!(flow = ?shell.root_flow(), "signed in");

    shell.select_tab(Tab::MealPlanner);
    if let ActiveScreen::MealPlanner(module) = shell.active() {
        module.view_model().load_meal_plan();
        ui.run_next().await;
    }
    print_screen(&shell)?;

    shell.select_tab(Tab::ShoppingList);
    if let ActiveScreen::ShoppingList(module) = shell.active() {
        module.view_model().load_shopping_cart();
        ui.run_next().await;
    }
    print_screen(&shell)?;

    if args.sign_out && shell.sign_out().is_some() {
        ui.run_next().await;
        shell.sync();
        info!(flow = ?shell.root_flow(), "signed out");
        print_screen(&shell)?;
    }

    Ok(())
}

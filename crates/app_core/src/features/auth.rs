use std::sync::{Arc, Weak};

use serde::Serialize;
use shared::{
    domain::{AuthProvider, Tab, User},
    error::AppError,
    request::SignInRequest,
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
    workers::AuthWorker,
};

pub trait AuthBusinessLogic: Send + Sync {
    fn sign_in(&self, request: SignInRequest) -> JoinHandle<()>;
    fn sign_out(&self) -> JoinHandle<()>;
}

pub trait AuthPresentationLogic: Send + Sync {
    fn present_sign_in(&self, response: Result<User, AppError>);
    fn present_sign_out(&self, response: Result<(), AppError>);
}

pub struct AuthInteractor {
    worker: Arc<dyn AuthWorker>,
    ui: UiDispatcher,
    presenter: Weak<dyn AuthPresentationLogic>,
    in_flight: InFlight,
}

impl AuthInteractor {
    pub fn new(
        worker: Arc<dyn AuthWorker>,
        ui: UiDispatcher,
        runtime: Handle,
        presenter: Weak<dyn AuthPresentationLogic>,
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

impl AuthBusinessLogic for AuthInteractor {
    fn sign_in(&self, request: SignInRequest) -> JoinHandle<()> {
        let worker = Arc::clone(&self.worker);
        let ui = self.ui.clone();
        let presenter = self.presenter.clone();
        self.in_flight.spawn(async move {
            info!(provider = ?request.provider(), "signing in");
            let response = worker.sign_in(&request).await;
            deliver(&ui, presenter, "sign_in", move |presenter| {
                presenter.present_sign_in(response)
            });
        })
    }

    fn sign_out(&self) -> JoinHandle<()> {
        let worker = Arc::clone(&self.worker);
        let ui = self.ui.clone();
        let presenter = self.presenter.clone();
        self.in_flight.spawn(async move {
            info!("signing out");
            let response = worker.sign_out().await;
            deliver(&ui, presenter, "sign_out", move |presenter| {
                presenter.present_sign_out(response)
            });
        })
    }
}

pub struct AuthPresenter {
    store: Arc<AppStore>,
    view_model: Weak<AuthViewModel>,
}

impl AuthPresenter {
    pub fn new(store: Arc<AppStore>, view_model: Weak<AuthViewModel>) -> Self {
        Self { store, view_model }
    }

    fn present_failure(&self, use_case: &str, err: AppError) {
        warn!(use_case, "authentication failed: {err}");
        if let Some(view_model) = self.view_model.upgrade() {
            view_model.status.fail(user_message(&err));
        }
    }
}

impl AuthPresentationLogic for AuthPresenter {
    fn present_sign_in(&self, response: Result<User, AppError>) {
        match response {
            Ok(user) => {
                info!(user_id = user.user_id.0, provider = ?user.provider, "signed in");
                self.store.update(|state| {
                    state.is_authenticated = true;
                    state.current_user = Some(user);
                    state.selected_tab = Tab::default();
                });
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.finish();
                }
            }
            Err(err) => self.present_failure("sign_in", err),
        }
    }

    fn present_sign_out(&self, response: Result<(), AppError>) {
        match response {
            Ok(()) => {
                info!("signed out");
                self.store.update(|state| {
                    state.is_authenticated = false;
                    state.current_user = None;
                    state.selected_tab = Tab::default();
                });
                if let Some(view_model) = self.view_model.upgrade() {
                    view_model.status.finish();
                }
            }
            Err(err) => self.present_failure("sign_out", err),
        }
    }
}

pub struct AuthViewModel {
    store: Arc<AppStore>,
    status: LoadStatus,
    interactor: BackRef<dyn AuthBusinessLogic>,
    router: BackRef<AuthRouter>,
}

impl AuthViewModel {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self {
            store,
            status: LoadStatus::new(),
            interactor: BackRef::new(),
            router: BackRef::new(),
        }
    }

    pub fn bind(&self, interactor: &Arc<dyn AuthBusinessLogic>, router: &Arc<AuthRouter>) {
        self.interactor.bind(Arc::downgrade(interactor));
        self.router.bind(Arc::downgrade(router));
    }

    pub fn sign_in(&self, request: SignInRequest) -> Option<JoinHandle<()>> {
        self.status.begin();
        match self.interactor.upgrade() {
            Some(interactor) => Some(interactor.sign_in(request)),
            None => {
                self.status.fail(GENERIC_MESSAGE.to_string());
                None
            }
        }
    }

    pub fn sign_in_with_password(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Option<JoinHandle<()>> {
        self.sign_in(SignInRequest::Password {
            email: email.into(),
            password: password.into(),
        })
    }

    pub fn sign_in_with_apple(&self, identity_token: impl Into<String>) -> Option<JoinHandle<()>> {
        self.sign_in(SignInRequest::Apple {
            identity_token: identity_token.into(),
        })
    }

    pub fn sign_in_with_google(&self, id_token: impl Into<String>) -> Option<JoinHandle<()>> {
        self.sign_in(SignInRequest::Google {
            id_token: id_token.into(),
        })
    }

    pub fn sign_out(&self) -> Option<JoinHandle<()>> {
        self.status.begin();
        match self.interactor.upgrade() {
            Some(interactor) => Some(interactor.sign_out()),
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

    pub fn is_authenticated(&self) -> bool {
        self.store.read(|state| state.is_authenticated)
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.read(|state| state.current_user.clone())
    }

    pub fn navigate_to_sign_up(&self) {
        if let Some(router) = self.router.upgrade() {
            router.navigate_to_sign_up();
        }
    }

    pub fn navigate_to_password_reset(&self) {
        if let Some(router) = self.router.upgrade() {
            router.navigate_to_password_reset();
        }
    }
}

pub struct AuthRouter {
    navigator: Arc<dyn Navigator>,
}

impl AuthRouter {
    pub fn create_module(context: &ModuleContext) -> AuthModule {
        let view_model = Arc::new(AuthViewModel::new(Arc::clone(&context.store)));
        let presenter = Arc::new(AuthPresenter::new(
            Arc::clone(&context.store),
            Arc::downgrade(&view_model),
        ));
        let presentation: Arc<dyn AuthPresentationLogic> = presenter.clone();
        let interactor = Arc::new(AuthInteractor::new(
            Arc::clone(&context.workers.auth),
            context.ui.clone(),
            context.runtime.clone(),
            Arc::downgrade(&presentation),
        ));
        let router = Arc::new(AuthRouter {
            navigator: Arc::clone(&context.navigator),
        });

        let business: Arc<dyn AuthBusinessLogic> = interactor.clone();
        view_model.bind(&business, &router);

        AuthModule {
            interactor,
            presenter,
            router,
            view_model,
        }
    }

    pub fn navigate_to_sign_up(&self) {
        self.navigator.open(Destination::SignUp);
    }

    pub fn navigate_to_password_reset(&self) {
        self.navigator.open(Destination::PasswordReset);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthScreen {
    #[serde(flatten)]
    pub state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_in_as: Option<String>,
    pub providers: Vec<AuthProvider>,
}

pub struct AuthModule {
    interactor: Arc<AuthInteractor>,
    presenter: Arc<AuthPresenter>,
    router: Arc<AuthRouter>,
    view_model: Arc<AuthViewModel>,
}

impl AuthModule {
    pub fn view_model(&self) -> &AuthViewModel {
        &self.view_model
    }

    pub fn router(&self) -> &AuthRouter {
        &self.router
    }

    pub fn interactor(&self) -> &AuthInteractor {
        &self.interactor
    }

    pub fn presenter(&self) -> &AuthPresenter {
        &self.presenter
    }

    pub fn render(&self) -> AuthScreen {
        AuthScreen {
            state: self.view_model.state(),
            signed_in_as: self
                .view_model
                .current_user()
                .map(|user| user.display_name),
            providers: vec![AuthProvider::Local, AuthProvider::Apple, AuthProvider::Google],
        }
    }
}

#[cfg(test)]
#[path = "../tests/auth_tests.rs"]
mod tests;

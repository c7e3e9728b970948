//! Feature modules. Each one is built by its router and owned by the value the
//! router returns; the pieces only point at each other through `Weak` handles.

use std::sync::{Arc, OnceLock, Weak};

use serde::Serialize;
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, warn};

use crate::{navigation::Navigator, store::AppStore, ui::UiDispatcher, workers::Workers};

pub mod auth;
pub mod meal_planner;
pub mod shopping_list;

/// Everything a router needs to assemble a module. `runtime` is where
/// interactors run their workers; the UI thread itself needs none.
#[derive(Clone)]
pub struct ModuleContext {
    pub store: Arc<AppStore>,
    pub ui: UiDispatcher,
    pub navigator: Arc<dyn Navigator>,
    pub workers: Workers,
    pub runtime: Handle,
}

impl ModuleContext {
    pub fn new(
        store: Arc<AppStore>,
        ui: UiDispatcher,
        navigator: Arc<dyn Navigator>,
        workers: Workers,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            ui,
            navigator,
            workers,
            runtime,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadState {
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Observable loading/error pair embedded in every view model.
pub(crate) struct LoadStatus {
    state: watch::Sender<LoadState>,
}

impl LoadStatus {
    pub(crate) fn new() -> Self {
        let (state, _rx) = watch::channel(LoadState::default());
        Self { state }
    }

    pub(crate) fn begin(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error_message = None;
        });
    }

    pub(crate) fn finish(&self) {
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error_message = None;
        });
    }

    pub(crate) fn fail(&self, message: String) {
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error_message = Some(message);
        });
    }

    pub(crate) fn snapshot(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }
}

/// Back-reference from a view model, assigned once by the router after the
/// pieces it points at exist.
pub(crate) struct BackRef<T: ?Sized> {
    slot: OnceLock<Weak<T>>,
}

impl<T: ?Sized> BackRef<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub(crate) fn bind(&self, target: Weak<T>) {
        if self.slot.set(target).is_err() {
            warn!("back-reference already bound; keeping the first binding");
        }
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<T>> {
        self.slot.get().and_then(Weak::upgrade)
    }
}

/// Hands a worker result to the presenter on the UI context. The presenter is
/// looked up only when the job runs, so a module dropped in the meantime just
/// discards the result.
pub(crate) fn deliver<P>(
    ui: &UiDispatcher,
    presenter: Weak<P>,
    use_case: &'static str,
    present: impl FnOnce(&P) + Send + 'static,
) where
    P: ?Sized + Send + Sync + 'static,
{
    ui.dispatch(move || match presenter.upgrade() {
        Some(presenter) => present(&*presenter),
        None => debug!(use_case, "presenter released before response arrived"),
    });
}

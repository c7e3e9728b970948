//! The UI-owning execution context. Background tasks never touch view models
//! directly; they post jobs through a [`UiDispatcher`] and whoever owns the
//! [`UiContext`] runs them, one at a time, in posting order.

use tokio::sync::mpsc;
use tracing::warn;

type UiJob = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiJob>,
}

impl UiDispatcher {
    /// Returns false when the UI context is gone and the job was dropped.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) -> bool {
        match self.tx.send(Box::new(job)) {
            Ok(()) => true,
            Err(_) => {
                warn!("UI context closed; dropping job");
                false
            }
        }
    }
}

pub struct UiContext {
    rx: mpsc::UnboundedReceiver<UiJob>,
    tx: mpsc::UnboundedSender<UiJob>,
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UiContext {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx, tx }
    }

    pub fn dispatcher(&self) -> UiDispatcher {
        UiDispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Runs every job already queued, frame-loop style. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits for the next job and runs it. The context keeps its own sender,
    /// so this only returns once a job arrives.
    pub async fn run_next(&mut self) {
        if let Some(job) = self.rx.recv().await {
            job();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn runs_jobs_in_posting_order() {
        let mut ui = UiContext::new();
        let dispatcher = ui.dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let seen = Arc::clone(&seen);
            assert!(dispatcher.dispatch(move || seen.lock().expect("lock").push(n)));
        }

        assert_eq!(ui.run_pending(), 3);
        assert_eq!(*seen.lock().expect("lock"), vec![0, 1, 2]);
        assert_eq!(ui.run_pending(), 0);
    }

    #[test]
    fn dispatch_after_context_drop_reports_failure() {
        let ui = UiContext::new();
        let dispatcher = ui.dispatcher();
        drop(ui);
        assert!(!dispatcher.dispatch(|| {}));
    }

    #[tokio::test]
    async fn run_next_waits_for_background_job() {
        let mut ui = UiContext::new();
        let dispatcher = ui.dispatcher();
        let seen = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&seen);
        tokio::spawn(async move {
            dispatcher.dispatch(move || *flag.lock().expect("lock") = true);
        });

        ui.run_next().await;
        assert!(*seen.lock().expect("lock"));
    }
}

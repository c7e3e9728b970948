use std::{
    future::Future,
    sync::{Mutex, PoisonError},
};

use tokio::{
    runtime::Handle,
    task::{AbortHandle, JoinHandle},
};

/// Background tasks started by one interactor. Dropping the set aborts
/// whatever is still running, so a torn-down screen gets no late writes.
///
/// Tasks go to the runtime captured at construction, so intents may be
/// called from a UI thread that has no runtime of its own.
pub struct InFlight {
    runtime: Handle,
    handles: Mutex<Vec<AbortHandle>>,
}

impl InFlight {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.runtime.spawn(task);
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|existing| !existing.is_finished());
        handles.push(handle.abort_handle());
        handle
    }

    pub fn running(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    pub fn abort_all(&self) {
        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in handles {
            handle.abort();
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn dropping_set_aborts_running_tasks() {
        let tasks = InFlight::new(Handle::current());
        let handle = tasks.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert_eq!(tasks.running(), 1);

        drop(tasks);
        let err = handle.await.expect_err("task should be aborted");
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn finished_tasks_are_not_counted() {
        let tasks = InFlight::new(Handle::current());
        tasks.spawn(async {}).await.expect("task completes");
        assert_eq!(tasks.running(), 0);
    }

    #[test]
    fn spawns_from_a_thread_without_a_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        let tasks = InFlight::new(runtime.handle().clone());

        let handle = tasks.spawn(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
        });
        runtime.block_on(handle).expect("task completes");
        assert_eq!(tasks.running(), 0);
    }
}

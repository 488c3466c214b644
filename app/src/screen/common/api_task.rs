use std::future::Future;

use tokio::task::JoinHandle;

/// A background request running against a cloned `api`. At most one runs at a time.
pub struct ApiTask<A, R> {
    api: A,
    task: Option<JoinHandle<R>>,
}

impl<A: Clone + Send + 'static, R: Send + 'static> ApiTask<A, R> {
    pub fn new(api: A) -> Self {
        Self { api, task: None }
    }

    /// Spawns `run` unless a task is already running. Returns whether it was spawned.
    pub fn start<F, Fut>(&mut self, run: F) -> bool
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }

        self.task = Some(tokio::task::spawn(run(self.api.clone())));

        true
    }

    /// Aborts the running task, if any, and spawns `run` in its place.
    pub fn restart<F, Fut>(&mut self, run: F)
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.abort();
        self.start(run);
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Takes the result of a finished task. Never blocks on a running one.
    pub async fn poll(&mut self) -> Option<R> {
        match self.task.take() {
            Some(join_handle) if join_handle.is_finished() => match join_handle.await {
                Ok(result) => Some(result),
                Err(error) => {
                    log::error!("Api task failed: {error}");
                    None
                }
            },
            task => {
                self.task = task;
                None
            }
        }
    }

    pub fn abort(&mut self) {
        if let Some(join_handle) = self.task.take() {
            join_handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_task_at_a_time() {
        let mut task = ApiTask::new(2_u32);

        assert!(task.start(|api| async move { api * 21 }));
        assert!(!task.start(|api| async move { api }));
        assert!(task.is_running());

        let mut result = None;
        while result.is_none() {
            tokio::task::yield_now().await;
            result = task.poll().await;
        }

        assert_eq!(result, Some(42));
        assert!(!task.is_running());
    }

    #[tokio::test]
    async fn test_restart_replaces_running_task() {
        let mut task = ApiTask::new(());

        task.start(|_| std::future::pending::<u32>());
        task.restart(|_| async { 7 });

        let mut result = None;
        while result.is_none() {
            tokio::task::yield_now().await;
            result = task.poll().await;
        }

        assert_eq!(result, Some(7));
    }
}

//! Runs blocking engine calls off the async runtime.
//!
//! Every call holds a semaphore permit for the lifetime of its blocking
//! task, so at most `max_concurrent` engine computations run at once even
//! when a caller gives up on a timed out call.

use crate::engine::AlgebraEngine;
use crate::solver::Solution;
use crate::{CasError, Result};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub max_concurrent: usize,
    /// `None` disables the per-call deadline.
    pub timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            timeout: Some(Duration::from_millis(30_000)),
        }
    }
}

/// Shared handle to an [`AlgebraEngine`] with bounded concurrency.
#[derive(Clone)]
pub struct EngineDispatcher {
    engine: Arc<dyn AlgebraEngine>,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
}

impl EngineDispatcher {
    pub fn new(engine: Arc<dyn AlgebraEngine>, config: DispatcherConfig) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            timeout: config.timeout,
        }
    }

    pub async fn simplify(&self, expression: String) -> Result<String> {
        self.run("simplify", move |engine| engine.simplify(&expression))
            .await
    }

    pub async fn solve(&self, equations: Vec<String>, variable: String) -> Result<Solution> {
        self.run("solve", move |engine| engine.solve(&equations, &variable))
            .await
    }

    pub async fn evaluate(&self, program: String) -> Result<String> {
        self.run("evaluate", move |engine| engine.evaluate(&program))
            .await
    }

    /// Permits not currently held by a running computation.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    async fn run<T, F>(&self, op: &'static str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AlgebraEngine) -> Result<T> + Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CasError::EngineUnavailable)?;

        let engine = Arc::clone(&self.engine);
        debug!(target: "cas::engine", "Dispatching {} call", op);
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(engine.as_ref())
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let ms = limit.as_millis() as u64;
                    warn!(target: "cas::engine", "{} call timed out after {} ms", op, ms);
                    return Err(CasError::Timeout(ms));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                warn!(target: "cas::engine", "{} call panicked: {}", op, message);
                Err(CasError::EnginePanic(message))
            }
            Err(e) => {
                warn!(target: "cas::engine", "{} call was cancelled: {}", op, e);
                Err(CasError::EngineUnavailable)
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cas;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine whose calls sleep and record peak concurrency.
    #[derive(Default)]
    struct SlowEngine {
        delay: Duration,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl AlgebraEngine for SlowEngine {
        fn simplify(&self, expression: &str) -> Result<String> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(expression.to_string())
        }

        fn solve(&self, _equations: &[String], _variable: &str) -> Result<Solution> {
            panic!("solver exploded");
        }
    }

    fn slow(delay_ms: u64) -> Arc<SlowEngine> {
        Arc::new(SlowEngine {
            delay: Duration::from_millis(delay_ms),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_dispatches_to_bundled_engine() {
        let dispatcher = EngineDispatcher::new(Arc::new(Cas), DispatcherConfig::default());
        assert_eq!(dispatcher.simplify("2+2".into()).await.unwrap(), "4");
        assert_eq!(dispatcher.evaluate("x = 2\nx^3".into()).await.unwrap(), "8");
        let solution = dispatcher
            .solve(vec!["2x = 8".into()], "x".into())
            .await
            .unwrap();
        assert_eq!(solution.result, "4");
        assert_eq!(dispatcher.available_permits(), 4);
    }

    #[tokio::test]
    async fn test_oversized_input_is_rejected_not_fatal() {
        let dispatcher = EngineDispatcher::new(Arc::new(Cas), DispatcherConfig::default());
        let sum = format!("{}1", "x+".repeat(200_000));

        let err = dispatcher.simplify(sum.clone()).await.unwrap_err();
        assert_eq!(err, CasError::Parse("expression too long".into()));
        let err = dispatcher.evaluate(sum.clone()).await.unwrap_err();
        assert_eq!(err, CasError::Parse("expression too long".into()));
        let err = dispatcher
            .solve(vec![format!("{} = 0", sum)], "x".into())
            .await
            .unwrap_err();
        assert_eq!(err, CasError::Parse("expression too long".into()));
    }

    #[tokio::test]
    async fn test_timeout() {
        let config = DispatcherConfig {
            max_concurrent: 1,
            timeout: Some(Duration::from_millis(20)),
        };
        let dispatcher = EngineDispatcher::new(slow(300), config);
        let err = dispatcher.simplify("x".into()).await.unwrap_err();
        assert_eq!(err, CasError::Timeout(20));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrency_is_bounded() {
        let engine = slow(30);
        let config = DispatcherConfig {
            max_concurrent: 1,
            timeout: None,
        };
        let dispatcher = EngineDispatcher::new(engine.clone(), config);

        let calls = (0..4).map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.simplify(format!("x{}", i)).await })
        });
        for call in calls.collect::<Vec<_>>() {
            assert!(call.await.unwrap().is_ok());
        }
        assert_eq!(engine.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let dispatcher = EngineDispatcher::new(slow(0), DispatcherConfig::default());
        let err = dispatcher
            .solve(vec!["x = 1".into()], "x".into())
            .await
            .unwrap_err();
        assert_eq!(err, CasError::EnginePanic("solver exploded".into()));
        // the permit is released after the panic
        assert_eq!(dispatcher.available_permits(), 4);
    }
}

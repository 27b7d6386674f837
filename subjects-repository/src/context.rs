//! Per-call cancellation and deadline handling.
//!
//! A store future that loses the race against the deadline or the cancellation
//! signal is dropped. Dropping releases its pooled connection or session, and an
//! uncommitted PostgreSQL transaction is rolled back, so an abandoned operation
//! either landed entirely before the drop or not at all.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::errors::SubjectRepositoryError;

/// Caller-supplied signals that bound a single operation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    timeout: Option<Duration>,
    cancel: Option<watch::Receiver<bool>>,
}

impl OperationContext {
    /// A context with neither deadline nor cancellation signal.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation signal. Sending `true` cancels the operation.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs `operation` until it completes, the deadline passes, or the caller cancels.
    ///
    /// `fallback_timeout` applies when the context has no deadline of its own.
    pub async fn run<T, F>(
        &self,
        fallback_timeout: Option<Duration>,
        operation: F,
    ) -> Result<T, SubjectRepositoryError>
    where
        F: Future<Output = Result<T, SubjectRepositoryError>>,
    {
        if self.is_cancelled() {
            return Err(SubjectRepositoryError::cancelled(
                "operation cancelled before it started",
            ));
        }

        let timeout = self.timeout.or(fallback_timeout);
        let mut cancel = self.cancel.clone();

        tokio::select! {
            result = operation => result,
            _ = wait_for_deadline(timeout) => Err(SubjectRepositoryError::unavailable(format!(
                "operation timed out after {:?}",
                timeout.unwrap_or_default()
            ))),
            _ = wait_for_cancellation(cancel.as_mut()) => {
                Err(SubjectRepositoryError::cancelled("operation cancelled by caller"))
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|receiver| *receiver.borrow())
            .unwrap_or(false)
    }
}

async fn wait_for_deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending().await,
    }
}

async fn wait_for_cancellation(cancel: Option<&mut watch::Receiver<bool>>) {
    let Some(receiver) = cancel else {
        return std::future::pending().await;
    };
    // A dropped sender can no longer cancel.
    let sender_dropped = receiver.wait_for(|cancelled| *cancelled).await.is_err();
    if sender_dropped {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_completes_without_signals() {
        let ctx = OperationContext::new();
        let result = ctx.run(None, async { Ok::<_, SubjectRepositoryError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_maps_to_store_unavailable() {
        let ctx = OperationContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(None, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, SubjectRepositoryError>(())
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::StoreUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timeout_applies() {
        let ctx = OperationContext::new();
        let result = ctx
            .run(Some(Duration::from_millis(10)), async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, SubjectRepositoryError>(())
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::StoreUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_operation() {
        let (tx, rx) = watch::channel(false);
        let ctx = OperationContext::new().with_cancellation(rx);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            tx.send(true).unwrap();
        });

        let result = ctx
            .run(None, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, SubjectRepositoryError>(())
            })
            .await;
        canceller.await.unwrap();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_never_runs() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let ctx = OperationContext::new().with_cancellation(rx);

        let polled = AtomicBool::new(false);
        let result = ctx
            .run(None, async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, SubjectRepositoryError>(())
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropped_sender_does_not_cancel() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let ctx = OperationContext::new().with_cancellation(rx);
        let result = ctx.run(None, async { Ok::<_, SubjectRepositoryError>("done") }).await;
        assert_eq!(result.unwrap(), "done");
    }
}

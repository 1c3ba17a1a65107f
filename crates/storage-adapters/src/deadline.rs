//! Per-call deadline shared by the networked adapters.
//!
//! External stores get a fixed budget per operation; a call that overruns it
//! is reported as a storage failure and never retried.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use domains::{DomainError, Result};
use tracing::error;

pub(crate) const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) async fn with_deadline<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            error!(op, ?limit, "store call timed out");
            Err(DomainError::Storage(format!("{op}: timed out after {limit:?}")))
        }
    }
}

/// Logs a driver error and converts it into `DomainError::Storage`.
pub(crate) fn store_error<E: Display>(op: &'static str) -> impl FnOnce(E) -> DomainError {
    move |err| {
        error!(op, error = %err, "store call failed");
        DomainError::Storage(format!("{op}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overrun_becomes_storage_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(1)
        };
        let err = with_deadline(Duration::from_millis(10), "slow_op", slow)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(msg) if msg.contains("slow_op")));
    }

    #[tokio::test]
    async fn domain_errors_pass_through() {
        let fut = async { Err::<(), _>(DomainError::PostNotFound("p".into())) };
        let err = with_deadline(DEFAULT_OP_TIMEOUT, "get", fut).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
    }
}

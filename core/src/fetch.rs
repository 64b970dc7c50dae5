use docsearch_async_utils::OrCancelExt;
use docsearch_protocol::ServiceError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

/// Await a collaborator call bounded by `timeout` and abandoned as soon as
/// `cancel` fires. `None` means the request was cancelled.
pub(crate) async fn bounded<T, F>(
    request: F,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Result<T, FetchError>>
where
    F: Future<Output = Result<T, ServiceError>> + Send,
    T: Send,
{
    match tokio::time::timeout(timeout, request).or_cancel(cancel).await {
        Err(_) => None,
        Ok(Err(_elapsed)) => Some(Err(FetchError::Timeout(timeout))),
        Ok(Ok(result)) => Some(result.map_err(FetchError::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn slow_request_times_out() {
        let cancel = CancellationToken::new();
        let result = bounded(
            async {
                sleep(Duration::from_secs(60)).await;
                Ok::<_, ServiceError>(1)
            },
            Duration::from_secs(15),
            &cancel,
        )
        .await;
        assert_eq!(result, Some(Err(FetchError::Timeout(Duration::from_secs(15)))));
    }

    #[tokio::test]
    async fn service_errors_pass_through() {
        let cancel = CancellationToken::new();
        let result = bounded(
            async { Err::<u8, _>(ServiceError::Unauthorized) },
            Duration::from_secs(1),
            &cancel,
        )
        .await;
        assert_eq!(
            result,
            Some(Err(FetchError::Service(ServiceError::Unauthorized)))
        );
    }

    #[tokio::test]
    async fn cancelled_request_yields_none() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = bounded(
            async {
                sleep(Duration::from_millis(50)).await;
                Ok::<_, ServiceError>(1)
            },
            Duration::from_secs(1),
            &cancel,
        )
        .await;
        assert_eq!(result, None);
    }
}

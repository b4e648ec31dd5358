use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::ConnectorError;

/// Result of one per-target send inside a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The provider accepted the message and returned this id.
    Success(String),
    /// The send failed with this short reason.
    Failure(String),
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The provider id or failure reason, whichever this outcome carries.
    pub fn into_entry(self) -> String {
        match self {
            Self::Success(id) | Self::Failure(id) => id,
        }
    }
}

impl From<Result<String, ConnectorError>> for TargetOutcome {
    fn from(result: Result<String, ConnectorError>) -> Self {
        match result {
            Ok(id) => Self::Success(id),
            Err(err) => Self::Failure(err.failure_reason().to_owned()),
        }
    }
}

/// Run `send` for every target concurrently and collect the outcomes.
///
/// All sends run to completion; a failing target never cancels its
/// siblings. The returned outcomes are in target order.
pub async fn settle<T, F, Fut>(targets: impl IntoIterator<Item = T>, send: F) -> Vec<TargetOutcome>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<String, ConnectorError>>,
{
    join_all(targets.into_iter().map(send))
        .await
        .into_iter()
        .map(TargetOutcome::from)
        .collect()
}

/// Decide the overall result of a settled fan-out.
///
/// At least one success yields one entry per target (the id or the failure
/// reason). No success, including an empty target list, yields a
/// total-failure error.
pub fn classify(label: &str, outcomes: Vec<TargetOutcome>) -> Result<Vec<String>, ConnectorError> {
    let attempted = outcomes.len();
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

    if succeeded == 0 {
        let reasons: Vec<String> = outcomes.into_iter().map(TargetOutcome::into_entry).collect();
        warn!(channel = label, attempted, "every target failed");
        return Err(ConnectorError::total_fan_out(attempted, label, &reasons));
    }

    if succeeded < attempted {
        warn!(
            channel = label,
            attempted,
            failed = attempted - succeeded,
            "partial delivery"
        );
    } else {
        debug!(channel = label, attempted, "all targets delivered");
    }

    Ok(outcomes.into_iter().map(TargetOutcome::into_entry).collect())
}

/// Send to every target and aggregate the outcomes.
///
/// `label` names the channel in the total-failure message, e.g. `"APNs"`.
pub async fn fan_out<T, F, Fut>(
    label: &str,
    targets: impl IntoIterator<Item = T>,
    send: F,
) -> Result<Vec<String>, ConnectorError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<String, ConnectorError>>,
{
    classify(label, settle(targets, send).await)
}

/// Group-address mode: exactly one provider call, whose error propagates
/// unchanged.
pub async fn single<Fut>(send: Fut) -> Result<Vec<String>, ConnectorError>
where
    Fut: Future<Output = Result<String, ConnectorError>>,
{
    send.await.map(|id| vec![id])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorKind;

    async fn echo(target: &str) -> Result<String, ConnectorError> {
        match target.strip_prefix("bad:") {
            Some(reason) => Err(ConnectorError::provider_rejection(400, "HTTP 400")
                .with_provider_message(reason)),
            None => Ok(format!("id-{target}")),
        }
    }

    #[tokio::test]
    async fn partial_success_lists_ids_and_reasons() {
        let ids = fan_out("APNs", ["a", "bad:BadDeviceToken"], echo)
            .await
            .unwrap();
        assert_eq!(ids, vec!["id-a".to_owned(), "BadDeviceToken".to_owned()]);
    }

    #[tokio::test]
    async fn reason_falls_back_to_message() {
        let ids = fan_out("SMS", ["ok", "boom"], |t| async move {
            if t == "boom" {
                Err(ConnectorError::transport("connection reset"))
            } else {
                Ok("1".to_owned())
            }
        })
        .await
        .unwrap();
        assert_eq!(ids, vec!["1".to_owned(), "connection reset".to_owned()]);
    }

    #[tokio::test]
    async fn all_failed_reports_count() {
        let err = fan_out("FCM", ["bad:Unregistered", "bad:InvalidArgument"], echo)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::TotalFanOutFailure);
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains('2'));
        assert_eq!(err.message, "All 2 FCM message(s) failed to send");
        assert_eq!(
            err.provider_message.as_deref(),
            Some("Unregistered; InvalidArgument")
        );
    }

    #[tokio::test]
    async fn empty_targets_is_total_failure() {
        let err = fan_out("APNs", Vec::<&str>::new(), echo).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TotalFanOutFailure);
        assert_eq!(err.message, "All 0 APNs message(s) failed to send");
    }

    #[tokio::test]
    async fn order_follows_targets_not_completion() {
        let ids = fan_out("APNs", [30_u64, 1, 15], |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(delay.to_string())
        })
        .await
        .unwrap();
        assert_eq!(ids, vec!["30", "1", "15"]);
    }

    #[tokio::test]
    async fn failures_do_not_cancel_siblings() {
        let completed = Arc::new(AtomicUsize::new(0));
        let outcomes = settle(0..4_u64, |i| {
            let completed = Arc::clone(&completed);
            async move {
                if i == 0 {
                    return Err(ConnectorError::transport("fast failure"));
                }
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(i.to_string())
            }
        })
        .await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(completed.load(Ordering::SeqCst), 3);
        assert_eq!(outcomes[0], TargetOutcome::Failure("fast failure".into()));
    }

    #[tokio::test]
    async fn sends_run_concurrently() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        settle(0..5, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ConnectorError>(String::new())
            }
        })
        .await;
        assert_eq!(peak.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn single_mode_returns_one_entry() {
        let ids = single(echo("topic")).await.unwrap();
        assert_eq!(ids, vec!["id-topic".to_owned()]);
    }

    #[tokio::test]
    async fn single_mode_propagates_error_unchanged() {
        let err = single(echo("bad:quota exceeded")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProviderRejection);
        assert_eq!(err.status_code, 400);
        assert_eq!(err.provider_message.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn classify_single_failure_is_total() {
        let err = classify("SMS", vec![TargetOutcome::Failure("nope".into())]).unwrap_err();
        assert_eq!(err.message, "All 1 SMS message(s) failed to send");
        assert_eq!(err.provider_message.as_deref(), Some("nope"));
    }
}

// --- File: crates/opaylink_opay/src/poller_test.rs ---
#[cfg(test)]
mod tests {
    use crate::error::OpayError;
    use crate::history::ValidationHistoryLog;
    use crate::models::ValidationResult;
    use crate::poller::{Trigger, ValidationPoller};
    use crate::repository::{InMemorySettingsRepository, SettingsRepository};
    use crate::service::ValidationService;
    use crate::status::{SubscriptionStatusStore, ValidationPhase};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[derive(Clone)]
    enum Outcome {
        Answer(ValidationResult),
        Rejected(u16, &'static str),
        Unreachable,
        Garbled,
    }

    /// Answers with a queued outcome, repeating the last one once the queue is drained.
    struct ScriptedService {
        calls: AtomicUsize,
        outcomes: Mutex<Vec<Outcome>>,
    }

    impl ScriptedService {
        fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcomes: Mutex::new(outcomes),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ValidationService for ScriptedService {
        async fn validate(&self, _api_key: &str) -> Result<ValidationResult, OpayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = {
                let mut outcomes = self.outcomes.lock().unwrap();
                if outcomes.len() > 1 {
                    outcomes.remove(0)
                } else {
                    outcomes[0].clone()
                }
            };
            match outcome {
                Outcome::Answer(result) => Ok(result),
                Outcome::Rejected(status, message) => Err(OpayError::Rejected {
                    status,
                    message: message.to_string(),
                }),
                Outcome::Unreachable => {
                    let err = reqwest::Client::new().get("not a url").send().await.unwrap_err();
                    Err(OpayError::Transport(err))
                }
                Outcome::Garbled => {
                    let err = serde_json::from_str::<ValidationResult>("<html>").unwrap_err();
                    Err(OpayError::Parse(err))
                }
            }
        }
    }

    fn premium() -> ValidationResult {
        ValidationResult {
            valid: true,
            plan: "Premium".to_string(),
            primary_domain: "shop.example.com".to_string(),
            domains: vec!["shop.example.com".to_string()],
            device_count: 2,
            active_number_count: 6,
            end_date: Some(Utc::now() + ChronoDuration::days(30)),
            subscription_id: "sub_42".to_string(),
            ..ValidationResult::default()
        }
    }

    async fn poller_with(
        service: Arc<ScriptedService>,
        stored_key: Option<&str>,
    ) -> (Arc<ValidationPoller>, Arc<InMemorySettingsRepository>) {
        let repository = Arc::new(InMemorySettingsRepository::new());
        if let Some(key) = stored_key {
            repository.save_key(key).await.unwrap();
        }
        let poller = Arc::new(ValidationPoller::new(
            service,
            Arc::new(SubscriptionStatusStore::new()),
            Arc::new(ValidationHistoryLog::default()),
            repository.clone(),
        ));
        (poller, repository)
    }

    #[tokio::test]
    async fn test_missing_key_rejected_before_network_call() {
        let service = ScriptedService::new(vec![Outcome::Answer(premium())]);
        let (poller, _) = poller_with(service.clone(), None).await;

        let err = poller.validate(Some("   "), Trigger::Manual).await.unwrap_err();
        assert!(matches!(err, OpayError::MissingApiKey));
        assert_eq!(service.calls(), 0);

        let history = poller.history().entries();
        assert_eq!(history.len(), 1);
        assert!(!history[0].valid);
        assert!(history[0].error.is_some());
        assert_eq!(poller.store().phase(), ValidationPhase::Unvalidated);
    }

    #[tokio::test]
    async fn test_success_updates_store_history_and_repository() {
        let service = ScriptedService::new(vec![Outcome::Answer(premium())]);
        let (poller, repository) = poller_with(service.clone(), Some("key_1")).await;

        let result = poller.validate(Some("key_1"), Trigger::Manual).await.unwrap();
        assert!(result.valid);
        assert_eq!(poller.store().phase(), ValidationPhase::Valid);
        assert_eq!(poller.store().current().plan, "Premium");
        assert!(poller.store().remaining().days >= 29);

        let history = poller.history().entries();
        assert_eq!(history.len(), 1);
        assert!(history[0].valid);
        assert_eq!(history[0].device_count, 2);

        let saved = repository.load().await.unwrap();
        assert_eq!(saved.validation.map(|v| v.subscription_id), Some("sub_42".to_string()));
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_result() {
        let service = ScriptedService::new(vec![
            Outcome::Answer(premium()),
            Outcome::Rejected(403, "Subscription suspended"),
        ]);
        let (poller, _) = poller_with(service.clone(), Some("key_1")).await;

        poller.validate(Some("key_1"), Trigger::Manual).await.unwrap();
        let before = poller.store().current();

        let err = poller.validate(Some("key_1"), Trigger::Manual).await.unwrap_err();
        assert!(matches!(err, OpayError::Rejected { status: 403, .. }));

        let after = poller.store().current();
        assert_eq!(after.domains, before.domains);
        assert_eq!(after.plan, before.plan);
        assert_eq!(after.device_count, before.device_count);
        assert_eq!(poller.store().phase(), ValidationPhase::Valid);

        let history = poller.history().entries();
        assert_eq!(history.len(), 2);
        assert!(!history[0].valid);
        assert!(history[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Subscription suspended")));
    }

    #[tokio::test]
    async fn test_unusable_answers_after_valid_result_leave_store_untouched() {
        let service = ScriptedService::new(vec![
            Outcome::Answer(premium()),
            Outcome::Unreachable,
            Outcome::Garbled,
        ]);
        let (poller, repository) = poller_with(service.clone(), Some("key_1")).await;

        poller.validate(Some("key_1"), Trigger::Manual).await.unwrap();
        let result = poller.store().current();
        let remaining = poller.store().remaining();

        let err = poller.validate(Some("  "), Trigger::Manual).await.unwrap_err();
        assert!(matches!(err, OpayError::MissingApiKey));
        let err = poller.validate(Some("key_1"), Trigger::Manual).await.unwrap_err();
        assert!(matches!(err, OpayError::Transport(_)));
        let err = poller.validate(Some("key_1"), Trigger::Scheduled).await.unwrap_err();
        assert!(matches!(err, OpayError::Parse(_)));

        assert_eq!(service.calls(), 3);
        assert_eq!(poller.store().current(), result);
        assert_eq!(poller.store().remaining(), remaining);
        assert_eq!(poller.store().phase(), ValidationPhase::Valid);

        let history = poller.history().entries();
        assert_eq!(history.len(), 4);
        assert!(history[..3].iter().all(|entry| !entry.valid && entry.error.is_some()));
        assert!(history[3].valid);

        let saved = repository.load().await.unwrap();
        assert_eq!(saved.validation, Some(result));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_skips_invalid_subscription() {
        let service = ScriptedService::new(vec![Outcome::Answer(premium())]);
        let (poller, _) = poller_with(service.clone(), Some("key_1")).await;
        let cancel = CancellationToken::new();

        let handle = poller.spawn_auto_refresh(Duration::from_secs(300), cancel.clone());
        tokio::time::sleep(Duration::from_secs(301 * 3)).await;

        assert_eq!(service.calls(), 0);
        assert!(poller.history().is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_polls_while_valid() {
        let service = ScriptedService::new(vec![Outcome::Answer(premium())]);
        let (poller, _) = poller_with(service.clone(), Some("key_1")).await;
        poller.store().update(premium());
        let cancel = CancellationToken::new();

        let handle = poller.spawn_auto_refresh(Duration::from_secs(300), cancel.clone());

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(service.calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(service.calls(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_stops_once_invalid() {
        let mut expired = premium();
        expired.valid = false;
        let service = ScriptedService::new(vec![Outcome::Answer(expired)]);
        let (poller, _) = poller_with(service.clone(), Some("key_1")).await;
        poller.store().update(premium());
        let cancel = CancellationToken::new();

        let handle = poller.spawn_auto_refresh(Duration::from_secs(300), cancel.clone());
        tokio::time::sleep(Duration::from_secs(301 * 4)).await;

        // The first poll learns the subscription is invalid; no more polls follow.
        assert_eq!(service.calls(), 1);
        assert_eq!(poller.store().phase(), ValidationPhase::Invalid);

        cancel.cancel();
        handle.await.unwrap();
    }
}

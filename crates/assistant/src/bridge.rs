//! Assistant bridge — the only component that talks to the remote model,
//! and only ever with a [`ScrubbedContext`].
//!
//! The bridge owns the failure policy: each attempt is bounded by a
//! timeout, at most `max_attempts` attempts run with a short backoff
//! between them, and exhaustion surfaces as `ProviderUnavailable`. The
//! remote call is the pipeline's only suspension point; dropping the
//! request future cancels an in-flight call.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use medgate_core::assistant::{AskRequest, AssistantProvider};
use medgate_core::context::ScrubbedContext;
use medgate_core::error::{GatewayError, Result};

/// Delays before the second and any further attempts.
const BACKOFF: [Duration; 2] = [Duration::from_millis(500), Duration::from_secs(1)];

pub struct AssistantBridge {
    provider: Arc<dyn AssistantProvider>,
    timeout: Duration,
    max_attempts: u32,
}

impl AssistantBridge {
    /// Bridge with the recommended defaults: 20s per attempt, 2 attempts.
    pub fn new(provider: Arc<dyn AssistantProvider>) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(20),
            max_attempts: 2,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Ask the model a question about a scrubbed context.
    ///
    /// The signature is the trust boundary: there is no way to hand this
    /// method a raw record.
    pub async fn ask(&self, context: &ScrubbedContext, question: &str) -> Result<String> {
        let request = AskRequest::new(context, question);
        let mut last_error =
            GatewayError::ProviderUnavailable("no completion attempt was made".into());

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = BACKOFF[(attempt as usize - 2).min(BACKOFF.len() - 1)];
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
                Ok(Ok(answer)) => return Ok(answer),
                Ok(Err(e)) => {
                    warn!(
                        provider = self.provider.name(),
                        attempt,
                        error = %e,
                        "completion attempt failed"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        provider = self.provider.name(),
                        attempt,
                        timeout_secs = self.timeout.as_secs(),
                        "completion attempt timed out"
                    );
                    last_error = GatewayError::ProviderUnavailable(format!(
                        "provider '{}' timed out after {}s",
                        self.provider.name(),
                        self.timeout.as_secs()
                    ));
                }
            }
        }

        match last_error {
            err @ GatewayError::ProviderUnavailable(_) => Err(err),
            other => Err(GatewayError::ProviderUnavailable(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{Behavior, ScriptedProvider};
    use medgate_core::record::RecordCategory;
    use std::collections::BTreeMap;

    fn context() -> ScrubbedContext {
        let mut sections = BTreeMap::new();
        sections.insert(
            RecordCategory::Medications,
            serde_json::json!([{"drug": "Metformin", "dose": "500mg"}]),
        );
        ScrubbedContext::new("P1", sections)
    }

    #[tokio::test]
    async fn answer_on_first_attempt() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::Answer(
            "Metformin 500mg.".into(),
        )));
        let bridge = AssistantBridge::new(provider.clone());

        let answer = bridge.ask(&context(), "what meds?").await.unwrap();
        assert_eq!(answer, "Metformin 500mg.");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_provider_unavailable_within_bound() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::Hang));
        let bridge = AssistantBridge::new(provider.clone());

        let err = bridge.ask(&context(), "meds?").await.unwrap_err();
        assert!(matches!(err, GatewayError::ProviderUnavailable(_)));
        // Bounded: exactly max_attempts, no endless retry loop.
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_then_success_recovers() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::FailThenAnswer {
            failures: 1,
            answer: "recovered".into(),
        }));
        let bridge = AssistantBridge::new(provider.clone());

        let answer = bridge.ask(&context(), "meds?").await.unwrap();
        assert_eq!(answer, "recovered");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failure_is_provider_unavailable() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::Fail("rate limited".into())));
        let bridge = AssistantBridge::new(provider.clone());

        let err = bridge.ask(&context(), "meds?").await.unwrap_err();
        assert!(matches!(err, GatewayError::ProviderUnavailable(_)));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn single_attempt_configuration() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::Fail("down".into())));
        let bridge = AssistantBridge::new(provider.clone()).with_max_attempts(1);

        let _ = bridge.ask(&context(), "meds?").await.unwrap_err();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn request_carries_scrubbed_text_only() {
        let provider = Arc::new(ScriptedProvider::new(Behavior::Answer("ok".into())));
        let bridge = AssistantBridge::new(provider.clone());

        bridge.ask(&context(), "what meds?").await.unwrap();
        let seen = provider.last_request().unwrap();
        assert!(seen.context_text.contains("Metformin"));
        assert_eq!(seen.question, "what meds?");
    }
}

//! Scripted provider — a deterministic test double for the remote model.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use medgate_core::assistant::{AskRequest, AssistantProvider};
use medgate_core::error::GatewayError;

/// What the scripted provider does on each call.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Always return this answer.
    Answer(String),
    /// Always fail with this message.
    Fail(String),
    /// Never resolve (exercises the bridge timeout).
    Hang,
    /// Fail the first `failures` calls, then answer.
    FailThenAnswer { failures: usize, answer: String },
}

pub struct ScriptedProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<AskRequest>>,
}

impl ScriptedProvider {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of completion attempts received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, for asserting what crossed the boundary.
    pub fn last_request(&self) -> Option<AskRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &AskRequest) -> Result<String, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.behavior {
            Behavior::Answer(answer) => Ok(answer.clone()),
            Behavior::Fail(message) => Err(GatewayError::ProviderUnavailable(message.clone())),
            Behavior::Hang => std::future::pending().await,
            Behavior::FailThenAnswer { failures, answer } => {
                if call < *failures {
                    Err(GatewayError::ProviderUnavailable("scripted failure".into()))
                } else {
                    Ok(answer.clone())
                }
            }
        }
    }
}

//! Shared pipeline state and helpers for every tool.
//!
//! Each tool runs the same sequence: authorize → select/fetch → scrub →
//! return, with an audit entry at the boundary. The pipeline holds the
//! stages; tools hold an `Arc<ToolPipeline>` and add only their own
//! argument shapes.

use std::sync::Arc;

use medgate_assistant::AssistantBridge;
use medgate_context::{ContextSelector, RelevancePolicy};
use medgate_core::assistant::AssistantProvider;
use medgate_core::error::{GatewayError, Result};
use medgate_core::store::RecordStore;
use medgate_security::{
    AuditEvent, AuditLogger, AuditOutcome, AuditSink, CredentialVerifier, Scrubber, TracingSink,
};

pub struct ToolPipeline {
    gate: Box<dyn CredentialVerifier>,
    store: Arc<dyn RecordStore>,
    scrubber: Scrubber,
    selector: ContextSelector,
    bridge: AssistantBridge,
    audit: AuditLogger,
}

impl ToolPipeline {
    /// Pipeline with the default keyword policy and tracing audit sink.
    pub fn new(
        gate: Box<dyn CredentialVerifier>,
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn AssistantProvider>,
    ) -> Self {
        Self {
            gate,
            selector: ContextSelector::new(store.clone()),
            store,
            scrubber: Scrubber::new(),
            bridge: AssistantBridge::new(provider),
            audit: AuditLogger::with_sinks(vec![Box::new(TracingSink)]),
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn RelevancePolicy>) -> Self {
        self.selector = ContextSelector::with_policy(self.store.clone(), policy);
        self
    }

    pub fn with_bridge(mut self, bridge: AssistantBridge) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_audit_sinks(mut self, sinks: Vec<Box<dyn AuditSink>>) -> Self {
        self.audit = AuditLogger::with_sinks(sinks);
        self
    }

    /// Verify the caller's credential before anything else runs.
    ///
    /// A missing credential argument is the same denial as a wrong one.
    /// On denial the audit log records the attempt and the store is never
    /// reached — this returns before any fetch can happen.
    pub fn authorize(&self, tool: &str, arguments: &serde_json::Value) -> Result<()> {
        let credential = arguments["credential"].as_str().unwrap_or("");
        match self.gate.authorize(credential) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.audit.log(
                    AuditEvent::AuthFailure { tool: tool.into() },
                    AuditOutcome::Denied,
                    Some(err.kind().into()),
                );
                Err(GatewayError::Unauthorized)
            }
        }
    }

    /// Record the boundary audit entry for a finished tool invocation.
    /// Only the operation name, patient id, and error kind are logged —
    /// never the payload.
    pub fn record_outcome<T>(&self, tool: &str, patient_id: Option<&str>, result: &Result<T>) {
        let (outcome, detail) = match result {
            Ok(_) => (AuditOutcome::Success, None),
            Err(GatewayError::Unauthorized) => return, // already logged as AuthFailure
            Err(err) => (AuditOutcome::Failure, Some(err.kind().to_string())),
        };
        self.audit.log(
            AuditEvent::ToolInvocation {
                tool: tool.into(),
                patient_id: patient_id.map(Into::into),
            },
            outcome,
            detail,
        );
    }

    /// Record that a scrubbed context left the boundary toward the model.
    pub fn record_assistant_call(&self, patient_id: &str) {
        self.audit.log(
            AuditEvent::AssistantCall {
                patient_id: patient_id.into(),
            },
            AuditOutcome::Success,
            None,
        );
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub fn selector(&self) -> &ContextSelector {
        &self.selector
    }

    pub fn bridge(&self) -> &AssistantBridge {
        &self.bridge
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }
}

/// Extract a required string argument.
pub fn require_str<'a>(arguments: &'a serde_json::Value, name: &str) -> Result<&'a str> {
    arguments[name]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest(format!("missing '{name}' argument")))
}

/// Extract an optional string argument, defaulting when absent or empty.
pub fn optional_str<'a>(
    arguments: &'a serde_json::Value,
    name: &str,
    default: &'a str,
) -> Result<&'a str> {
    match arguments.get(name) {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(value) => value
            .as_str()
            .ok_or_else(|| GatewayError::InvalidRequest(format!("'{name}' must be a string"))),
    }
}

/// Extract an optional positive integer argument with a default.
pub fn optional_limit(arguments: &serde_json::Value, name: &str, default: usize) -> Result<usize> {
    match arguments.get(name) {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .ok_or_else(|| {
                GatewayError::InvalidRequest(format!("'{name}' must be a positive integer"))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_rejects_missing_and_empty() {
        assert!(require_str(&json!({}), "patient_id").is_err());
        assert!(require_str(&json!({"patient_id": ""}), "patient_id").is_err());
        assert!(require_str(&json!({"patient_id": 7}), "patient_id").is_err());
        assert_eq!(
            require_str(&json!({"patient_id": "P001"}), "patient_id").unwrap(),
            "P001"
        );
    }

    #[test]
    fn optional_str_defaults_and_validates() {
        assert_eq!(optional_str(&json!({}), "question", "").unwrap(), "");
        assert_eq!(
            optional_str(&json!({"question": null}), "question", "").unwrap(),
            ""
        );
        assert_eq!(
            optional_str(&json!({"question": "meds?"}), "question", "").unwrap(),
            "meds?"
        );
        assert!(optional_str(&json!({"question": 7}), "question", "").is_err());
    }

    #[test]
    fn optional_limit_defaults_and_validates() {
        assert_eq!(optional_limit(&json!({}), "limit", 3).unwrap(), 3);
        assert_eq!(optional_limit(&json!({"limit": 5}), "limit", 3).unwrap(), 5);
        assert!(optional_limit(&json!({"limit": 0}), "limit", 3).is_err());
        assert!(optional_limit(&json!({"limit": -2}), "limit", 3).is_err());
        assert!(optional_limit(&json!({"limit": "five"}), "limit", 3).is_err());
    }
}

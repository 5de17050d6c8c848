//! Security module for Medgate — access gating, PII scrubbing, and audit
//! logging.
//!
//! Provides:
//! - **Gate**: shared-secret credential verification in front of every tool
//! - **Scrub**: declarative field-level PII redaction (fail closed)
//! - **Audit**: boundary event logging, never record content

pub mod audit;
pub mod gate;
pub mod scrub;

pub use audit::{
    AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, MAX_RETAINED_ENTRIES,
    TracingSink,
};
pub use gate::{CredentialVerifier, DenyAllGate, SharedSecretGate};
pub use scrub::{FieldClass, Scrubber};

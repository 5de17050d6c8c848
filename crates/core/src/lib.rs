//! # Medgate Core
//!
//! Domain types, traits, and error definitions for the Medgate EHR gateway.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam of the pipeline is a trait here: the record store, the
//! assistant provider, and the tool surface. Implementations live in their
//! respective crates, which keeps the dependency graph pointing inward and
//! lets tests swap any stage for a double.

pub mod assistant;
pub mod context;
pub mod error;
pub mod record;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use assistant::{AskRequest, AssistantProvider};
pub use context::ScrubbedContext;
pub use error::{GatewayError, Result};
pub use record::{
    HistoryEntry, MedicationEntry, Patient, RecordCategory, VitalKind, VitalsEntry,
};
pub use store::{CategoryRecords, RecordStore};
pub use tool::{Tool, ToolDefinition, ToolRegistry};

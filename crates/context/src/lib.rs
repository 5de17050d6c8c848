//! Minimal-context selection for Medgate.
//!
//! A [`RelevancePolicy`] decides which record categories a question needs;
//! the [`ContextSelector`] fetches exactly those, scrubs each, and returns
//! the union as a `ScrubbedContext`.

pub mod policy;
pub mod selector;

pub use policy::{FixedPolicy, KeywordPolicy, RelevancePolicy};
pub use selector::ContextSelector;

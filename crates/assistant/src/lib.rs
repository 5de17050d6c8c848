//! Assistant bridge for Medgate.
//!
//! [`AssistantBridge`] forwards a scrubbed, minimal context plus the user's
//! question to the remote model with bounded retry and timeout.
//! Implementations of the provider trait: [`OpenAiProvider`] (HTTP) and
//! [`ScriptedProvider`] (tests).

pub mod bridge;
pub mod openai;
pub mod scripted;

pub use bridge::AssistantBridge;
pub use medgate_core::assistant::{AskRequest, AssistantProvider};
pub use openai::OpenAiProvider;
pub use scripted::{Behavior, ScriptedProvider};

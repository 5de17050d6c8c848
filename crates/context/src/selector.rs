//! Context selector — assembles the smallest sufficient scrubbed bundle.
//!
//! For each category the policy nominates, the selector fetches from the
//! record store and scrubs the result; the union of scrubbed sections is
//! the ScrubbedContext. Categories the policy does not nominate are never
//! fetched — minimal context is enforced here, not by asking the model to
//! ignore extra data.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use medgate_core::context::ScrubbedContext;
use medgate_core::error::Result;
use medgate_core::record::RecordCategory;
use medgate_core::store::RecordStore;
use medgate_security::Scrubber;

use crate::policy::{KeywordPolicy, RelevancePolicy};

/// Fallback bundle when the question matches no category: enough to answer
/// a generic "anything notable?" without shipping the whole record.
const DEFAULT_BUNDLE: [RecordCategory; 2] =
    [RecordCategory::Demographics, RecordCategory::Medications];

pub struct ContextSelector {
    store: Arc<dyn RecordStore>,
    scrubber: Scrubber,
    policy: Box<dyn RelevancePolicy>,
}

impl ContextSelector {
    /// Selector with the default keyword policy.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_policy(store, Box::new(KeywordPolicy))
    }

    pub fn with_policy(store: Arc<dyn RecordStore>, policy: Box<dyn RelevancePolicy>) -> Self {
        Self {
            store,
            scrubber: Scrubber::new(),
            policy,
        }
    }

    /// Build the minimal scrubbed context for a question about a patient.
    ///
    /// `NotFound` propagates from the first fetch; an unscrubable record is
    /// fatal to the whole request (`ScrubFailure`), never partially
    /// returned.
    pub async fn select(&self, patient_id: &str, question: &str) -> Result<ScrubbedContext> {
        let mut categories = self.policy.relevant(question);
        if categories.is_empty() {
            categories = DEFAULT_BUNDLE.into_iter().collect();
        }

        debug!(
            patient_id,
            policy = self.policy.name(),
            ?categories,
            "selecting context"
        );

        let mut sections = BTreeMap::new();
        for category in categories {
            let records = self.store.fetch(patient_id, category).await?;
            let section = self.scrubber.scrub(&records)?;
            sections.insert(category, section);
        }

        Ok(ScrubbedContext::new(patient_id, sections))
    }
}

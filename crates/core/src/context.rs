//! ScrubbedContext — the only value allowed to cross into the assistant.
//!
//! A request-local bundle of per-category redacted sections. It is produced
//! by the context selector (which composes fetch + scrub), never persisted,
//! and discarded when the request finishes. The assistant bridge accepts
//! this type and nothing else, so raw records cannot reach the model by
//! construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::RecordCategory;

/// Upper bound on the serialized context passed to the model, in bytes.
pub const MAX_CONTEXT_BYTES: usize = 16 * 1024;

/// A redacted, minimal patient context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubbedContext {
    patient_id: String,
    sections: BTreeMap<RecordCategory, serde_json::Value>,
}

impl ScrubbedContext {
    /// Assemble a context from already-scrubbed category sections.
    pub fn new(
        patient_id: impl Into<String>,
        sections: BTreeMap<RecordCategory, serde_json::Value>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            sections,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Categories present in this bundle, in stable order.
    pub fn categories(&self) -> Vec<RecordCategory> {
        self.sections.keys().copied().collect()
    }

    pub fn section(&self, category: RecordCategory) -> Option<&serde_json::Value> {
        self.sections.get(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize the bundle as bounded text for the model prompt.
    ///
    /// Sections are keyed by category name; output is truncated at a UTF-8
    /// boundary if it exceeds [`MAX_CONTEXT_BYTES`].
    pub fn render_text(&self) -> String {
        let map: BTreeMap<&str, &serde_json::Value> = self
            .sections
            .iter()
            .map(|(cat, v)| (cat.as_str(), v))
            .collect();
        let mut text = serde_json::to_string(&map).unwrap_or_else(|_| "{}".into());
        if text.len() > MAX_CONTEXT_BYTES {
            let mut cut = MAX_CONTEXT_BYTES;
            while cut > 0 && !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_includes_section_names() {
        let mut sections = BTreeMap::new();
        sections.insert(RecordCategory::Demographics, json!({"age_band": "30-39"}));
        sections.insert(
            RecordCategory::Medications,
            json!([{"drug": "Metformin", "dose": "500 mg bd"}]),
        );
        let ctx = ScrubbedContext::new("P001", sections);

        let text = ctx.render_text();
        assert!(text.contains("demographics"));
        assert!(text.contains("Metformin"));
    }

    #[test]
    fn render_is_bounded() {
        let mut sections = BTreeMap::new();
        sections.insert(RecordCategory::History, json!("x".repeat(MAX_CONTEXT_BYTES * 2)));
        let ctx = ScrubbedContext::new("P001", sections);
        assert!(ctx.render_text().len() <= MAX_CONTEXT_BYTES);
    }

    #[test]
    fn categories_in_stable_order() {
        let mut sections = BTreeMap::new();
        sections.insert(RecordCategory::History, json!([]));
        sections.insert(RecordCategory::Demographics, json!({}));
        let ctx = ScrubbedContext::new("P001", sections);
        assert_eq!(
            ctx.categories(),
            vec![RecordCategory::Demographics, RecordCategory::History]
        );
    }
}

//! Relevance policies — which record categories a question needs.
//!
//! The policy is a named, swappable strategy so its behavior is testable
//! independently of the fetch/scrub pipeline. A policy only *nominates*
//! categories; the selector applies the default bundle when the nomination
//! comes back empty.

use std::collections::BTreeSet;

use medgate_core::record::RecordCategory;

/// Decides which categories are relevant to a question.
pub trait RelevancePolicy: Send + Sync {
    /// Policy name, for logs and audit context.
    fn name(&self) -> &str;

    /// Categories judged relevant. May be empty — the selector substitutes
    /// the default bundle.
    fn relevant(&self, question: &str) -> BTreeSet<RecordCategory>;
}

/// Keyword matching per category.
///
/// Eager on purpose: a partial stem like "prescri" catches "prescription"
/// and "prescribed". Missing a relevant category degrades the answer;
/// matching one extra category costs a few scrubbed rows.
pub struct KeywordPolicy;

const DEMOGRAPHICS_KEYWORDS: &[&str] = &["age", "sex", "demograph", "old", "gender"];
const VITALS_KEYWORDS: &[&str] = &[
    "vital",
    "bp",
    "blood pressure",
    "heart",
    "pulse",
    "temp",
    "fever",
    "weight",
    "glucose",
    "sugar",
];
const MEDICATIONS_KEYWORDS: &[&str] = &["med", "drug", "prescri", "dose", "pill", "taking"];
const HISTORY_KEYWORDS: &[&str] = &[
    "history", "surgery", "surgical", "smok", "allerg", "social", "past", "note",
];

impl RelevancePolicy for KeywordPolicy {
    fn name(&self) -> &str {
        "keyword"
    }

    fn relevant(&self, question: &str) -> BTreeSet<RecordCategory> {
        let q = question.to_lowercase();
        let mut categories = BTreeSet::new();

        let matches = |keywords: &[&str]| keywords.iter().any(|k| q.contains(k));

        if matches(DEMOGRAPHICS_KEYWORDS) {
            categories.insert(RecordCategory::Demographics);
        }
        if matches(VITALS_KEYWORDS) {
            categories.insert(RecordCategory::Vitals);
        }
        if matches(MEDICATIONS_KEYWORDS) {
            categories.insert(RecordCategory::Medications);
        }
        if matches(HISTORY_KEYWORDS) {
            categories.insert(RecordCategory::History);
        }

        categories
    }
}

/// Always the same configured category set, regardless of the question.
pub struct FixedPolicy {
    categories: BTreeSet<RecordCategory>,
}

impl FixedPolicy {
    pub fn new(categories: impl IntoIterator<Item = RecordCategory>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
        }
    }
}

impl RelevancePolicy for FixedPolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn relevant(&self, _question: &str) -> BTreeSet<RecordCategory> {
        self.categories.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medication_question_selects_medications_only() {
        let policy = KeywordPolicy;
        let categories = policy.relevant("What medication is the patient on?");
        assert_eq!(
            categories,
            BTreeSet::from([RecordCategory::Medications])
        );
    }

    #[test]
    fn vitals_keywords_match() {
        let policy = KeywordPolicy;
        for q in [
            "any red flags in the blood pressure?",
            "is the temp normal?",
            "how is their heart rate trending",
        ] {
            assert!(
                policy.relevant(q).contains(&RecordCategory::Vitals),
                "expected vitals for: {q}"
            );
        }
    }

    #[test]
    fn unrelated_question_selects_nothing() {
        let policy = KeywordPolicy;
        assert!(policy.relevant("hello there").is_empty());
        assert!(policy.relevant("").is_empty());
    }

    #[test]
    fn multi_topic_question_selects_multiple() {
        let policy = KeywordPolicy;
        let categories =
            policy.relevant("Given the surgical history, are any drugs contraindicated?");
        assert!(categories.contains(&RecordCategory::History));
        assert!(categories.contains(&RecordCategory::Medications));
    }

    #[test]
    fn fixed_policy_ignores_question() {
        let policy = FixedPolicy::new([RecordCategory::Vitals]);
        assert_eq!(
            policy.relevant("anything at all"),
            BTreeSet::from([RecordCategory::Vitals])
        );
        assert_eq!(
            policy.relevant(""),
            BTreeSet::from([RecordCategory::Vitals])
        );
    }
}

pub mod contact_analyzer;
pub mod keyword_scan;
pub mod obfuscation;
pub mod text_analyzer;
pub mod upi_analyzer;
pub mod url_analyzer;
pub mod wifi_analyzer;

use crate::threat_db::ThreatDatabase;
use serde::{Deserialize, Serialize};

pub use url_analyzer::{DomainReputation, UrlSignals};

/// Outcome of one named check: its contribution and the threats it found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckScore {
    pub check_name: String,
    pub score: u32,
    pub threats: Vec<String>,
}

impl CheckScore {
    pub fn new(check_name: &str) -> Self {
        Self {
            check_name: check_name.to_string(),
            score: 0,
            threats: Vec::new(),
        }
    }

    pub fn add(&mut self, points: u32, threat: impl Into<String>) {
        self.score = self.score.saturating_add(points);
        self.threats.push(threat.into());
    }

    pub fn fired(&self) -> bool {
        self.score > 0 || !self.threats.is_empty()
    }
}

/// A check that runs on every payload regardless of its type.
pub trait PayloadCheck: Send + Sync {
    fn evaluate(&self, text: &str, db: &ThreatDatabase) -> CheckScore;
    fn name(&self) -> &str;
}

/// Type-agnostic checks, in evaluation order.
pub static PAYLOAD_CHECKS: &[&dyn PayloadCheck] = &[
    &keyword_scan::SuspiciousKeywordCheck,
    &obfuscation::ObfuscationCheck,
];

/// Case-insensitive containment over an already-lowercased haystack.
pub(crate) fn matching_terms<'a>(haystack_lower: &str, terms: &'a [String]) -> Vec<&'a str> {
    terms
        .iter()
        .filter(|term| haystack_lower.contains(term.as_str()))
        .map(String::as_str)
        .collect()
}

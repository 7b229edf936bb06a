use super::{matching_terms, CheckScore, PayloadCheck};
use crate::threat_db::ThreatDatabase;

pub const SUSPICIOUS_KEYWORDS_THREAT: &str = "Contains suspicious keywords";

/// Flags payloads that name attack vocabulary ("phishing", "malware", ...).
/// One hit or ten, the contribution is the same.
pub struct SuspiciousKeywordCheck;

impl PayloadCheck for SuspiciousKeywordCheck {
    fn evaluate(&self, text: &str, db: &ThreatDatabase) -> CheckScore {
        let mut check = CheckScore::new(self.name());
        let lower = text.to_lowercase();
        let hits = matching_terms(&lower, db.suspicious_keywords());

        if !hits.is_empty() {
            log::debug!("Suspicious keywords present: {:?}", hits);
            check.add(db.weights().suspicious_keywords, SUSPICIOUS_KEYWORDS_THREAT);
        }

        check
    }

    fn name(&self) -> &str {
        "suspicious_keywords"
    }
}

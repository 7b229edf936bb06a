use super::{matching_terms, CheckScore};
use crate::threat_db::ThreatDatabase;

/// Scam/clickbait keyword scan for plain text, e-mail and phone payloads.
///
/// Every distinct keyword present adds the full increment and nothing caps
/// the total, so a payload stuffed with bait phrases can outscore a single
/// structural finding. Aggregation still clamps the final score to 100.
pub fn analyze(text: &str, db: &ThreatDatabase) -> CheckScore {
    let mut check = CheckScore::new("text_analysis");
    let lower = text.to_lowercase();

    for keyword in matching_terms(&lower, db.scam_keywords()) {
        check.add(
            db.weights().scam_keyword,
            format!("Scam keyword detected: '{}'", keyword),
        );
    }

    check
}

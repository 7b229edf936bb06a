use super::{matching_terms, CheckScore};
use crate::extraction::UpiInfo;
use crate::threat_db::ThreatDatabase;
use once_cell::sync::Lazy;
use regex::Regex;

static VPA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z][A-Za-z0-9.-]*$").expect("vpa regex")
});

pub fn is_valid_vpa(vpa: &str) -> bool {
    VPA_REGEX.is_match(vpa)
}

/// Score a UPI payment request.
pub fn analyze(info: &UpiInfo, db: &ThreatDatabase) -> CheckScore {
    let weights = db.weights();
    let mut check = CheckScore::new("upi_analysis");

    let vpa = info.payee_vpa.as_deref().unwrap_or("");
    if !is_valid_vpa(vpa) {
        check.add(weights.invalid_vpa, "Invalid UPI ID format");
    }

    if let Some(amount) = info.payment_amount {
        if amount > weights.very_high_amount_threshold {
            check.add(
                weights.very_high_amount,
                format!("Very high payment amount: {:.2}", amount),
            );
        } else if amount > weights.high_amount_threshold {
            check.add(
                weights.high_amount,
                format!("High payment amount: {:.2}", amount),
            );
        }
    }

    let vpa_lower = vpa.to_lowercase();
    let vpa_hits = matching_terms(&vpa_lower, db.suspicious_vpa_terms());
    if !vpa_hits.is_empty() {
        check.add(
            weights.suspicious_vpa,
            format!("Suspicious UPI ID: contains '{}'", vpa_hits.join("', '")),
        );
    }

    if let Some(note) = &info.note {
        let note_lower = note.to_lowercase();
        if !matching_terms(&note_lower, db.urgency_terms()).is_empty() {
            check.add(weights.urgent_note, "Urgency language in payment note");
        }
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upi(vpa: Option<&str>, amount: Option<f64>, note: Option<&str>) -> UpiInfo {
        UpiInfo {
            payee_vpa: vpa.map(str::to_string),
            merchant_info: "Store".to_string(),
            payment_amount: amount,
            currency: None,
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_vpa_format() {
        assert!(is_valid_vpa("merchant@bank"));
        assert!(is_valid_vpa("jane.doe-1_x@okaxis"));
        assert!(!is_valid_vpa("not-an-email"));
        assert!(!is_valid_vpa("a@b@c"));
        assert!(!is_valid_vpa("@bank"));
        assert!(!is_valid_vpa("merchant@"));
        assert!(!is_valid_vpa(""));
    }

    #[test]
    fn test_valid_request_scores_zero() {
        let db = ThreatDatabase::builtin();
        let check = analyze(&upi(Some("merchant@bank"), Some(1000.0), None), &db);
        assert_eq!(check.score, 0);
        assert!(check.threats.is_empty());
    }

    #[test]
    fn test_missing_vpa_is_invalid() {
        let db = ThreatDatabase::builtin();
        let check = analyze(&upi(None, None, None), &db);
        assert_eq!(check.score, db.weights().invalid_vpa);
    }

    #[test]
    fn test_amount_tiers() {
        let db = ThreatDatabase::builtin();
        let w = db.weights();

        let at = |amount| analyze(&upi(Some("m@bank"), Some(amount), None), &db).score;
        assert_eq!(at(50_000.0), 0);
        assert_eq!(at(50_001.0), w.high_amount);
        assert_eq!(at(100_000.0), w.high_amount);
        assert_eq!(at(100_001.0), w.very_high_amount);
    }

    #[test]
    fn test_vpa_terms_and_urgent_note() {
        let db = ThreatDatabase::builtin();
        let w = db.weights();

        let check = analyze(
            &upi(Some("TestPay@bank"), None, Some("URGENT: pay immediately")),
            &db,
        );
        assert_eq!(check.score, w.suspicious_vpa + w.urgent_note);
        assert!(check.threats[0].contains("test"));
    }
}

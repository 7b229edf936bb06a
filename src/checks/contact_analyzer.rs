use super::CheckScore;
use crate::extraction::ContactInfo;
use crate::threat_db::ThreatDatabase;

fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
}

/// Score a vCard. Each malformed field counts once.
pub fn analyze(info: &ContactInfo, db: &ThreatDatabase) -> CheckScore {
    let weights = db.weights();
    let mut check = CheckScore::new("contact_analysis");

    if let Some(email) = &info.email {
        if !email.contains('@') {
            check.add(
                weights.malformed_contact_field,
                format!("Malformed contact email: {}", email),
            );
        }
    }

    if let Some(phone) = &info.phone {
        if !is_valid_phone(phone) {
            check.add(
                weights.malformed_contact_field,
                format!("Malformed contact phone: {}", phone),
            );
        }
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("555.123.4567"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("+1 555 CALL NOW"));
        assert!(!is_valid_phone("---"));
    }

    #[test]
    fn test_well_formed_contact() {
        let info = ContactInfo {
            name: Some("Jane".to_string()),
            phone: Some("+1 555 123 4567".to_string()),
            email: Some("jane@example.com".to_string()),
            organization: None,
        };
        assert!(!analyze(&info, &ThreatDatabase::builtin()).fired());
    }

    #[test]
    fn test_each_malformed_field_counts() {
        let db = ThreatDatabase::builtin();
        let info = ContactInfo {
            name: None,
            phone: Some("0800-FREE-CASH".to_string()),
            email: Some("jane.example.com".to_string()),
            organization: None,
        };
        let check = analyze(&info, &db);
        assert_eq!(check.score, 2 * db.weights().malformed_contact_field);
        assert_eq!(check.threats.len(), 2);
    }

    #[test]
    fn test_absent_fields_are_not_malformed() {
        assert!(!analyze(&ContactInfo::default(), &ThreatDatabase::builtin()).fired());
    }
}

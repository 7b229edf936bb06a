use super::{CheckScore, PayloadCheck};
use crate::threat_db::ThreatDatabase;
use once_cell::sync::Lazy;
use regex::Regex;

pub const OBFUSCATION_THREAT: &str = "Content appears obfuscated";

const BASE64_MIN_LENGTH: usize = 20;
const SPECIAL_CHAR_RATIO: f64 = 0.3;

static BASE64_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("base64 regex"));

/// Flags base64-looking blobs and punctuation-heavy text.
pub struct ObfuscationCheck;

impl ObfuscationCheck {
    pub fn looks_like_base64(text: &str) -> bool {
        text.chars().count() > BASE64_MIN_LENGTH && BASE64_REGEX.is_match(text)
    }

    /// Share of characters that are neither alphanumeric nor whitespace.
    pub fn special_char_ratio(text: &str) -> f64 {
        let mut total = 0usize;
        let mut special = 0usize;
        for ch in text.chars() {
            total += 1;
            if !ch.is_alphanumeric() && !ch.is_whitespace() {
                special += 1;
            }
        }
        if total == 0 {
            0.0
        } else {
            special as f64 / total as f64
        }
    }

    pub fn is_obfuscated(text: &str) -> bool {
        Self::looks_like_base64(text) || Self::special_char_ratio(text) > SPECIAL_CHAR_RATIO
    }
}

impl PayloadCheck for ObfuscationCheck {
    fn evaluate(&self, text: &str, db: &ThreatDatabase) -> CheckScore {
        let mut check = CheckScore::new(self.name());
        if Self::is_obfuscated(text) {
            log::debug!(
                "Obfuscated payload: special char ratio {:.2}",
                Self::special_char_ratio(text)
            );
            check.add(db.weights().obfuscation, OBFUSCATION_THREAT);
        }
        check
    }

    fn name(&self) -> &str {
        "obfuscation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_blob() {
        assert!(ObfuscationCheck::looks_like_base64(
            "aHR0cHM6Ly9ldmlsLmV4YW1wbGUvbG9naW4="
        ));
        // too short to count
        assert!(!ObfuscationCheck::looks_like_base64("aGVsbG8="));
        assert!(!ObfuscationCheck::looks_like_base64("not base64 at all, has spaces"));
    }

    #[test]
    fn test_special_char_ratio() {
        assert_eq!(ObfuscationCheck::special_char_ratio(""), 0.0);
        assert_eq!(ObfuscationCheck::special_char_ratio("%%%%"), 1.0);
        assert!(ObfuscationCheck::is_obfuscated("%2F%2F%3A%3A!!"));
        assert!(!ObfuscationCheck::is_obfuscated("Meet at 5 pm, room 12."));
        // non-Latin letters are alphanumeric
        assert!(!ObfuscationCheck::is_obfuscated("Привет, мир"));
    }

    #[test]
    fn test_contribution() {
        let db = ThreatDatabase::builtin();
        let check = ObfuscationCheck.evaluate("!@#$%^&*()", &db);
        assert_eq!(check.score, db.weights().obfuscation);
        assert_eq!(check.threats, vec![OBFUSCATION_THREAT]);

        assert!(!ObfuscationCheck.evaluate("", &db).fired());
    }
}

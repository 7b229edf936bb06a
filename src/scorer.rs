use crate::checks::{
    contact_analyzer, text_analyzer, upi_analyzer, url_analyzer, wifi_analyzer, CheckScore,
    UrlSignals, PAYLOAD_CHECKS,
};
use crate::classifier::DataType;
use crate::extraction::ExtractedInfo;
use crate::threat_db::ThreatDatabase;
use serde::{Deserialize, Serialize};

/// Everything the scorer found, before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    pub data_type: DataType,
    pub extracted_info: ExtractedInfo,
    pub checks: Vec<CheckScore>,
    pub url_signals: Option<UrlSignals>,
}

impl SecurityCheckResult {
    pub fn total_score(&self) -> u32 {
        self.checks
            .iter()
            .fold(0u32, |total, check| total.saturating_add(check.score))
    }
}

/// Run the type-specific check for `info` plus every type-agnostic check.
///
/// The `ExtractedInfo` variant picks the check and the reported data type.
/// `data_type` is only compared against it; a mismatch is logged and the
/// fields win.
pub fn score(
    text: &str,
    data_type: DataType,
    info: &ExtractedInfo,
    db: &ThreatDatabase,
) -> SecurityCheckResult {
    if info.data_type() != data_type {
        log::warn!(
            "Extracted fields are {} but payload was classified as {}; scoring the fields",
            info.data_type(),
            data_type
        );
    }

    let mut checks = Vec::with_capacity(PAYLOAD_CHECKS.len() + 1);
    let mut url_signals = None;

    match info {
        ExtractedInfo::Url(url) => {
            let (check, signals) = url_analyzer::analyze(text, url, db);
            checks.push(check);
            url_signals = Some(signals);
        }
        ExtractedInfo::Upi(upi) => checks.push(upi_analyzer::analyze(upi, db)),
        ExtractedInfo::Wifi(wifi) => checks.push(wifi_analyzer::analyze(wifi, db)),
        ExtractedInfo::Contact(contact) => checks.push(contact_analyzer::analyze(contact, db)),
        ExtractedInfo::Email(_) | ExtractedInfo::Phone(_) | ExtractedInfo::Text => {
            checks.push(text_analyzer::analyze(text, db))
        }
    }

    for check in PAYLOAD_CHECKS {
        checks.push(check.evaluate(text, db));
    }

    for check in checks.iter().filter(|c| c.fired()) {
        log::debug!(
            "{}: +{} ({})",
            check.check_name,
            check.score,
            check.threats.join("; ")
        );
    }

    SecurityCheckResult {
        data_type: info.data_type(),
        extracted_info: info.clone(),
        checks,
        url_signals,
    }
}

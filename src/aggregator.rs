use crate::checks::{CheckScore, DomainReputation};
use crate::classifier::DataType;
use crate::extraction::ExtractedInfo;
use crate::scorer::SecurityCheckResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const MAX_RISK_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => RiskLevel::Safe,
            20..=39 => RiskLevel::Low,
            40..=59 => RiskLevel::Medium,
            60..=79 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "safe" => Some(RiskLevel::Safe),
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrSecurityAnalysis {
    pub data_type: DataType,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub is_phishing: bool,
    pub is_malicious: bool,
    pub has_redirect: bool,
    pub domain_reputation: Option<DomainReputation>,
    pub threats: Vec<String>,
    pub extracted_info: ExtractedInfo,
    pub checks: Vec<CheckScore>,
}

impl QrSecurityAnalysis {
    pub fn is_at_least(&self, level: RiskLevel) -> bool {
        self.risk_level >= level
    }
}

/// Fold scorer output into a clamped score, a level and the verdict flags.
pub fn aggregate(result: SecurityCheckResult) -> QrSecurityAnalysis {
    let risk_score = result.total_score().min(MAX_RISK_SCORE as u32) as u8;
    let risk_level = RiskLevel::from_score(risk_score);

    let threats = dedup_threats(&result.checks);

    let (domain_reputation, is_phishing, is_malicious, has_redirect) = match &result.url_signals {
        Some(signals) => (
            Some(signals.reputation),
            matches!(
                signals.reputation,
                DomainReputation::Malicious | DomainReputation::Suspicious
            ) || !signals.matched_patterns.is_empty(),
            signals.reputation == DomainReputation::Malicious,
            signals.is_shortened,
        ),
        None => (None, false, false, false),
    };

    QrSecurityAnalysis {
        data_type: result.data_type,
        risk_score,
        risk_level,
        is_phishing,
        is_malicious,
        has_redirect,
        domain_reputation,
        threats,
        extracted_info: result.extracted_info,
        checks: result.checks,
    }
}

/// First occurrence wins.
fn dedup_threats(checks: &[CheckScore]) -> Vec<String> {
    let mut seen = HashSet::new();
    checks
        .iter()
        .flat_map(|check| check.threats.iter())
        .filter(|threat| seen.insert(threat.as_str()))
        .cloned()
        .collect()
}

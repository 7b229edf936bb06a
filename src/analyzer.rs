use crate::aggregator::{aggregate, QrSecurityAnalysis, RiskLevel};
use crate::classifier::classify;
use crate::extraction::extract;
use crate::payload::QrPayload;
use crate::scorer::score;
use crate::threat_db::{SharedThreatDatabase, ThreatDatabase};
use serde::Serialize;
use std::collections::BTreeMap;

/// Classify, extract, score and aggregate one payload against `db`.
pub fn analyze_with(text: &str, db: &ThreatDatabase) -> QrSecurityAnalysis {
    let data_type = classify(text);
    let info = extract(text, data_type);
    let analysis = aggregate(score(text, data_type, &info, db));

    log::debug!(
        "Analyzed {} payload: score {} ({})",
        analysis.data_type,
        analysis.risk_score,
        analysis.risk_level
    );

    analysis
}

/// Entry point for callers holding a (possibly hot-swapped) threat database.
#[derive(Debug, Clone, Default)]
pub struct QrAnalyzer {
    threat_db: SharedThreatDatabase,
}

impl QrAnalyzer {
    pub fn new(db: ThreatDatabase) -> Self {
        Self {
            threat_db: SharedThreatDatabase::new(db),
        }
    }

    pub fn with_shared(threat_db: SharedThreatDatabase) -> Self {
        Self { threat_db }
    }

    pub fn threat_database(&self) -> &SharedThreatDatabase {
        &self.threat_db
    }

    pub fn analyze(&self, text: &str) -> QrSecurityAnalysis {
        analyze_with(text, &self.threat_db.snapshot())
    }

    pub fn analyze_payload(&self, payload: &QrPayload) -> QrSecurityAnalysis {
        self.analyze(&payload.text)
    }

    /// Analyze several payloads against one database snapshot.
    pub fn analyze_batch<I, S>(&self, payloads: I) -> Vec<QrSecurityAnalysis>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let db = self.threat_db.snapshot();
        payloads
            .into_iter()
            .map(|text| analyze_with(text.as_ref(), &db))
            .collect()
    }
}

/// Counts per risk level over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub phishing: usize,
    pub by_level: BTreeMap<RiskLevel, usize>,
}

impl BatchSummary {
    pub fn from_analyses(analyses: &[QrSecurityAnalysis]) -> Self {
        let mut summary = Self::default();
        for analysis in analyses {
            summary.record(analysis);
        }
        summary
    }

    pub fn record(&mut self, analysis: &QrSecurityAnalysis) {
        self.total += 1;
        if analysis.is_phishing {
            self.phishing += 1;
        }
        *self.by_level.entry(analysis.risk_level).or_insert(0) += 1;
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }

    pub fn at_least(&self, level: RiskLevel) -> usize {
        self.by_level
            .range(level..)
            .map(|(_, count)| count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DataType;

    #[test]
    fn test_analyze_payload_uses_text_only() {
        let analyzer = QrAnalyzer::default();
        let a = analyzer.analyze_payload(&QrPayload::new("tel:+15551234567").with_captured_at(1));
        let b = analyzer.analyze_payload(&QrPayload::new("tel:+15551234567").with_captured_at(2));
        assert_eq!(a, b);
        assert_eq!(a.data_type, DataType::Phone);
    }

    #[test]
    fn test_hot_swap_applies_to_next_analysis() {
        let analyzer = QrAnalyzer::new(ThreatDatabase::empty());
        let before = analyzer.analyze("https://swap.example/");
        assert!(!before.is_malicious);

        analyzer
            .threat_database()
            .replace(ThreatDatabase::empty().with_malicious_domain("swap.example"));
        let after = analyzer.analyze("https://swap.example/");
        assert!(after.is_malicious);
        assert!(after.risk_score > before.risk_score);
    }

    #[test]
    fn test_batch_summary() {
        let analyzer = QrAnalyzer::default();
        let analyses = analyzer.analyze_batch(vec![
            "https://secure-bank.com/login",
            "upi://pay?pa=not-an-email&pn=Test&am=999999",
            "https://bit.ly/fake-bank-login",
        ]);
        let summary = BatchSummary::from_analyses(&analyses);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(RiskLevel::Safe), 1);
        assert_eq!(summary.at_least(RiskLevel::High), 2);
        assert_eq!(summary.phishing, 1);
    }

    #[test]
    fn test_concurrent_analysis() {
        let analyzer = QrAnalyzer::default();
        let expected = analyzer.analyze("https://bit.ly/fake-bank-login");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let analyzer = analyzer.clone();
                std::thread::spawn(move || analyzer.analyze("https://bit.ly/fake-bank-login"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}

pub mod aggregator;
pub mod analyzer;
pub mod checks;
pub mod classifier;
pub mod domain_utils;
pub mod extraction;
pub mod payload;
pub mod scorer;
pub mod threat_db;

pub use aggregator::{aggregate, QrSecurityAnalysis, RiskLevel};
pub use analyzer::{analyze_with, BatchSummary, QrAnalyzer};
pub use checks::{CheckScore, DomainReputation, UrlSignals};
pub use classifier::{classify, DataType};
pub use extraction::{extract, ExtractedInfo};
pub use payload::{BoundingBox, Point, QrPayload};
pub use scorer::{score, SecurityCheckResult};
pub use threat_db::{ScoringWeights, SharedThreatDatabase, ThreatDatabase, ThreatDatabaseConfig};

use crate::domain_utils::DomainUtils;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Points added by each check. Unsigned, so no check can lower a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub malicious_domain: u32,
    pub phishing_pattern: u32,
    pub punycode_domain: u32,
    pub path_traversal: u32,
    pub long_url: u32,
    pub long_url_length: usize,
    pub insecure_protocol: u32,
    pub url_shortener: u32,
    pub unparseable_url: u32,
    pub invalid_vpa: u32,
    pub high_amount: u32,
    pub high_amount_threshold: f64,
    pub very_high_amount: u32,
    pub very_high_amount_threshold: f64,
    pub suspicious_vpa: u32,
    pub urgent_note: u32,
    pub open_network_name: u32,
    pub weak_security: u32,
    pub hidden_network: u32,
    pub malformed_contact_field: u32,
    pub scam_keyword: u32,
    pub suspicious_keywords: u32,
    pub obfuscation: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            malicious_domain: 50,
            phishing_pattern: 20,
            punycode_domain: 30,
            path_traversal: 15,
            long_url: 10,
            long_url_length: 200,
            insecure_protocol: 10,
            url_shortener: 25,
            unparseable_url: 20,
            invalid_vpa: 40,
            high_amount: 20,
            high_amount_threshold: 50_000.0,
            very_high_amount: 30,
            very_high_amount_threshold: 100_000.0,
            suspicious_vpa: 20,
            urgent_note: 15,
            open_network_name: 25,
            weak_security: 30,
            hidden_network: 10,
            malformed_contact_field: 15,
            scam_keyword: 15,
            suspicious_keywords: 25,
            obfuscation: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhishingPatternConfig {
    pub name: String,
    pub pattern: String,
}

impl PhishingPatternConfig {
    fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// On-disk form of the threat database. Every section is optional and falls
/// back to the built-in list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatDatabaseConfig {
    pub malicious_domains: Vec<String>,
    pub trusted_domains: Vec<String>,
    pub shortener_domains: Vec<String>,
    pub phishing_patterns: Vec<PhishingPatternConfig>,
    pub scam_keywords: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub suspicious_vpa_terms: Vec<String>,
    pub urgency_terms: Vec<String>,
    pub open_network_terms: Vec<String>,
    pub weights: ScoringWeights,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ThreatDatabaseConfig {
    fn default() -> Self {
        Self {
            malicious_domains: strings(&[
                "malicious-site.com",
                "phishing-bank.com",
                "fake-paypal.com",
                "scam-crypto.com",
                "secure-paypa1-login.com",
                "free-bitcoin-giveaway.tk",
            ]),
            trusted_domains: strings(&[
                "google.com",
                "paypal.com",
                "amazon.com",
                "amazon.in",
                "microsoft.com",
                "apple.com",
                "github.com",
                "npci.org.in",
            ]),
            shortener_domains: strings(&[
                "bit.ly",
                "tinyurl.com",
                "t.co",
                "goo.gl",
                "ow.ly",
                "is.gd",
                "v.gd",
                "buff.ly",
                "rebrand.ly",
                "cutt.ly",
                "rb.gy",
                "tiny.cc",
                "shorturl.at",
            ]),
            phishing_patterns: vec![
                PhishingPatternConfig::new(
                    "brand lookalike spelling",
                    r"(?i)(?:paypa1|payp4l|amaz0n|arnazon|g00gle|go0gle|micr0soft|rnicrosoft|app1e|netf1ix|faceb00k)",
                ),
                PhishingPatternConfig::new(
                    "brand name with account action in host",
                    r"(?i)^https?://[^/?#]*(?:paypal|amazon|apple|microsoft|google|netflix|facebook)[-.](?:secure|verify|verification|login|signin|account|update|support)",
                ),
                PhishingPatternConfig::new(
                    "raw IP address host",
                    r"(?i)^https?://(?:[^/?#@]*@)?(?:\d{1,3}(?:\.\d{1,3}){3}|\[[0-9a-f:.]+\])(?::\d+)?(?:[/?#]|$)",
                ),
                PhishingPatternConfig::new(
                    "known URL shortener",
                    r"(?i)^https?://(?:www\.)?(?:bit\.ly|tinyurl\.com|t\.co|goo\.gl|ow\.ly)(?:[/?#]|$)",
                ),
                PhishingPatternConfig::new(
                    "hyphenated host on free TLD",
                    r"(?i)^https?://[^/?#]*[a-z0-9]+-[a-z0-9]+-[a-z0-9]+\.(?:tk|ml|ga|cf|gq)(?:[:/?#]|$)",
                ),
                PhishingPatternConfig::new(
                    "credentials before host",
                    r"(?i)^https?://[^/?#]*@",
                ),
            ],
            scam_keywords: strings(&[
                "click here",
                "urgent",
                "limited time",
                "act now",
                "free money",
                "congratulations",
                "winner",
                "prize",
                "lottery",
                "inheritance",
            ]),
            suspicious_keywords: strings(&[
                "phishing",
                "malware",
                "virus",
                "hack",
                "steal",
                "fraud",
                "scam",
                "fake",
                "suspicious",
                "dangerous",
            ]),
            suspicious_vpa_terms: strings(&["test", "fake", "dummy", "temp"]),
            urgency_terms: strings(&["urgent", "emergency", "immediately"]),
            open_network_terms: strings(&["free wifi", "public", "guest", "open", "hack"]),
            weights: ScoringWeights::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhishingPattern {
    pub name: String,
    pub regex: Regex,
}

/// Compiled, read-only threat intelligence used by the scorer.
#[derive(Debug, Clone)]
pub struct ThreatDatabase {
    malicious_domains: HashSet<String>,
    trusted_domains: HashSet<String>,
    shortener_domains: HashSet<String>,
    phishing_patterns: Vec<PhishingPattern>,
    scam_keywords: Vec<String>,
    suspicious_keywords: Vec<String>,
    suspicious_vpa_terms: Vec<String>,
    urgency_terms: Vec<String>,
    open_network_terms: Vec<String>,
    weights: ScoringWeights,
}

impl Default for ThreatDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThreatDatabase {
    /// Compile a config. Any invalid regex rejects the whole database.
    pub fn from_config(config: ThreatDatabaseConfig) -> Result<Self> {
        let (patterns, errors) = compile_patterns(&config.phishing_patterns);
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
        Ok(Self::assemble(config, patterns))
    }

    /// The database shipped with the crate.
    pub fn builtin() -> Self {
        let config = ThreatDatabaseConfig::default();
        let (patterns, errors) = compile_patterns(&config.phishing_patterns);
        for error in errors {
            log::error!("Skipping built-in phishing pattern: {:#}", error);
        }
        Self::assemble(config, patterns)
    }

    /// Database with no domains, patterns or keywords; only the weights.
    pub fn empty() -> Self {
        Self::assemble(
            ThreatDatabaseConfig {
                malicious_domains: Vec::new(),
                trusted_domains: Vec::new(),
                shortener_domains: Vec::new(),
                phishing_patterns: Vec::new(),
                scam_keywords: Vec::new(),
                suspicious_keywords: Vec::new(),
                suspicious_vpa_terms: Vec::new(),
                urgency_terms: Vec::new(),
                open_network_terms: Vec::new(),
                weights: ScoringWeights::default(),
            },
            Vec::new(),
        )
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ThreatDatabaseConfig =
            serde_yaml::from_str(content).context("Failed to parse threat database YAML")?;
        Self::from_config(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read threat database {}", path.display()))?;
        let db = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid threat database {}", path.display()))?;
        log::info!(
            "Loaded threat database from {}: {} malicious domains, {} phishing patterns",
            path.display(),
            db.malicious_domains.len(),
            db.phishing_patterns.len()
        );
        Ok(db)
    }

    fn assemble(config: ThreatDatabaseConfig, phishing_patterns: Vec<PhishingPattern>) -> Self {
        Self {
            malicious_domains: domain_set(&config.malicious_domains),
            trusted_domains: domain_set(&config.trusted_domains),
            shortener_domains: domain_set(&config.shortener_domains),
            phishing_patterns,
            scam_keywords: keyword_list(&config.scam_keywords),
            suspicious_keywords: keyword_list(&config.suspicious_keywords),
            suspicious_vpa_terms: keyword_list(&config.suspicious_vpa_terms),
            urgency_terms: keyword_list(&config.urgency_terms),
            open_network_terms: config
                .open_network_terms
                .iter()
                .map(|t| normalize_network_name(t))
                .filter(|t| !t.is_empty())
                .collect(),
            weights: config.weights,
        }
    }

    pub fn with_malicious_domain(mut self, domain: &str) -> Self {
        let domain = DomainUtils::canonicalize_domain(domain);
        if !domain.is_empty() {
            self.malicious_domains.insert(domain);
        }
        self
    }

    pub fn with_trusted_domain(mut self, domain: &str) -> Self {
        let domain = DomainUtils::canonicalize_domain(domain);
        if !domain.is_empty() {
            self.trusted_domains.insert(domain);
        }
        self
    }

    pub fn with_phishing_pattern(mut self, name: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid phishing pattern '{}': {}", name, pattern))?;
        self.phishing_patterns.push(PhishingPattern {
            name: name.to_string(),
            regex,
        });
        Ok(self)
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn is_malicious_domain(&self, domain: &str) -> bool {
        DomainUtils::matches_domain_set(domain, &self.malicious_domains)
    }

    pub fn is_trusted_domain(&self, domain: &str) -> bool {
        DomainUtils::matches_domain_set(domain, &self.trusted_domains)
    }

    pub fn is_shortener_domain(&self, domain: &str) -> bool {
        DomainUtils::matches_domain_set(domain, &self.shortener_domains)
    }

    pub fn phishing_patterns(&self) -> &[PhishingPattern] {
        &self.phishing_patterns
    }

    pub fn scam_keywords(&self) -> &[String] {
        &self.scam_keywords
    }

    pub fn suspicious_keywords(&self) -> &[String] {
        &self.suspicious_keywords
    }

    pub fn suspicious_vpa_terms(&self) -> &[String] {
        &self.suspicious_vpa_terms
    }

    pub fn urgency_terms(&self) -> &[String] {
        &self.urgency_terms
    }

    /// Normalized with [`normalize_network_name`].
    pub fn open_network_terms(&self) -> &[String] {
        &self.open_network_terms
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn summary(&self) -> ThreatDatabaseSummary {
        ThreatDatabaseSummary {
            malicious_domains: self.malicious_domains.len(),
            trusted_domains: self.trusted_domains.len(),
            shortener_domains: self.shortener_domains.len(),
            phishing_patterns: self.phishing_patterns.len(),
            keywords: self.scam_keywords.len()
                + self.suspicious_keywords.len()
                + self.suspicious_vpa_terms.len()
                + self.urgency_terms.len()
                + self.open_network_terms.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreatDatabaseSummary {
    pub malicious_domains: usize,
    pub trusted_domains: usize,
    pub shortener_domains: usize,
    pub phishing_patterns: usize,
    pub keywords: usize,
}

fn compile_patterns(
    configs: &[PhishingPatternConfig],
) -> (Vec<PhishingPattern>, Vec<anyhow::Error>) {
    let mut patterns = Vec::with_capacity(configs.len());
    let mut errors = Vec::new();

    for config in configs {
        match Regex::new(&config.pattern) {
            Ok(regex) => patterns.push(PhishingPattern {
                name: config.name.clone(),
                regex,
            }),
            Err(e) => errors.push(anyhow::Error::new(e).context(format!(
                "Invalid phishing pattern '{}': {}",
                config.name, config.pattern
            ))),
        }
    }

    (patterns, errors)
}

fn domain_set(domains: &[String]) -> HashSet<String> {
    domains
        .iter()
        .map(|d| DomainUtils::canonicalize_domain(d))
        .filter(|d| !d.is_empty())
        .collect()
}

fn keyword_list(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}

/// Lowercase and drop spaces, `_` and `-` so "Free_WiFi" and "free wifi" compare equal.
pub fn normalize_network_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Handle for swapping the threat database while analyses keep running.
/// Readers take an `Arc` snapshot, so a swap never affects an analysis in flight.
#[derive(Debug, Clone)]
pub struct SharedThreatDatabase {
    inner: Arc<RwLock<Arc<ThreatDatabase>>>,
}

impl Default for SharedThreatDatabase {
    fn default() -> Self {
        Self::new(ThreatDatabase::builtin())
    }
}

impl SharedThreatDatabase {
    pub fn new(db: ThreatDatabase) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(db))),
        }
    }

    pub fn snapshot(&self) -> Arc<ThreatDatabase> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Install a new database, returning the previous one.
    pub fn replace(&self, db: ThreatDatabase) -> Arc<ThreatDatabase> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(db))
    }

    /// Reload from disk. On error the current database stays in place.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let db = ThreatDatabase::load_from_file(path)?;
        self.replace(db);
        log::info!("Threat database reloaded");
        Ok(())
    }
}

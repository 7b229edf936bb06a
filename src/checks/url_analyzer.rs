use super::CheckScore;
use crate::classifier::strip_prefix_ignore_case;
use crate::domain_utils::DomainUtils;
use crate::extraction::UrlInfo;
use crate::threat_db::ThreatDatabase;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainReputation {
    Trusted,    // On the trusted list, no pattern hits
    Unknown,    // Not categorized
    Suspicious, // Matched at least one phishing pattern
    Malicious,  // Known bad domain
}

/// URL-only facts the aggregator needs besides the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlSignals {
    pub reputation: DomainReputation,
    pub matched_patterns: Vec<String>,
    pub is_shortened: bool,
}

/// Score a URL payload against the threat database.
pub fn analyze(text: &str, info: &UrlInfo, db: &ThreatDatabase) -> (CheckScore, UrlSignals) {
    let weights = db.weights();
    let mut check = CheckScore::new("url_analysis");
    let url = text.trim();

    let host = info.domain.as_deref().filter(|_| info.is_valid());
    if host.is_none() {
        check.add(weights.unparseable_url, "URL could not be parsed");
    }

    let is_malicious = host.map_or(false, |h| db.is_malicious_domain(h));
    if is_malicious {
        check.add(
            weights.malicious_domain,
            format!("Known malicious domain: {}", host.unwrap_or_default()),
        );
    }

    // WHATWG host parsing turns "http://2130706433/" into "http://127.0.0.1/"
    let normalized = Url::parse(url)
        .ok()
        .map(String::from)
        .filter(|n| n != url);

    let mut matched_patterns = Vec::new();
    for pattern in db.phishing_patterns() {
        let hit = pattern.regex.is_match(url)
            || normalized.as_deref().map_or(false, |n| pattern.regex.is_match(n));
        if hit {
            log::debug!("URL matched phishing pattern '{}': {}", pattern.name, url);
            check.add(
                weights.phishing_pattern,
                format!("Suspicious pattern detected: {}", pattern.name),
            );
            matched_patterns.push(pattern.name.clone());
        }
    }

    if host.map_or(false, DomainUtils::is_punycode) {
        check.add(
            weights.punycode_domain,
            "Punycode domain detected (possible homograph attack)",
        );
    }

    if url.contains("..") {
        check.add(weights.path_traversal, "Path traversal sequence in URL");
    }

    if url.chars().count() > weights.long_url_length {
        check.add(weights.long_url, "Unusually long URL");
    }

    if strip_prefix_ignore_case(url, "https://").is_none() {
        check.add(weights.insecure_protocol, "Non-HTTPS connection");
    }

    let is_shortened = host.map_or(false, |h| db.is_shortener_domain(h));
    if is_shortened {
        log::debug!("Detected shortened URL: {}", url);
        check.add(
            weights.url_shortener,
            "URL shortener hides the final destination",
        );
    }

    let reputation = if is_malicious {
        DomainReputation::Malicious
    } else if !matched_patterns.is_empty() {
        DomainReputation::Suspicious
    } else if host.map_or(false, |h| db.is_trusted_domain(h)) {
        DomainReputation::Trusted
    } else {
        DomainReputation::Unknown
    };

    (
        check,
        UrlSignals {
            reputation,
            matched_patterns,
            is_shortened,
        },
    )
}

use std::collections::HashSet;

/// Minimal domain hierarchy utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Canonicalize host (lowercase, strip `www.` and trailing dot)
    pub fn canonicalize_domain(domain: &str) -> String {
        let domain_lower = domain.trim().trim_end_matches('.').to_lowercase();
        if let Some(stripped) = domain_lower.strip_prefix("www.") {
            stripped.to_string()
        } else {
            domain_lower
        }
    }

    /// The domain itself followed by each parent: `a.b.c` -> `a.b.c`, `b.c`, `c`.
    pub fn domain_hierarchy(domain: &str) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(domain), |d: &&str| {
            (*d).split_once('.').map(|(_, parent)| parent)
        })
        .filter(|d| !d.is_empty())
    }

    /// Check if domain is in the set, either exactly or as a subdomain of an entry.
    /// Entries are expected to be canonical already.
    pub fn matches_domain_set(domain: &str, domain_set: &HashSet<String>) -> bool {
        if domain_set.is_empty() {
            return false;
        }
        let canonical = Self::canonicalize_domain(domain);
        let matched = Self::domain_hierarchy(&canonical).any(|candidate| domain_set.contains(candidate));
        matched
    }

    /// Any label in punycode form.
    pub fn is_punycode(domain: &str) -> bool {
        domain
            .split('.')
            .any(|label| label.get(..4).map_or(false, |p| p.eq_ignore_ascii_case("xn--")))
    }
}

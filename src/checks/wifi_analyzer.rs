use super::CheckScore;
use crate::extraction::WifiInfo;
use crate::threat_db::{normalize_network_name, ThreatDatabase};

fn is_weak_security(security_type: Option<&str>) -> bool {
    match security_type.map(str::trim) {
        None | Some("") => true,
        Some(t) => t.eq_ignore_ascii_case("nopass") || t.eq_ignore_ascii_case("WEP"),
    }
}

/// Score a Wi-Fi credential block.
pub fn analyze(info: &WifiInfo, db: &ThreatDatabase) -> CheckScore {
    let weights = db.weights();
    let mut check = CheckScore::new("wifi_analysis");

    let ssid = normalize_network_name(&info.network_name);
    if let Some(term) = db
        .open_network_terms()
        .iter()
        .find(|term| ssid.contains(term.as_str()))
    {
        check.add(
            weights.open_network_name,
            format!("Network name suggests an open or rogue hotspot ({})", term),
        );
    }

    if is_weak_security(info.security_type.as_deref()) {
        check.add(
            weights.weak_security,
            format!(
                "Weak or no encryption ({})",
                info.security_type.as_deref().unwrap_or("unspecified")
            ),
        );
    }

    if info.hidden {
        check.add(weights.hidden_network, "Hidden network");
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi(ssid: &str, security: Option<&str>, hidden: bool) -> WifiInfo {
        WifiInfo {
            network_name: ssid.to_string(),
            security_type: security.map(str::to_string),
            password: Some("pw".to_string()),
            hidden,
        }
    }

    #[test]
    fn test_secure_home_network() {
        let db = ThreatDatabase::builtin();
        let check = analyze(&wifi("Smith Family", Some("WPA"), false), &db);
        assert!(!check.fired());
    }

    #[test]
    fn test_ssid_terms_ignore_spacing() {
        let db = ThreatDatabase::builtin();
        for ssid in ["FreeWiFi", "free_wifi", "Airport Guest", "PUBLIC-net"] {
            let check = analyze(&wifi(ssid, Some("WPA2"), false), &db);
            assert_eq!(check.score, db.weights().open_network_name, "{}", ssid);
        }
    }

    #[test]
    fn test_weak_security_variants() {
        assert!(is_weak_security(Some("nopass")));
        assert!(is_weak_security(Some("WEP")));
        assert!(is_weak_security(Some("wep")));
        assert!(is_weak_security(Some("")));
        assert!(is_weak_security(None));
        assert!(!is_weak_security(Some("WPA")));
        assert!(!is_weak_security(Some("SAE")));
    }

    #[test]
    fn test_all_wifi_signals() {
        let db = ThreatDatabase::builtin();
        let w = db.weights();
        let check = analyze(&wifi("hack-me", Some("WEP"), true), &db);
        assert_eq!(
            check.score,
            w.open_network_name + w.weak_security + w.hidden_network
        );
        assert_eq!(check.threats.len(), 3);
    }
}

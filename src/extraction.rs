use crate::classifier::{strip_prefix_ignore_case, DataType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::{form_urlencoded, Url};

/// Sentinel stored in `UrlInfo::domain` when the payload is not a parseable URL.
pub const INVALID_URL: &str = "Invalid URL";
/// Default for names the payload does not carry.
pub const UNKNOWN: &str = "Unknown";

static WIFI_FIELD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([A-Za-z]):(.*)$").expect("wifi field regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlInfo {
    pub domain: Option<String>,
    pub protocol: Option<String>,
    pub path: Option<String>,
    pub parameters: BTreeMap<String, String>,
}

impl UrlInfo {
    pub fn is_valid(&self) -> bool {
        self.domain.as_deref() != Some(INVALID_URL)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpiInfo {
    pub payee_vpa: Option<String>,
    pub merchant_info: String,
    pub payment_amount: Option<f64>,
    pub currency: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiInfo {
    pub network_name: String,
    pub security_type: Option<String>,
    pub password: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailInfo {
    pub email_address: String,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneInfo {
    pub phone_number: String,
}

/// Structured fields pulled out of a payload, one variant per [`DataType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractedInfo {
    Url(UrlInfo),
    Upi(UpiInfo),
    Wifi(WifiInfo),
    Contact(ContactInfo),
    Email(EmailInfo),
    Phone(PhoneInfo),
    Text,
}

impl ExtractedInfo {
    pub fn data_type(&self) -> DataType {
        match self {
            ExtractedInfo::Url(_) => DataType::Url,
            ExtractedInfo::Upi(_) => DataType::Upi,
            ExtractedInfo::Wifi(_) => DataType::Wifi,
            ExtractedInfo::Contact(_) => DataType::Contact,
            ExtractedInfo::Email(_) => DataType::Email,
            ExtractedInfo::Phone(_) => DataType::Phone,
            ExtractedInfo::Text => DataType::Text,
        }
    }
}

/// Parse `text` into the fields of `data_type`. Never fails: malformed input
/// yields sentinels or absent fields.
pub fn extract(text: &str, data_type: DataType) -> ExtractedInfo {
    let text = text.trim();
    match data_type {
        DataType::Url => ExtractedInfo::Url(extract_url(text)),
        DataType::Upi => ExtractedInfo::Upi(extract_upi(text)),
        DataType::Wifi => ExtractedInfo::Wifi(extract_wifi(text)),
        DataType::Contact => ExtractedInfo::Contact(extract_contact(text)),
        DataType::Email => ExtractedInfo::Email(extract_email(text)),
        DataType::Phone => ExtractedInfo::Phone(extract_phone(text)),
        DataType::Text => ExtractedInfo::Text,
    }
}

fn extract_url(text: &str) -> UrlInfo {
    match Url::parse(text) {
        Ok(parsed) => {
            let mut parameters = BTreeMap::new();
            for (key, value) in parsed.query_pairs() {
                parameters.insert(key.into_owned(), value.into_owned());
            }
            UrlInfo {
                // IDN hosts come back in punycode form
                domain: parsed.host_str().map(|h| h.to_lowercase()),
                protocol: Some(parsed.scheme().to_string()),
                path: Some(parsed.path().to_string()),
                parameters,
            }
        }
        Err(e) => {
            log::debug!("URL payload failed to parse: {}", e);
            UrlInfo {
                domain: Some(INVALID_URL.to_string()),
                ..UrlInfo::default()
            }
        }
    }
}

fn extract_upi(text: &str) -> UpiInfo {
    let mut info = UpiInfo {
        merchant_info: UNKNOWN.to_string(),
        ..UpiInfo::default()
    };

    let query = match text.split_once('?') {
        Some((_, query)) => query,
        None => return info,
    };

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.trim().to_string();
        match key.as_ref() {
            "pa" => info.payee_vpa = Some(value),
            "pn" => info.merchant_info = value,
            "am" => info.payment_amount = parse_amount(&value),
            "cu" => info.currency = Some(value),
            "tn" => info.note = Some(value),
            _ => {}
        }
    }

    info
}

fn parse_amount(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

fn extract_wifi(text: &str) -> WifiInfo {
    let body = strip_prefix_ignore_case(text, "WIFI:").unwrap_or(text);
    let mut info = WifiInfo {
        network_name: UNKNOWN.to_string(),
        ..WifiInfo::default()
    };

    for segment in split_wifi_segments(body) {
        let Some(caps) = WIFI_FIELD_REGEX.captures(&segment) else {
            continue;
        };
        let value = caps[2].to_string();
        match caps[1].to_ascii_uppercase().as_str() {
            "S" => info.network_name = value,
            "T" => info.security_type = Some(value),
            "P" => info.password = Some(value),
            "H" => info.hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    info
}

/// Split on `;`, honouring backslash escapes (`\;`, `\:`, `\\`).
fn split_wifi_segments(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ';' => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn extract_contact(text: &str) -> ContactInfo {
    let mut info = ContactInfo::default();

    for line in text.lines() {
        let Some((property, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        // "item1.TEL;TYPE=CELL" -> "TEL"
        let name = property.split(';').next().unwrap_or(property);
        let name = name.rsplit('.').next().unwrap_or(name).to_ascii_uppercase();

        // vCard 4.0 may carry TEL and EMAIL as URIs: "TEL;VALUE=uri:tel:+1-555-0100"
        let (slot, value) = match name.as_str() {
            "FN" => (&mut info.name, value),
            "TEL" => (&mut info.phone, strip_uri_scheme(value, "tel:")),
            "EMAIL" => (&mut info.email, strip_uri_scheme(value, "mailto:")),
            "ORG" => (&mut info.organization, value),
            _ => continue,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }

    info
}

fn strip_uri_scheme<'a>(value: &'a str, scheme: &str) -> &'a str {
    strip_prefix_ignore_case(value, scheme)
        .map(str::trim)
        .unwrap_or(value)
}

fn extract_email(text: &str) -> EmailInfo {
    let rest = text.strip_prefix("mailto:").unwrap_or(text);
    let (address, query) = match rest.split_once('?') {
        Some((address, query)) => (address, Some(query)),
        None => (rest, None),
    };

    let mut info = EmailInfo {
        email_address: address.trim().to_string(),
        ..EmailInfo::default()
    };

    if let Some(query) = query {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.to_ascii_lowercase().as_str() {
                "subject" => info.subject = Some(value.into_owned()),
                "body" => info.body = Some(value.into_owned()),
                _ => {}
            }
        }
    }

    info
}

fn extract_phone(text: &str) -> PhoneInfo {
    let rest = text.strip_prefix("tel:").unwrap_or(text);
    PhoneInfo {
        phone_number: rest.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_info(text: &str) -> UrlInfo {
        match extract(text, DataType::Url) {
            ExtractedInfo::Url(info) => info,
            other => panic!("expected url info, got {:?}", other),
        }
    }

    fn upi_info(text: &str) -> UpiInfo {
        match extract(text, DataType::Upi) {
            ExtractedInfo::Upi(info) => info,
            other => panic!("expected upi info, got {:?}", other),
        }
    }

    fn wifi_info(text: &str) -> WifiInfo {
        match extract(text, DataType::Wifi) {
            ExtractedInfo::Wifi(info) => info,
            other => panic!("expected wifi info, got {:?}", other),
        }
    }

    #[test]
    fn test_url_fields() {
        let info = url_info("https://Shop.Example.com/cart?item=1&ref=qr&item=2");

        assert_eq!(info.domain.as_deref(), Some("shop.example.com"));
        assert_eq!(info.protocol.as_deref(), Some("https"));
        assert_eq!(info.path.as_deref(), Some("/cart"));
        // last value wins for repeated keys
        assert_eq!(info.parameters.get("item").map(String::as_str), Some("2"));
        assert_eq!(info.parameters.get("ref").map(String::as_str), Some("qr"));
        assert!(info.is_valid());
    }

    #[test]
    fn test_invalid_url_sentinel() {
        let info = url_info("https://");
        assert_eq!(info.domain.as_deref(), Some(INVALID_URL));
        assert!(info.protocol.is_none());
        assert!(info.parameters.is_empty());
        assert!(!info.is_valid());
    }

    #[test]
    fn test_idn_host_becomes_punycode() {
        let info = url_info("https://p\u{0430}ypal.com/login");
        assert!(info.domain.unwrap().starts_with("xn--"));
    }

    #[test]
    fn test_upi_fields() {
        let info = upi_info("upi://pay?pa=merchant@bank&pn=Corner%20Store&am=1000&cu=INR&tn=Groceries");

        assert_eq!(info.payee_vpa.as_deref(), Some("merchant@bank"));
        assert_eq!(info.merchant_info, "Corner Store");
        assert_eq!(info.payment_amount, Some(1000.0));
        assert_eq!(info.currency.as_deref(), Some("INR"));
        assert_eq!(info.note.as_deref(), Some("Groceries"));
    }

    #[test]
    fn test_upi_defaults() {
        let info = upi_info("upi://pay");
        assert_eq!(info.merchant_info, UNKNOWN);
        assert!(info.payee_vpa.is_none());
        assert!(info.payment_amount.is_none());

        let info = upi_info("upi://pay?pa=a@b&am=lots");
        assert!(info.payment_amount.is_none());

        let info = upi_info("upi://pay?pa=a@b&am=NaN");
        assert!(info.payment_amount.is_none());

        let info = upi_info("upi://pay?pa=a@b&am=-5");
        assert!(info.payment_amount.is_none());
    }

    #[test]
    fn test_wifi_fields() {
        let info = wifi_info("WIFI:T:WPA;S:Home Network;P:hunter2;H:true;;");

        assert_eq!(info.network_name, "Home Network");
        assert_eq!(info.security_type.as_deref(), Some("WPA"));
        assert_eq!(info.password.as_deref(), Some("hunter2"));
        assert!(info.hidden);
    }

    #[test]
    fn test_wifi_escapes_and_defaults() {
        let info = wifi_info(r"WIFI:S:Cafe\;Bar;P:pa\:ss;;");
        assert_eq!(info.network_name, "Cafe;Bar");
        assert_eq!(info.password.as_deref(), Some("pa:ss"));
        assert!(!info.hidden);

        let info = wifi_info("WIFI:T:WPA;;");
        assert_eq!(info.network_name, UNKNOWN);
    }

    #[test]
    fn test_contact_fields() {
        let vcard = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\nORG:Acme Corp\r\nTEL;TYPE=CELL:+1 555 123 4567\r\nitem1.EMAIL;TYPE=INTERNET:jane@acme.example\r\nEND:VCARD";

        match extract(vcard, DataType::Contact) {
            ExtractedInfo::Contact(info) => {
                assert_eq!(info.name.as_deref(), Some("Jane Doe"));
                assert_eq!(info.organization.as_deref(), Some("Acme Corp"));
                assert_eq!(info.phone.as_deref(), Some("+1 555 123 4567"));
                assert_eq!(info.email.as_deref(), Some("jane@acme.example"));
            }
            other => panic!("expected contact info, got {:?}", other),
        }
    }

    #[test]
    fn test_contact_uri_values() {
        let vcard = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Jane Doe\r\nTEL;VALUE=uri;TYPE=cell:tel:+1-555-555-5555\r\nEMAIL:MAILTO:jane@acme.example\r\nEND:VCARD";

        match extract(vcard, DataType::Contact) {
            ExtractedInfo::Contact(info) => {
                assert_eq!(info.phone.as_deref(), Some("+1-555-555-5555"));
                assert_eq!(info.email.as_deref(), Some("jane@acme.example"));
            }
            other => panic!("expected contact info, got {:?}", other),
        }
    }

    #[test]
    fn test_contact_empty_uri_value_skipped() {
        let vcard = "BEGIN:VCARD\nTEL;VALUE=uri:tel:\nTEL:+1 555 0100\nEND:VCARD";

        match extract(vcard, DataType::Contact) {
            ExtractedInfo::Contact(info) => assert_eq!(info.phone.as_deref(), Some("+1 555 0100")),
            other => panic!("expected contact info, got {:?}", other),
        }
    }

    #[test]
    fn test_email_and_phone() {
        match extract("mailto:help@example.com?subject=Hi%20there&body=Ping", DataType::Email) {
            ExtractedInfo::Email(info) => {
                assert_eq!(info.email_address, "help@example.com");
                assert_eq!(info.subject.as_deref(), Some("Hi there"));
                assert_eq!(info.body.as_deref(), Some("Ping"));
            }
            other => panic!("expected email info, got {:?}", other),
        }

        assert_eq!(
            extract("tel:+15551234567", DataType::Phone),
            ExtractedInfo::Phone(PhoneInfo {
                phone_number: "+15551234567".to_string()
            })
        );
    }

    #[test]
    fn test_text_has_no_fields() {
        assert_eq!(extract("anything", DataType::Text), ExtractedInfo::Text);
        assert_eq!(
            extract("anything", DataType::Text).data_type(),
            DataType::Text
        );
    }

    #[test]
    fn test_garbage_never_panics() {
        let inputs = ["", ";;;;", "\\", "?", "::::", "BEGIN:VCARD", "€", "upi://?&&==&"];
        for input in inputs {
            for data_type in [
                DataType::Url,
                DataType::Upi,
                DataType::Wifi,
                DataType::Contact,
                DataType::Email,
                DataType::Phone,
                DataType::Text,
            ] {
                assert_eq!(extract(input, data_type).data_type(), data_type);
            }
        }
    }
}

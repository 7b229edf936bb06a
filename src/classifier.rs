use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content a QR payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Url,
    Upi,
    Wifi,
    Contact,
    Email,
    Phone,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Url => "url",
            DataType::Upi => "upi",
            DataType::Wifi => "wifi",
            DataType::Contact => "contact",
            DataType::Email => "email",
            DataType::Phone => "phone",
            DataType::Text => "text",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify decoded payload text. Rules are tried in order and the first hit
/// wins, so `upi://` never falls through to the generic URL rule.
pub fn classify(text: &str) -> DataType {
    let text = text.trim();

    if strip_prefix_ignore_case(text, "http://").is_some()
        || strip_prefix_ignore_case(text, "https://").is_some()
    {
        DataType::Url
    } else if strip_prefix_ignore_case(text, "upi://").is_some() {
        DataType::Upi
    } else if strip_prefix_ignore_case(text, "WIFI:").is_some() {
        DataType::Wifi
    } else if text.contains("BEGIN:VCARD") {
        DataType::Contact
    } else if text.starts_with("mailto:") {
        DataType::Email
    } else if text.starts_with("tel:") {
        DataType::Phone
    } else {
        DataType::Text
    }
}

/// ASCII case-insensitive `strip_prefix`. Safe on any UTF-8 input.
pub(crate) fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

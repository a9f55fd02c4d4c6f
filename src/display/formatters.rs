//! Pure presentation transforms shared by the list and detail output.

use jiff::Timestamp;
use jiff::civil::Date;

const NOT_AVAILABLE: &str = "N/A";

fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn tail(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// First 10 and last 8 characters of a long hash
pub fn truncate_hash(hash: Option<&str>) -> String {
    match hash {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(h) if h.chars().count() <= 20 => h.to_string(),
        Some(h) => format!("{}...{}", head(h, 10), tail(h, 8)),
    }
}

/// `0x1234...abcd`
pub fn truncate_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    if address.chars().count() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", head(address, 6), tail(address, 4))
}

/// `consent_approval` -> `Consent Approval`
pub fn format_type_label(tx_type: &str) -> String {
    if tx_type.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    tx_type
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Abbreviate with one decimal: `1.5K`, `2.3M`
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// `1 consent`, `3 consents`
pub fn item_label(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// RFC 3339 timestamp as `Jan 15, 2024, 10:30 AM` (UTC); a bare date as
/// `Jan 15, 2024`
pub fn format_date(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    if let Ok(ts) = value.parse::<Timestamp>() {
        return ts.strftime("%b %-d, %Y, %I:%M %p").to_string();
    }
    if let Ok(date) = value.parse::<Date>() {
        return date.strftime("%b %-d, %Y").to_string();
    }
    NOT_AVAILABLE.to_string()
}

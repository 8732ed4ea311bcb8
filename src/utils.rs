//! String composition for the list and detail panels.

use crate::Venue;

/// Shown wherever a field is empty.
pub const NONE_TEXT: &str = "無";

/// `value`, or the "none" placeholder when it is blank.
pub fn or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        NONE_TEXT
    } else {
        value
    }
}

/// Compose the phone line from whichever phone fields are present:
/// `landline 分機 ext / mobile`.
pub fn phone_display(venue: &Venue) -> String {
    let mut phone = String::new();
    if !venue.landline.is_empty() {
        phone.push_str(&venue.landline);
    }
    if !venue.extension.is_empty() {
        phone.push_str(&format!(" 分機 {}", venue.extension));
    }
    if !venue.mobile.is_empty() {
        if !phone.is_empty() {
            phone.push_str(" / ");
        }
        phone.push_str(&venue.mobile);
    }
    if phone.is_empty() {
        NONE_TEXT.to_string()
    } else {
        phone
    }
}

/// `tel:` link target, preferring the landline.
pub fn tel_href(venue: &Venue) -> Option<String> {
    [&venue.landline, &venue.mobile]
        .into_iter()
        .find(|n| !n.is_empty())
        .map(|n| format!("tel:{}", n))
}

pub fn maps_search_url(address: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(address)
    )
}

/// Second line of a search result: `category - address`.
pub fn category_and_address(venue: &Venue) -> String {
    format!("{} - {}", venue.category, venue.address)
}

pub fn format_distance_km(km: f64) -> String {
    format!("{:.2} 公里", km)
}

pub fn results_count_label(count: usize) -> String {
    format!("共 {} 個場館", count)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

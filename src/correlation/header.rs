//! The header contract shared by every hop.

use axum::http::{HeaderMap, HeaderName};

/// Canonical name of the correlation header, also the key used in the
/// context store and in trace extra fields.
pub const KORRELASJONS_ID: &str = "Korrelasjonsid";

/// Wire form of [`KORRELASJONS_ID`]. Header names are case-insensitive and
/// `http` stores them lowercased.
pub static KORRELASJONS_ID_HEADER: HeaderName = HeaderName::from_static("korrelasjonsid");

/// Raw inbound value of the correlation header, if it is present and valid UTF-8.
pub fn inbound_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(&KORRELASJONS_ID_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}

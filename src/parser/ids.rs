//! Identifier parsing for free-text operator input
//!
//! Operators paste IDs separated by commas, spaces or periods
//! (`"671, 886  887."`). Non-numeric tokens are silently dropped.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ContentId;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[\s,\.]+").expect("Invalid regex pattern");
}

/// Split `text` into numeric tokens, preserving order and duplicates
///
/// # Examples
///
/// ```
/// use tripdesk::parser::ids::parse_ids;
///
/// assert_eq!(parse_ids("671, 886  887."), vec!["671", "886", "887"]);
/// assert!(parse_ids("").is_empty());
/// ```
pub fn parse_ids(text: &str) -> Vec<String> {
    SEPARATORS
        .split(text)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Like [`parse_ids`], parsed into [`ContentId`]s
///
/// Tokens too large for a `u64` are dropped.
pub fn parse_content_ids(text: &str) -> Vec<ContentId> {
    parse_ids(text)
        .into_iter()
        .filter_map(|token| match token.parse::<ContentId>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "Skipping identifier out of range");
                None
            }
        })
        .collect()
}

/// Parse a single identifier, e.g. the parent ID field
pub fn parse_single_id(text: &str) -> Option<ContentId> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Render IDs as a PHP-serialized string array
///
/// JetEngine stores related IDs in post meta in this form, so the output can
/// be pasted straight into a meta field.
///
/// ```
/// use tripdesk::parser::ids::serialize_php_array;
///
/// assert_eq!(
///     serialize_php_array(&["886", "887"]),
///     r#"a:2:{i:0;s:3:"886";i:1;s:3:"887";}"#
/// );
/// ```
pub fn serialize_php_array<S: AsRef<str>>(ids: &[S]) -> String {
    let items: String = ids
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let v = v.as_ref();
            format!("i:{i};s:{}:\"{v}\";", v.len())
        })
        .collect();
    format!("a:{}:{{{items}}}", ids.len())
}

//! Language negotiation and translation lookup

use serde_json::Value;

use crate::models::{Lang, LocaleDocument};

/// Pick the site language from an `Accept-Language` header
///
/// Entries are ranked by their `q` weight (ties keep header order) and
/// matched on the primary subtag, so `fr-CA` selects French. Entries with
/// `q=0` are ignored. Falls back to English.
///
/// ```
/// use folio_common::i18n::negotiate_language;
/// use folio_common::Lang;
///
/// assert_eq!(negotiate_language(Some("fr-CA,fr;q=0.9,en;q=0.8")), Lang::Fr);
/// assert_eq!(negotiate_language(Some("de-DE,de;q=0.9")), Lang::En);
/// assert_eq!(negotiate_language(None), Lang::En);
/// ```
pub fn negotiate_language(accept_language: Option<&str>) -> Lang {
    let Some(header) = accept_language else {
        return Lang::default();
    };

    let mut ranges: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let mut quality = 1.0;
            for param in parts {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    quality = q.trim().parse::<f32>().unwrap_or(0.0);
                }
            }
            Some((tag, quality))
        })
        .filter(|(_, q)| *q > 0.0)
        .collect();

    // Stable sort keeps header order among equal weights
    ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ranges
        .into_iter()
        .find_map(|(tag, _)| {
            let primary = tag.split('-').next().unwrap_or(tag);
            primary.parse::<Lang>().ok()
        })
        .unwrap_or_default()
}

/// Look up a dotted key (`"nav.about"`) in a translation tree
///
/// Returns `None` when a segment is missing or the value is not a string.
pub fn lookup<'a>(locale: &'a LocaleDocument, key: &str) -> Option<&'a str> {
    let mut node = &locale.0;
    for segment in key.split('.') {
        node = node.as_object()?.get(segment)?;
    }
    match node {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Translate a key, falling back to the key itself when it is missing
///
/// The fallback is deliberately visible in the rendered page.
pub fn translate(locale: &LocaleDocument, key: &str) -> String {
    lookup(locale, key)
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_negotiate_prefers_highest_quality() {
        assert_eq!(negotiate_language(Some("en;q=0.5, fr;q=0.9")), Lang::Fr);
        assert_eq!(negotiate_language(Some("fr;q=0.5, en")), Lang::En);
        assert_eq!(negotiate_language(Some("de, fr-FR;q=0.7")), Lang::Fr);
    }

    #[test]
    fn test_negotiate_ignores_zero_quality_and_garbage() {
        assert_eq!(negotiate_language(Some("fr;q=0, de")), Lang::En);
        assert_eq!(negotiate_language(Some("")), Lang::En);
        assert_eq!(negotiate_language(Some(",,;q=1")), Lang::En);
        assert_eq!(negotiate_language(Some("*")), Lang::En);
    }

    #[test]
    fn test_translate_nested_keys() {
        let locale = LocaleDocument(json!({
            "nav": { "about": "À propos" },
            "count": 3
        }));
        assert_eq!(translate(&locale, "nav.about"), "À propos");
        assert_eq!(translate(&locale, "nav.missing"), "nav.missing");
        assert_eq!(translate(&locale, "nav"), "nav");
        assert_eq!(translate(&locale, "count"), "count");
        assert_eq!(translate(&locale, "nav.about.deeper"), "nav.about.deeper");
    }
}

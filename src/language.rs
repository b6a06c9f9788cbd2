use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::side_table;

/// Pick the language code to resolve: a response header whose name contains
/// "language" wins over the language detected in the page itself. Header
/// names must already be lowercase, as `FetchResult` stores them.
pub fn language_code<'a>(
    headers: &'a BTreeMap<String, String>,
    detected: Option<&'a str>,
) -> Option<&'a str> {
    headers
        .iter()
        .find(|(name, value)| name.contains("language") && !value.trim().is_empty())
        .map(|(_, value)| value.trim())
        .or_else(|| detected.map(str::trim).filter(|code| !code.is_empty()))
}

/// Maps content-language codes ("en-GB") to stoplist names ("English").
///
/// The map lives in `language_codes.json`, is read on first lookup and kept
/// in memory afterwards. Entries are maintained by hand.
pub struct LanguageResolver {
    path: PathBuf,
    default: String,
    map: Mutex<Option<BTreeMap<String, String>>>,
}

impl LanguageResolver {
    pub fn new(path: PathBuf, default: impl Into<String>) -> Self {
        Self {
            path,
            default: default.into(),
            map: Mutex::new(None),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default
    }

    pub fn resolve(&self, code: Option<&str>) -> String {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return self.default.clone();
        };

        let mut guard = self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let map = guard.get_or_insert_with(|| {
            side_table::load_or_recreate(&self.path).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "language map unavailable");
                BTreeMap::new()
            })
        });

        match map.get(code) {
            Some(stoplist) => stoplist.clone(),
            None => {
                debug!(code, default = %self.default, "no stoplist mapped for language code");
                self.default.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn header_beats_detected_language() {
        let h = headers(&[("content-type", "text/html"), ("content-language", "de-DE")]);
        assert_eq!(language_code(&h, Some("en")), Some("de-DE"));
        assert_eq!(language_code(&headers(&[]), Some("fr")), Some("fr"));
        assert_eq!(language_code(&headers(&[]), Some("  ")), None);
        assert_eq!(language_code(&headers(&[]), None), None);

        let blank = headers(&[("content-language", " "), ("x-page-language", "nl")]);
        assert_eq!(language_code(&blank, Some("fr")), Some("nl"));
    }

    #[test]
    fn unknown_code_falls_back_to_english() {
        let tmp = tempfile::TempDir::new().unwrap();
        let resolver = LanguageResolver::new(tmp.path().join("language_codes.json"), "English");
        assert_eq!(resolver.resolve(Some("xx-YY")), "English");
        assert_eq!(resolver.resolve(None), "English");
    }

    #[test]
    fn mapped_code_returns_its_stoplist() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("language_codes.json");
        std::fs::write(&path, r#"{"en-GB": "English", "de-DE": "German"}"#).unwrap();

        let resolver = LanguageResolver::new(path, "English");
        assert_eq!(resolver.resolve(Some("de-DE")), "German");
        assert_eq!(resolver.resolve(Some("de")), "English");
    }

    #[test]
    fn map_is_created_on_first_lookup_only() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("textures/language_codes.json");
        let resolver = LanguageResolver::new(path.clone(), "English");

        resolver.resolve(None);
        assert!(!path.exists());

        resolver.resolve(Some("pt-BR"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn corrupt_map_is_recreated() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("language_codes.json");
        std::fs::write(&path, "[\"not\", \"a map\"]").unwrap();

        let resolver = LanguageResolver::new(path.clone(), "English");
        assert_eq!(resolver.resolve(Some("es")), "English");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}

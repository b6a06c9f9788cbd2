use std::sync::Arc;

use tracing::{debug, warn};

use super::{non_empty, Draft, ExtractError, Page, TextExtractor};
use crate::boilerplate::{self, stoplists, ClassType, TextBlock};
use crate::language::{language_code, LanguageResolver};

/// Heuristic fallback: classify text blocks with a language-specific
/// stoplist and keep the good ones.
pub struct BoilerplateExtractor {
    languages: Arc<LanguageResolver>,
}

impl BoilerplateExtractor {
    pub fn new(languages: Arc<LanguageResolver>) -> Self {
        Self { languages }
    }

    fn stoplist_for(&self, page: &Page<'_>, draft: &Draft) -> &'static boilerplate::Stoplist {
        let code = language_code(page.headers, draft.language.as_deref());
        let name = self.languages.resolve(code);
        debug!(url = page.url, code = ?code, stoplist = %name, "resolved stoplist");

        stoplists::get(&name).unwrap_or_else(|| {
            warn!(stoplist = %name, "no such stoplist, using the default");
            stoplists::get(self.languages.default_language()).unwrap_or_else(stoplists::english)
        })
    }
}

impl TextExtractor for BoilerplateExtractor {
    fn name(&self) -> &'static str {
        "boilerplate"
    }

    fn extract(&self, page: &Page<'_>, draft: &Draft) -> Result<Draft, ExtractError> {
        let stoplist = self.stoplist_for(page, draft);
        let blocks = boilerplate::classify(page.html, stoplist);

        Ok(Draft {
            title: title_from_blocks(&blocks),
            content: content_from_blocks(&blocks),
            ..Default::default()
        })
    }
}

fn is_good(block: &TextBlock) -> bool {
    !block.is_boilerplate && block.class_type == ClassType::Good
}

/// First good heading.
pub fn title_from_blocks(blocks: &[TextBlock]) -> Option<String> {
    blocks
        .iter()
        .find(|b| is_good(b) && b.is_heading)
        .and_then(|b| non_empty(b.text.as_str()))
}

/// Every good non-heading block, space-joined in document order.
pub fn content_from_blocks(blocks: &[TextBlock]) -> Option<String> {
    let text = blocks
        .iter()
        .filter(|b| is_good(b) && !b.is_heading)
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn block(text: &str, is_boilerplate: bool, is_heading: bool, class_type: ClassType) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            is_boilerplate,
            is_heading,
            class_type,
        }
    }

    #[test]
    fn only_good_non_boilerplate_blocks_are_used() {
        let blocks = vec![
            block("Menu", true, false, ClassType::Other),
            block("Sidebar heading", true, true, ClassType::Other),
            block("Real headline", false, true, ClassType::Good),
            block("Second headline", false, true, ClassType::Good),
            block("First paragraph.", false, false, ClassType::Good),
            block("Cookie notice", true, false, ClassType::Good),
            block("Related links", false, false, ClassType::Other),
            block("Second paragraph.", false, false, ClassType::Good),
        ];
        assert_eq!(title_from_blocks(&blocks).as_deref(), Some("Real headline"));
        assert_eq!(
            content_from_blocks(&blocks).as_deref(),
            Some("First paragraph. Second paragraph.")
        );
    }

    #[test]
    fn no_good_heading_means_no_title() {
        let blocks = vec![block("Body only.", false, false, ClassType::Good)];
        assert_eq!(title_from_blocks(&blocks), None);
        assert_eq!(content_from_blocks(&[]), None);
    }

    #[test]
    fn extracts_fixture_with_mapped_language() {
        let tmp = tempfile::TempDir::new().unwrap();
        let map = tmp.path().join("language_codes.json");
        std::fs::write(&map, r#"{"en-GB": "English"}"#).unwrap();
        let extractor = BoilerplateExtractor::new(Arc::new(LanguageResolver::new(map, "English")));

        let html = std::fs::read_to_string("tests/fixtures/river_park.html").unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("content-language".to_string(), "en-GB".to_string());
        let page = Page {
            url: "https://news.example.test/river-park",
            html: &html,
            headers: &headers,
        };

        let draft = extractor.extract(&page, &Draft::default()).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Council approves new river park"));
        let content = draft.content.unwrap();
        assert!(content.starts_with("The city council voted on Tuesday"));
        assert!(content.contains("cleaned up, and several of them"));
        assert!(!content.contains("All rights reserved"));
        assert!(draft.top_image.is_none());
    }

    #[test]
    fn unknown_stoplist_name_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let map = tmp.path().join("language_codes.json");
        std::fs::write(&map, r#"{"tlh": "Klingon"}"#).unwrap();
        let extractor = BoilerplateExtractor::new(Arc::new(LanguageResolver::new(map, "English")));

        let headers = BTreeMap::new();
        let page = Page {
            url: "https://x.test",
            html: "",
            headers: &headers,
        };
        let draft = Draft {
            language: Some("tlh".into()),
            ..Default::default()
        };
        let stoplist = extractor.stoplist_for(&page, &draft);
        assert!(std::ptr::eq(stoplist, stoplists::english()));
    }
}

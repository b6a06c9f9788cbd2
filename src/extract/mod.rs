pub mod fallback;
pub mod pipeline;
pub mod structured;

use std::collections::BTreeMap;

use thiserror::Error;

pub use fallback::BoilerplateExtractor;
pub use pipeline::Pipeline;
pub use structured::StructuredExtractor;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page has no usable markup")]
    EmptyDocument,
}

/// What an extractor gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub url: &'a str,
    pub html: &'a str,
    pub headers: &'a BTreeMap<String, String>,
}

/// Partial result accumulated across extractors. Empty strings are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub top_image: Option<String>,
    /// Language declared by the page itself (e.g. `<html lang>`).
    pub language: Option<String>,
}

impl Draft {
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.content.is_some()
    }

    /// Take fields from `other` only where this draft has none.
    pub fn fill_missing(&mut self, other: Draft) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.title, other.title);
        fill(&mut self.content, other.content);
        fill(&mut self.meta_description, other.meta_description);
        fill(&mut self.meta_keywords, other.meta_keywords);
        fill(&mut self.top_image, other.top_image);
        fill(&mut self.language, other.language);
    }
}

/// One way of pulling an article out of a page. The pipeline runs its
/// extractors in a fixed order; later ones only fill what earlier ones missed.
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// `draft` is everything found so far.
    fn extract(&self, page: &Page<'_>, draft: &Draft) -> Result<Draft, ExtractError>;
}

/// Final article for one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: Option<String>,
    /// Newlines and tabs removed.
    pub content: Option<String>,
    pub raw_content: String,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub images: Vec<String>,
    /// Extractors that contributed, in order.
    pub extracted_by: Vec<&'static str>,
}

impl ExtractedArticle {
    /// Neither title nor content: nothing worth exporting.
    pub fn is_void(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// `Some` only for non-blank text.
pub(crate) fn non_empty(text: impl Into<String>) -> Option<String> {
    let text = text.into();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn article(url: &str, title: Option<&str>, content: Option<&str>, raw: &str) -> ExtractedArticle {
        ExtractedArticle {
            url: url.to_string(),
            title: title.map(String::from),
            content: content.map(String::from),
            raw_content: raw.to_string(),
            meta_description: Some("A short summary".into()),
            meta_keywords: Some("news, test".into()),
            images: vec!["https://cdn.example.test/1.jpg".into()],
            extracted_by: vec!["structured"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_missing_keeps_existing_fields() {
        let mut draft = Draft {
            title: Some("Kept".into()),
            ..Default::default()
        };
        draft.fill_missing(Draft {
            title: Some("Ignored".into()),
            content: Some("Body".into()),
            ..Default::default()
        });
        assert_eq!(draft.title.as_deref(), Some("Kept"));
        assert_eq!(draft.content.as_deref(), Some("Body"));
        assert!(draft.is_complete());
    }

    #[test]
    fn void_means_no_title_and_no_content() {
        let a = testing::article("https://a.test", None, None, "<html></html>");
        assert!(a.is_void());
        let b = testing::article("https://a.test", Some("T"), None, "<html></html>");
        assert!(!b.is_void());
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(non_empty("  \n"), None);
        assert_eq!(non_empty("x"), Some("x".to_string()));
    }
}

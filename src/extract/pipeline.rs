use std::sync::Arc;

use dom_query::Document;
use tracing::{debug, warn};
use url::Url;

use super::{BoilerplateExtractor, Draft, ExtractedArticle, Page, StructuredExtractor, TextExtractor};
use crate::fetch::FetchResult;
use crate::images;
use crate::language::LanguageResolver;

/// Runs extractors in order until title and content are both known, then
/// expands the representative image into the page's gallery.
pub struct Pipeline {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl Pipeline {
    /// Structured extraction first, boilerplate removal as the fallback.
    pub fn new(languages: Arc<LanguageResolver>) -> Self {
        Self::with_extractors(vec![
            Box::new(StructuredExtractor),
            Box::new(BoilerplateExtractor::new(languages)),
        ])
    }

    pub fn with_extractors(extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        Self { extractors }
    }

    pub fn extract(&self, fetched: &FetchResult) -> ExtractedArticle {
        let html = fetched.text();
        let page = Page {
            url: &fetched.url,
            html: &html,
            headers: &fetched.headers,
        };

        let mut draft = Draft::default();
        let mut extracted_by = Vec::new();
        for extractor in &self.extractors {
            if draft.is_complete() {
                debug!(url = page.url, skipped = extractor.name(), "title and content already found");
                break;
            }
            match extractor.extract(&page, &draft) {
                Ok(found) => {
                    extracted_by.push(extractor.name());
                    draft.fill_missing(found);
                }
                Err(e) => warn!(url = page.url, extractor = extractor.name(), error = %e, "extractor failed"),
            }
        }

        let images = match draft.top_image.as_deref() {
            Some(src) => {
                let doc = Document::from(html.as_str());
                let base = Url::parse(&fetched.url).ok();
                images::aggregate(&doc, src, base.as_ref())
            }
            None => Vec::new(),
        };

        ExtractedArticle {
            url: fetched.url.clone(),
            title: draft.title,
            content: draft.content,
            raw_content: html,
            meta_description: draft.meta_description,
            meta_keywords: draft.meta_keywords,
            images,
            extracted_by,
        }
    }
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ArticleSink, ExportError, ExportOutcome};
use crate::extract::ExtractedArticle;
use crate::side_table::{load_or_default, write_atomic};

/// One JSON object keyed by article URL. The whole document is rewritten on
/// every export; an unreadable document starts over empty.
pub struct JsonDocument {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentEntry {
    pub title: Option<String>,
    pub content: Option<String>,
    pub raw_content: String,
    pub url: String,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub images: Vec<String>,
}

impl From<&ExtractedArticle> for DocumentEntry {
    fn from(a: &ExtractedArticle) -> Self {
        Self {
            title: a.title.clone(),
            content: a.content.clone(),
            raw_content: a.raw_content.clone(),
            url: a.url.clone(),
            meta_keywords: a.meta_keywords.clone(),
            meta_description: a.meta_description.clone(),
            images: a.images.clone(),
        }
    }
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn entries(&self) -> Result<BTreeMap<String, DocumentEntry>, ExportError> {
        Ok(load_or_default(&self.path)?)
    }
}

impl ArticleSink for JsonDocument {
    fn write(&mut self, article: &ExtractedArticle) -> Result<ExportOutcome, ExportError> {
        let mut doc = self.entries()?;
        doc.insert(article.url.clone(), DocumentEntry::from(article));
        write_atomic(&self.path, &doc)?;
        Ok(ExportOutcome::Written)
    }
}

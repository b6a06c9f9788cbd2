pub mod json;
pub mod sql;

use clap::ValueEnum;
use thiserror::Error;

use crate::extract::ExtractedArticle;
use crate::side_table::SideTableError;

pub use json::JsonDocument;
pub use sql::SqlStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Sql,
    Json,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error(transparent)]
    Document(#[from] SideTableError),
    #[error("could not encode images: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Void article, nothing written.
    Skipped,
    /// New or changed record written.
    Written,
    /// Stored raw content already matches.
    Unchanged,
}

/// Destination for extracted articles, keyed by URL.
pub trait ArticleSink {
    fn write(&mut self, article: &ExtractedArticle) -> Result<ExportOutcome, ExportError>;

    /// Void articles are never written.
    fn export(&mut self, article: &ExtractedArticle) -> Result<ExportOutcome, ExportError> {
        if article.is_void() {
            return Ok(ExportOutcome::Skipped);
        }
        self.write(article)
    }
}

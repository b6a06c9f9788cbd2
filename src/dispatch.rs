use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fetch::FetchResult;
use crate::side_table::{self, SideTableError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Pdf,
    /// Anything else, with the raw header value.
    Unknown(String),
}

pub fn classify(result: &FetchResult) -> ContentKind {
    classify_content_type(&result.content_type)
}

pub fn classify_content_type(content_type: &str) -> ContentKind {
    if content_type.contains("text/html") {
        ContentKind::Html
    } else if content_type == "application/pdf" {
        ContentKind::Pdf
    } else {
        ContentKind::Unknown(content_type.to_string())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ContentTypes {
    #[serde(default)]
    content_types: Vec<String>,
}

/// Append-only record of content types the crawler could not process.
pub struct UnknownContentTypeLog {
    path: PathBuf,
}

impl UnknownContentTypeLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one occurrence. Empty values are not recorded.
    pub fn record(&self, content_type: &str) -> Result<(), SideTableError> {
        if content_type.is_empty() {
            warn!("response carried no Content-Type header, nothing to record");
            return Ok(());
        }
        let mut log: ContentTypes = side_table::load_or_default(&self.path)?;
        log.content_types.push(content_type.to_string());
        side_table::write_atomic(&self.path, &log)?;
        info!(content_type, total = log.content_types.len(), "recorded unknown content type");
        Ok(())
    }

    #[cfg(test)]
    pub fn entries(&self) -> Result<Vec<String>, SideTableError> {
        let log: ContentTypes = side_table::load_or_default(&self.path)?;
        Ok(log.content_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_header() {
        assert_eq!(classify_content_type("text/html; charset=utf-8"), ContentKind::Html);
        assert_eq!(classify_content_type("text/html"), ContentKind::Html);
        assert_eq!(classify_content_type("application/pdf"), ContentKind::Pdf);
        assert_eq!(
            classify_content_type("application/pdf; qs=0.001"),
            ContentKind::Unknown("application/pdf; qs=0.001".into())
        );
        assert_eq!(
            classify_content_type("application/octet-stream"),
            ContentKind::Unknown("application/octet-stream".into())
        );
    }

    #[test]
    fn each_occurrence_is_appended_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let log = UnknownContentTypeLog::new(tmp.path().join("textures/unknown-content-types.json"));

        log.record("application/octet-stream").unwrap();
        assert_eq!(log.entries().unwrap(), vec!["application/octet-stream"]);

        log.record("application/octet-stream").unwrap();
        log.record("image/png").unwrap();
        assert_eq!(
            log.entries().unwrap(),
            vec!["application/octet-stream", "application/octet-stream", "image/png"]
        );
    }

    #[test]
    fn corrupt_or_keyless_log_is_started_over() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("unknown-content-types.json");

        std::fs::write(&path, "{\"content_types\": [").unwrap();
        let log = UnknownContentTypeLog::new(path.clone());
        log.record("video/mp4").unwrap();
        assert_eq!(log.entries().unwrap(), vec!["video/mp4"]);

        std::fs::write(&path, "{\"other\": 1}").unwrap();
        log.record("audio/ogg").unwrap();
        assert_eq!(log.entries().unwrap(), vec!["audio/ogg"]);
    }

    #[test]
    fn missing_header_is_not_recorded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("unknown-content-types.json");
        let log = UnknownContentTypeLog::new(path.clone());
        log.record("").unwrap();
        assert!(!path.exists());
    }
}

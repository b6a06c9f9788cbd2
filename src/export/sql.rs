use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use super::{ArticleSink, ExportError, ExportOutcome};
use crate::extract::ExtractedArticle;

/// SQLite-backed article store. Opening a store does not touch the schema;
/// call [`SqlStore::init_schema`] once before writing.
pub struct SqlStore {
    conn: Connection,
}

impl SqlStore {
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(crate::side_table::SideTableError::from)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, ExportError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn init_schema(&self) -> Result<(), ExportError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS article (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                url              TEXT UNIQUE NOT NULL,
                title            TEXT,
                content          TEXT,
                raw_content      TEXT,
                images           TEXT,
                meta_keywords    TEXT,
                meta_description TEXT
            );
            ",
        )?;
        Ok(())
    }

    /// Insert, or overwrite every field when the stored raw content differs.
    pub fn upsert(&self, article: &ExtractedArticle) -> Result<ExportOutcome, ExportError> {
        let images = serde_json::to_string(&article.images)?;
        let changed = self.conn.execute(
            "INSERT INTO article (url, title, content, raw_content, images, meta_keywords, meta_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url) DO UPDATE SET
                 title = excluded.title,
                 content = excluded.content,
                 raw_content = excluded.raw_content,
                 images = excluded.images,
                 meta_keywords = excluded.meta_keywords,
                 meta_description = excluded.meta_description
             WHERE article.raw_content IS NOT excluded.raw_content",
            params![
                article.url,
                article.title,
                article.content,
                article.raw_content,
                images,
                article.meta_keywords,
                article.meta_description,
            ],
        )?;

        debug!(url = %article.url, changed, "article upserted");
        Ok(if changed == 0 {
            ExportOutcome::Unchanged
        } else {
            ExportOutcome::Written
        })
    }

    #[cfg(test)]
    pub fn find(&self, url: &str) -> Result<Option<StoredArticle>, ExportError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, content, raw_content, images, meta_keywords, meta_description
             FROM article WHERE url = ?1",
        )?;
        let mut rows = stmt.query_map(params![url], |row| {
            Ok(StoredArticle {
                id: row.get(0)?,
                url: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                raw_content: row.get(4)?,
                images: row.get(5)?,
                meta_keywords: row.get(6)?,
                meta_description: row.get(7)?,
            })
        })?;
        Ok(rows.next().transpose()?)
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<i64, ExportError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM article", [], |row| row.get(0))?)
    }
}

impl ArticleSink for SqlStore {
    fn write(&mut self, article: &ExtractedArticle) -> Result<ExportOutcome, ExportError> {
        self.upsert(article)
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArticle {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub raw_content: Option<String>,
    /// JSON array of image URLs.
    pub images: Option<String>,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::testing::article;

    fn store() -> SqlStore {
        let store = SqlStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn same_article_twice_writes_once() {
        let mut store = store();
        let a = article("https://a.test", Some("Title"), Some("Body"), "<html>v1</html>");

        assert_eq!(store.export(&a).unwrap(), ExportOutcome::Written);
        assert_eq!(store.export(&a).unwrap(), ExportOutcome::Unchanged);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn changed_raw_content_updates_all_fields() {
        let mut store = store();
        store
            .export(&article("https://a.test", Some("Old"), Some("Old body"), "<html>v1</html>"))
            .unwrap();
        let before = store.find("https://a.test").unwrap().unwrap();

        let mut updated = article("https://a.test", Some("New"), Some("New body"), "<html>v2</html>");
        updated.images = vec!["https://cdn.example.test/2.jpg".into(), "https://cdn.example.test/3.jpg".into()];
        updated.meta_keywords = None;
        assert_eq!(store.export(&updated).unwrap(), ExportOutcome::Written);

        let after = store.find("https://a.test").unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.title.as_deref(), Some("New"));
        assert_eq!(after.content.as_deref(), Some("New body"));
        assert_eq!(after.raw_content.as_deref(), Some("<html>v2</html>"));
        assert_eq!(
            after.images.as_deref(),
            Some(r#"["https://cdn.example.test/2.jpg","https://cdn.example.test/3.jpg"]"#)
        );
        assert_eq!(after.meta_keywords, None);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn matching_raw_content_leaves_record_untouched() {
        let mut store = store();
        store
            .export(&article("https://a.test", Some("Original"), Some("Body"), "<html>same</html>"))
            .unwrap();
        let before = store.find("https://a.test").unwrap().unwrap();

        let retitled = article("https://a.test", Some("Different title"), Some("Other"), "<html>same</html>");
        assert_eq!(store.export(&retitled).unwrap(), ExportOutcome::Unchanged);
        assert_eq!(store.find("https://a.test").unwrap().unwrap(), before);
    }

    #[test]
    fn void_article_is_skipped() {
        let mut store = store();
        let void = article("https://void.test", None, None, "<html></html>");
        assert_eq!(store.export(&void).unwrap(), ExportOutcome::Skipped);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn schema_setup_is_repeatable_on_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("db.sqlite3");
        {
            let mut store = SqlStore::open(&path).unwrap();
            store.init_schema().unwrap();
            store
                .export(&article("https://b.test", Some("T"), None, "raw"))
                .unwrap();
        }
        let store = SqlStore::open(&path).unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.find("https://b.test").unwrap().unwrap().title.as_deref(), Some("T"));
    }
}

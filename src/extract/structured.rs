use dom_query::{Document, Selection};
use dom_smoothie::Readability;
use tracing::{debug, warn};

use super::{non_empty, Draft, ExtractError, Page, TextExtractor};

/// Readability-style extraction: title, main text, representative image and
/// page metadata in one pass.
#[derive(Debug, Default)]
pub struct StructuredExtractor;

impl TextExtractor for StructuredExtractor {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, page: &Page<'_>, _draft: &Draft) -> Result<Draft, ExtractError> {
        if page.html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let doc = Document::from(page.html);
        let meta = PageMeta::read(&doc);

        let parsed = Readability::new(page.html, Some(page.url), None).and_then(|mut r| r.parse());
        let article = match parsed {
            Ok(article) => article,
            Err(e) => {
                // no article body, but the page metadata still counts
                warn!(url = page.url, error = %e, "readability found no article, keeping page metadata");
                return Ok(Draft {
                    title: meta.title,
                    content: None,
                    meta_description: meta.description,
                    meta_keywords: meta.keywords,
                    top_image: meta.image,
                    language: meta.language,
                });
            }
        };

        let content = non_empty(strip_layout(&article.text_content));
        debug!(
            url = page.url,
            has_title = !article.title.trim().is_empty(),
            content_chars = content.as_deref().map_or(0, |c| c.chars().count()),
            "structured extraction done"
        );

        Ok(Draft {
            title: non_empty(article.title.trim()).or(meta.title),
            content,
            meta_description: meta.description,
            meta_keywords: meta.keywords,
            top_image: article.image.and_then(non_empty).or(meta.image),
            language: meta.language.or_else(|| article.lang.and_then(non_empty)),
        })
    }
}

/// Newlines and tabs are dropped, not replaced.
fn strip_layout(text: &str) -> String {
    text.replace(['\n', '\t'], "").trim().to_string()
}

#[derive(Debug, Default)]
struct PageMeta {
    title: Option<String>,
    image: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    language: Option<String>,
}

impl PageMeta {
    fn read(doc: &Document) -> Self {
        let mut meta = PageMeta::default();
        let mut og_description = None;
        let mut http_language = None;

        for node in doc.select("meta").nodes() {
            let tag = Selection::from(*node);
            let Some(content) = tag.attr("content").and_then(|c| non_empty(c.trim())) else {
                continue;
            };
            let key = tag
                .attr("name")
                .or_else(|| tag.attr("property"))
                .map(|k| k.to_lowercase())
                .unwrap_or_default();
            let http_equiv = tag.attr("http-equiv").map(|k| k.to_lowercase()).unwrap_or_default();

            match key.as_str() {
                "description" if meta.description.is_none() => meta.description = Some(content),
                "og:description" if og_description.is_none() => og_description = Some(content),
                "keywords" if meta.keywords.is_none() => meta.keywords = Some(content),
                "og:image" if meta.image.is_none() => meta.image = Some(content),
                _ if http_equiv == "content-language" && http_language.is_none() => {
                    http_language = Some(content)
                }
                _ => {}
            }
        }

        meta.description = meta.description.or(og_description);
        meta.title = non_empty(doc.select("title").text().trim());
        meta.language = doc
            .select("html")
            .attr("lang")
            .and_then(|l| non_empty(l.trim()))
            .or(http_language);
        meta
    }
}

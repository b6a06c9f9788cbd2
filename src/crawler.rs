use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::dispatch::{self, ContentKind, UnknownContentTypeLog};
use crate::export::{ArticleSink, ExportOutcome};
use crate::extract::{ExtractedArticle, Pipeline};
use crate::fetch::{self, Fetcher};
use crate::settings::Settings;

/// What happened to one URL. Produced by worker tasks, consumed by the writer.
#[derive(Debug)]
pub enum CrawlOutcome {
    Article(ExtractedArticle),
    Unreachable { url: String, reason: String },
    UnknownContentType { url: String, content_type: String },
    Pdf { url: String },
    /// The extraction task died.
    Failed { url: String, reason: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub total: usize,
    pub written: usize,
    pub unchanged: usize,
    pub void: usize,
    pub unreachable: usize,
    pub unknown_content_type: usize,
    pub pdf: usize,
    pub failed: usize,
}

impl CrawlStats {
    pub fn skipped(&self) -> usize {
        self.total - self.written - self.unchanged
    }
}

pub struct Crawler {
    fetcher: Arc<Fetcher>,
    pipeline: Arc<Pipeline>,
    concurrency: usize,
    deadline: Duration,
}

impl Crawler {
    pub fn new(settings: &Settings, fetcher: Arc<Fetcher>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            fetcher,
            pipeline,
            concurrency: settings.concurrency.max(1),
            deadline: settings.url_deadline(),
        }
    }

    /// Crawl every URL concurrently. Workers only fetch and extract; this
    /// loop is the only place that writes to the sink or the unknown
    /// content-type log.
    ///
    /// All URLs are validated up front: one invalid URL aborts the run
    /// before any request is made.
    pub async fn run(
        &self,
        urls: &[String],
        sink: &mut dyn ArticleSink,
        unknown_log: &UnknownContentTypeLog,
    ) -> Result<CrawlStats> {
        for url in urls {
            fetch::validate_url(url)?;
        }

        let total = urls.len();
        let pb = if total > 1 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel::<CrawlOutcome>(self.concurrency * 2);

        for url in urls.iter().cloned() {
            let fetcher = Arc::clone(&self.fetcher);
            let pipeline = Arc::clone(&self.pipeline);
            let sem = Arc::clone(&semaphore);
            let tx = tx.clone();
            let deadline = self.deadline;

            tokio::spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return;
                };
                let outcome = match tokio::time::timeout(deadline, crawl_one(&fetcher, pipeline, url.clone())).await {
                    Ok(outcome) => outcome,
                    Err(_) => CrawlOutcome::Unreachable {
                        reason: format!("no result within {}s", deadline.as_secs()),
                        url,
                    },
                };
                let _ = tx.send(outcome).await;
            });
        }

        // rx closes once every worker has sent and dropped its sender
        drop(tx);

        let mut stats = CrawlStats {
            total,
            ..Default::default()
        };

        while let Some(outcome) = rx.recv().await {
            match outcome {
                CrawlOutcome::Article(article) => match sink.export(&article) {
                    Ok(ExportOutcome::Written) => {
                        stats.written += 1;
                        info!(url = %article.url, extracted_by = ?article.extracted_by, images = article.images.len(), "article saved");
                    }
                    Ok(ExportOutcome::Unchanged) => {
                        stats.unchanged += 1;
                        info!(url = %article.url, "article unchanged since last crawl");
                    }
                    Ok(ExportOutcome::Skipped) => {
                        stats.void += 1;
                        info!(url = %article.url, "no title or content found, nothing saved");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!(url = %article.url, error = %e, "could not save article");
                    }
                },
                CrawlOutcome::Unreachable { url, reason } => {
                    stats.unreachable += 1;
                    info!(%url, %reason, "unreachable");
                }
                CrawlOutcome::UnknownContentType { url, content_type } => {
                    stats.unknown_content_type += 1;
                    info!(%url, %content_type, "unsupported content type");
                    if let Err(e) = unknown_log.record(&content_type) {
                        warn!(%url, error = %e, "could not record unknown content type");
                    }
                }
                CrawlOutcome::Pdf { url } => {
                    stats.pdf += 1;
                    info!(%url, "PDF rendering is not supported");
                }
                CrawlOutcome::Failed { url, reason } => {
                    stats.failed += 1;
                    warn!(%url, %reason, "extraction task failed");
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            "Crawled {} URLs ({} saved, {} unchanged, {} skipped)",
            stats.total,
            stats.written,
            stats.unchanged,
            stats.skipped()
        );
        Ok(stats)
    }
}

async fn crawl_one(fetcher: &Fetcher, pipeline: Arc<Pipeline>, url: String) -> CrawlOutcome {
    let fetched = match fetcher.fetch(&url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            return CrawlOutcome::Unreachable {
                url,
                reason: e.to_string(),
            }
        }
    };

    if !fetched.status_reachable {
        return CrawlOutcome::Unreachable {
            url,
            reason: format!("server answered {}", fetched.status),
        };
    }

    match dispatch::classify(&fetched) {
        ContentKind::Html => match tokio::task::spawn_blocking(move || pipeline.extract(&fetched)).await {
            Ok(article) => CrawlOutcome::Article(article),
            Err(e) => CrawlOutcome::Failed {
                url,
                reason: e.to_string(),
            },
        },
        ContentKind::Pdf => CrawlOutcome::Pdf { url },
        ContentKind::Unknown(content_type) => CrawlOutcome::UnknownContentType { url, content_type },
    }
}

// ── Tests ──

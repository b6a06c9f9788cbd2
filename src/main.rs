mod boilerplate;
mod crawler;
mod dispatch;
mod export;
mod extract;
mod fetch;
mod images;
mod language;
mod settings;
mod side_table;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use crate::crawler::Crawler;
use crate::dispatch::UnknownContentTypeLog;
use crate::export::{ArticleSink, ExportTarget, JsonDocument, SqlStore};
use crate::extract::Pipeline;
use crate::fetch::Fetcher;
use crate::language::LanguageResolver;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "article_crawler", about = "Fetch news articles and store their text and images")]
struct Cli {
    /// Article URLs (http:// or https://)
    #[arg(required = true)]
    urls: Vec<String>,

    /// Where extracted articles go
    #[arg(long, value_enum, default_value_t = ExportTarget::Sql)]
    export: ExportTarget,

    /// Directory for db.sqlite3, article.json and textures/
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Settings file (default: article_crawler.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of URLs crawled at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(workdir) = cli.workdir {
        settings.workdir = workdir;
    }
    if let Some(n) = cli.concurrency {
        settings.concurrency = n;
    }

    let mut sink: Box<dyn ArticleSink> = match cli.export {
        ExportTarget::Sql => {
            let path = settings.db_path();
            let store = SqlStore::open(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            store.init_schema()?;
            Box::new(store)
        }
        ExportTarget::Json => Box::new(JsonDocument::new(settings.document_path())),
    };

    let fetcher = Arc::new(Fetcher::new(&settings)?);
    let languages = Arc::new(LanguageResolver::new(
        settings.language_codes_path(),
        settings.default_language.clone(),
    ));
    let pipeline = Arc::new(Pipeline::new(languages));
    let unknown_log = UnknownContentTypeLog::new(settings.unknown_content_types_path());

    let crawler = Crawler::new(&settings, fetcher, pipeline);
    let stats = crawler.run(&cli.urls, sink.as_mut(), &unknown_log).await?;

    println!(
        "Done: {} URLs ({} saved, {} unchanged, {} skipped) in {:.1}s",
        stats.total,
        stats.written,
        stats.unchanged,
        stats.skipped(),
        t0.elapsed().as_secs_f64()
    );
    if stats.skipped() > 0 {
        println!(
            "Skipped: {} unreachable, {} unsupported type, {} PDF, {} without text, {} failed",
            stats.unreachable, stats.unknown_content_type, stats.pdf, stats.void, stats.failed
        );
    }
    Ok(())
}

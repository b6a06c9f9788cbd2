use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::settings::Settings;

/// Server errors worth another attempt.
const RETRY_STATUSES: [StatusCode; 2] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::SERVICE_UNAVAILABLE,
];

#[derive(Debug, Error)]
pub enum FetchError {
    /// Missing or unsupported scheme, or unparsable URL. Fatal for the run.
    #[error("invalid URL {url:?}: make sure it starts with http:// or https://")]
    InvalidUrl { url: String },
    /// Connection error, timeout, or persistent 500/503 after all retries.
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// One fetched response. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub status: u16,
    /// 2xx or 3xx.
    pub status_reachable: bool,
    /// Raw `Content-Type` header; empty when the server sent none.
    pub content_type: String,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Body decoded with the charset named in the content type, UTF-8 otherwise.
    pub fn text(&self) -> String {
        let encoding = charset(&self.content_type)
            .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
            .unwrap_or(encoding_rs::UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }
}

fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Reject anything that is not an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl {
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Longest single wait between attempts, whatever the retry count.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

enum Attempt {
    Done(FetchResult),
    ServerError(StatusCode),
}

pub struct Fetcher {
    client: reqwest::Client,
    retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            retries: settings.retries,
            backoff: settings.backoff_base(),
        })
    }

    /// GET `url`, retrying 500/503 and transport failures with exponential backoff.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let parsed = validate_url(url)?;

        let mut attempt = 0u32;
        loop {
            let failure = match self.attempt(url, &parsed).await {
                Ok(Attempt::Done(result)) => return Ok(result),
                Ok(Attempt::ServerError(status)) => format!("server answered {}", status),
                Err(e) => e.to_string(),
            };

            if attempt >= self.retries {
                return Err(FetchError::Unreachable {
                    url: url.to_string(),
                    reason: failure,
                });
            }

            let backoff = self.backoff_delay(attempt);
            warn!(
                "Fetching {} failed ({}), attempt {}/{}, backing off {:.1}s",
                url,
                failure,
                attempt + 1,
                self.retries,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// `backoff * 2^attempt`, capped at [`MAX_BACKOFF`].
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    async fn attempt(&self, url: &str, parsed: &Url) -> Result<Attempt, reqwest::Error> {
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if RETRY_STATUSES.contains(&status) {
            return Ok(Attempt::ServerError(status));
        }

        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let content_type = headers.get("content-type").cloned().unwrap_or_default();
        let body = response.bytes().await?.to_vec();

        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(Attempt::Done(FetchResult {
            url: url.to_string(),
            status: status.as_u16(),
            status_reachable: status.is_success() || status.is_redirection(),
            content_type,
            headers,
            body,
        }))
    }
}

use std::thread;

use anyhow::Result;
use log::warn;
use reqwest::blocking::Client;

use crate::config::Config;
use crate::errors::FetchError;
use crate::http_client::http_client;
use crate::retry::RetryPolicy;
use crate::teams::SeasonKey;

/// Anything that can return the body at a URL. The HTTP implementation is used in
/// production; tests script responses in memory.
pub trait DocumentSource: Sync {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpSource {
    client: &'static Client,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }
}

impl DocumentSource for HttpSource {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| classify(url, err))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(|err| classify(url, err))
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonUrls {
    pub overview: String,
    pub advanced: String,
}

impl SeasonUrls {
    pub fn new(base_url: &str, key: SeasonKey) -> Self {
        let base = base_url.trim_end_matches('/');
        let code = key.team.as_str();
        let year = key.year;
        Self {
            overview: format!("{base}/teams/{code}/{year}.htm"),
            advanced: format!("{base}/teams/{code}/{year}_advanced.htm"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeasonDocuments {
    pub overview: String,
    pub advanced: String,
}

#[derive(Debug, Clone)]
pub struct FetchedSeason {
    pub documents: SeasonDocuments,
    /// Number of whole-season restarts caused by timeouts.
    pub retries: u32,
}

/// Fetch both documents for a team-season.
///
/// A timeout on either request restarts the whole season fetch, as long as the
/// policy allows. Any other failure is returned immediately.
pub fn fetch_season<S: DocumentSource + ?Sized>(
    source: &S,
    base_url: &str,
    key: SeasonKey,
    policy: &RetryPolicy,
) -> Result<FetchedSeason, FetchError> {
    let urls = SeasonUrls::new(base_url, key);
    let mut failed_attempts = 0u32;
    loop {
        match fetch_once(source, &urls) {
            Ok(documents) => {
                return Ok(FetchedSeason {
                    documents,
                    retries: failed_attempts,
                });
            }
            Err(err) if err.is_timeout() => {
                failed_attempts = failed_attempts.saturating_add(1);
                if !policy.should_retry(failed_attempts) {
                    return Err(FetchError::RetriesExhausted {
                        attempts: failed_attempts,
                    });
                }
                warn!("Timeout getting stats for {key} (attempt {failed_attempts}): {err}. Retrying.");
                let delay = policy.backoff(failed_attempts);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            Err(err) => return Err(err),
        }
    }
}

fn fetch_once<S: DocumentSource + ?Sized>(
    source: &S,
    urls: &SeasonUrls,
) -> Result<SeasonDocuments, FetchError> {
    let advanced = source.get(&urls.advanced)?;
    let overview = source.get(&urls.overview)?;
    Ok(SeasonDocuments { overview, advanced })
}

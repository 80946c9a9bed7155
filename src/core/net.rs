// src/core/net.rs
//! Page fetching.
//!
//! The cycle only needs "markup or failure" per page, expressed by [`Fetcher`].
//! [`HttpFetcher`] is the real one: blocking `reqwest` GET against the
//! controller's schematic pages with HTTP Basic credentials, a per-request
//! timeout and a bounded, capped exponential retry. Closures implement
//! `Fetcher` too, which is what the tests use.

use std::{fs, path::PathBuf, thread, time::Duration};

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::consts::{
    BACKOFF_CAP_SECS, DEBUG_HTML_PREFIX, FETCH_ATTEMPTS, FETCH_TIMEOUT_SECS, SCHEMATIC_DIR, USER_AGENT,
};
use crate::error::FetchError;
use super::sanitize::decode_latin1_fallback;

/// Source of raw page markup, indexed by zero-based page number.
pub trait Fetcher: Sync {
    fn fetch(&self, page: usize) -> Result<String, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(usize) -> Result<String, FetchError> + Sync,
{
    fn fetch(&self, page: usize) -> Result<String, FetchError> {
        self(page)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
    pub backoff_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: FETCH_ATTEMPTS,
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            backoff_cap: Duration::from_secs(BACKOFF_CAP_SECS),
        }
    }
}

impl RetryPolicy {
    /// Pause after failed attempt `attempt` (1-based): 2^attempt seconds, capped.
    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = 2u64.saturating_pow(attempt);
        Duration::from_secs(secs).min(self.backoff_cap)
    }
}

/// Network errors, timeouts, 5xx and 429 are worth another try.
/// Other statuses (401 for bad credentials, 404 for a missing page) are not.
fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Http { .. } => true,
        FetchError::Status { status, .. } => {
            *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
        }
        FetchError::Exhausted { .. } | FetchError::Other(_) => false,
    }
}

/// `http://{host}/schematic_files/{page+1}.cgi`
pub fn page_url(host: &str, page: usize) -> String {
    format!("http://{}/{}/{}.cgi", host, SCHEMATIC_DIR, page + 1)
}

pub struct HttpFetcher {
    client: Client,
    host: String,
    user: String,
    password: String,
    policy: RetryPolicy,
    dump_dir: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new(host: &str, user: &str, password: &str, policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Http { url: s!(host), source })?;

        Ok(Self {
            client,
            host: s!(host),
            user: s!(user),
            password: s!(password),
            policy,
            dump_dir: None,
        })
    }

    /// Keep a copy of every fetched page under `dir` for offline inspection.
    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir;
        self
    }

    fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .map_err(|source| FetchError::Http { url: s!(url), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: s!(url), status: status.as_u16() });
        }

        let body = resp
            .bytes()
            .map_err(|source| FetchError::Http { url: s!(url), source })?;
        Ok(decode_latin1_fallback(body.to_vec()))
    }

    fn get_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.get_once(url) {
                Ok(body) => {
                    log::info!("fetched {url}");
                    log::debug!("{url}: {} bytes", body.len());
                    return Ok(body);
                }
                Err(e) if !is_transient(&e) => return Err(e),
                Err(e) if attempt >= attempts => {
                    log::error!("giving up on {url} after {attempts} attempts: {e}");
                    return Err(FetchError::Exhausted { url: s!(url), attempts, last: Box::new(e) });
                }
                Err(e) => {
                    let wait = self.policy.delay(attempt);
                    log::debug!("{url}: attempt {attempt}/{attempts} failed ({e}); retrying in {}s", wait.as_secs());
                    thread::sleep(wait);
                    attempt += 1;
                }
            }
        }
    }

    fn dump(&self, page: usize, body: &str) {
        let Some(dir) = &self.dump_dir else { return };
        let path = dir.join(format!("{DEBUG_HTML_PREFIX}{page}.html"));
        let res = fs::create_dir_all(dir).and_then(|_| fs::write(&path, body));
        if let Err(e) = res {
            log::debug!("could not write debug copy {}: {e}", path.display());
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, page: usize) -> Result<String, FetchError> {
        let url = page_url(&self.host, page);
        log::debug!("handling {url}");
        let body = self.get_with_retry(&url)?;
        self.dump(page, &body);
        Ok(body)
    }
}

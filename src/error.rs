// src/error.rs
//! Error types, one per failure class.
//!
//! - `ConfigError`: the XML export is unusable; the whole cycle is skipped.
//! - `SchemaError` / `FetchError` (via `PageError`): one page fails, the cycle goes on.
//! - `SettingsError`: config.json / environment could not be turned into `Settings`.
//! - `PublishError`: writing results out failed.
//!
//! Value parsing has no error type: `separate` degrades to absent fields instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration export {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("configuration export is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("configuration export has no <Seiten> element")]
    MissingPages,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("page {0} is not defined in the configuration export")]
    MissingPage(usize),

    #[error("page {page}: object {object} is missing attribute `{attribute}`")]
    MissingAttribute {
        page: usize,
        object: String,
        attribute: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("unable to read settings file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("settings file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("environment variable {name} has invalid value {value:?}")]
    Env { name: &'static str, value: String },

    #[error("{0} must not be empty")]
    Missing(&'static str),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

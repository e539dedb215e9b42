use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Page doesn't contain the 'config-view' marker")]
    Extraction,
    #[error("Malformed provider data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown region {0:?}")]
    UnknownRegion(String),
    #[error("Dump folder {0} does not exist")]
    MissingDumpDir(PathBuf),
    #[error("File name {0:?} is not a pending-data timestamp")]
    BadTimestamp(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

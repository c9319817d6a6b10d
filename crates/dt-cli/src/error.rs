use dt_query::SearchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("API ERROR: {message}")]
    Api { message: String },
    #[error("No cached response and no transport available for {url}")]
    Offline { url: String },
    #[error("Unknown entity type '{0}', expected one of: app, srv, pg, host")]
    UnknownEntityType(String),
    #[error("Configuration element '{0}' not valid")]
    UnknownConfigOption(String),
    #[error("Invalid cacheupdate value '{0}', expected -1, 0 or a number of seconds")]
    InvalidCacheUpdate(String),
    #[error("Timeseries '{0}' not found")]
    UnknownTimeseries(String),
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

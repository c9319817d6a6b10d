use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{pattern} is NOT VALID regular expression: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid JSON document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

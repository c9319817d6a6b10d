//! Monitoring REST API client with key-search filtering.
//!
//! Provides the logic behind the `dtcli` binary:
//! - `config`     — explicit tenant configuration and its JSON file
//! - `cache`      — on-disk response cache with a freshness policy
//! - `api`        — endpoints, URLs, auth header and the cached client
//! - `timeseries` — `metric[aggregation%timeframe]` specs and data points
//! - `commands`   — `ent`, `ts`, `dql` built on [`dt_query`] searches

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod timeseries;

mod error;
pub use error::CliError;

use dt_query::Projection;
use serde_json::Value;

/// Render search results as one JSON array; missing-field markers become
/// `{"missingField": <return key>}` objects.
pub fn projections_to_json(results: &[Projection]) -> Value {
    Value::Array(
        results
            .iter()
            .map(|p| match p {
                Projection::MissingField(name) => serde_json::json!({ "missingField": name }),
                other => other.to_value().unwrap_or(Value::Null),
            })
            .collect(),
    )
}

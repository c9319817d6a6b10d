//! Command implementations shared by the `dtcli` binary.
//!
//! Each command fetches a response through [`ApiClient`] and narrows it with a
//! key search.

use dt_query::{find_values_by_key, MatchPattern, Projection};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::{ApiClient, EntityType, Transport, API_ENDPOINT_TIMESERIES};
use crate::error::CliError;
use crate::timeseries::{entity_measures, TimeseriesSpec};

pub const DEFAULT_MATCH_KEY: &str = "displayName";
pub const DEFAULT_ENTITY_RETURN_KEY: &str = "entityId";
pub const DEFAULT_TIMESERIES_RETURN_KEY: &str = "timeseriesId";

/// A `name=value` query argument; a bare `value` uses the default name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn parse(input: &str, default_name: &str) -> Self {
        match input.split_once('=') {
            Some((name, value)) => Self { name: name.to_string(), value: value.to_string() },
            None => Self { name: default_name.to_string(), value: input.to_string() },
        }
    }
}

fn search_response(
    content: &Value,
    query: Option<&str>,
    return_key: &str,
) -> Result<Vec<Projection>, CliError> {
    let results = match query {
        Some(query) => {
            let nv = NameValue::parse(query, DEFAULT_MATCH_KEY);
            find_values_by_key(content, &nv.name, Some(&nv.value), return_key)?
        }
        None => find_values_by_key(content, DEFAULT_MATCH_KEY, None, return_key)?,
    };
    Ok(results)
}

/// `ent <type> [query] [returnkey]`
pub fn entities<T: Transport>(
    client: &ApiClient<T>,
    entity_type: EntityType,
    query: Option<&str>,
    return_key: Option<&str>,
) -> Result<Vec<Projection>, CliError> {
    let content = client.query(entity_type.endpoint(), "")?;
    search_response(&content, query, return_key.unwrap_or(DEFAULT_ENTITY_RETURN_KEY))
}

/// `ts list [query] [returnkey]`
pub fn timeseries_list<T: Transport>(
    client: &ApiClient<T>,
    query: Option<&str>,
    return_key: Option<&str>,
) -> Result<Vec<Projection>, CliError> {
    let content = client.query(API_ENDPOINT_TIMESERIES, "")?;
    search_response(&content, query, return_key.unwrap_or(DEFAULT_TIMESERIES_RETURN_KEY))
}

/// `ts describe <timeseriesId>`
pub fn timeseries_describe<T: Transport>(client: &ApiClient<T>, timeseries_id: &str) -> Result<Value, CliError> {
    let content = client.query(API_ENDPOINT_TIMESERIES, "")?;
    content
        .as_array()
        .and_then(|list| {
            list.iter()
                .find(|ts| ts.get("timeseriesId").and_then(Value::as_str) == Some(timeseries_id))
        })
        .cloned()
        .ok_or_else(|| CliError::UnknownTimeseries(timeseries_id.to_string()))
}

/// `ts query <timeseriesId[aggregation%timeframe]> [entity,...]`
pub fn timeseries_query<T: Transport>(
    client: &ApiClient<T>,
    spec: &TimeseriesSpec,
    entities: Option<&[String]>,
) -> Result<Map<String, Value>, CliError> {
    let content = client.query(API_ENDPOINT_TIMESERIES, &spec.query_string())?;
    entity_measures(&content, &spec.timeseries_id, entities)
}

/// `dql <type> <entity query> <metric[aggr%time],...>`
///
/// `appmethod` has no entity endpoint; its entities are matched by display
/// name inside the timeseries responses instead.
pub fn dql<T: Transport>(
    client: &ApiClient<T>,
    entity_type: &str,
    entity_query: &str,
    metrics: &str,
) -> Result<Vec<Value>, CliError> {
    let specs: Vec<TimeseriesSpec> = metrics
        .split(',')
        .map(|metric| TimeseriesSpec::parse(metric).qualified())
        .collect();
    let mut results = Vec::new();

    if entity_type == "appmethod" {
        let pattern = MatchPattern::new(entity_query)?;
        for spec in &specs {
            for (entity, measure) in timeseries_query(client, spec, None)? {
                let name = measure.get("entityDisplayName").and_then(Value::as_str).unwrap_or("");
                if pattern.is_match(name) {
                    let mut entry = Map::new();
                    entry.insert(entity, measure);
                    results.push(Value::Object(entry));
                }
            }
        }
        return Ok(results);
    }

    let entity_type: EntityType = entity_type.parse()?;
    let found = entities(client, entity_type, Some(entity_query), None)?;
    if found.is_empty() {
        info!(query = entity_query, "no entities returned for that query");
    }
    for projection in &found {
        let Some(entity_id) = projection.as_str() else {
            debug!(?projection, "skipping result without entity id");
            continue;
        };
        let only = [entity_id.to_string()];
        for spec in &specs {
            results.push(Value::Object(timeseries_query(client, spec, Some(&only))?));
        }
    }
    Ok(results)
}

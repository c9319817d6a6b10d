//! REST endpoints and the cached API client.
//!
//! The HTTP transport itself is pluggable through [`Transport`]; the client
//! owns URL construction, authentication headers and the response cache.

use std::str::FromStr;
use std::time::SystemTime;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::CliError;

pub const API_ENDPOINT_APPLICATIONS: &str = "/api/v1/entity/applications";
pub const API_ENDPOINT_SERVICES: &str = "/api/v1/entity/services";
pub const API_ENDPOINT_PROCESS_GROUPS: &str = "/api/v1/entity/infrastructure/process-groups";
pub const API_ENDPOINT_HOSTS: &str = "/api/v1/entity/infrastructure/hosts";
pub const API_ENDPOINT_TIMESERIES: &str = "/api/v1/timeseries";

/// Queryable entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    App,
    Srv,
    Pg,
    Host,
}

impl EntityType {
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityType::App => API_ENDPOINT_APPLICATIONS,
            EntityType::Srv => API_ENDPOINT_SERVICES,
            EntityType::Pg => API_ENDPOINT_PROCESS_GROUPS,
            EntityType::Host => API_ENDPOINT_HOSTS,
        }
    }
}

impl FromStr for EntityType {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(EntityType::App),
            "srv" => Ok(EntityType::Srv),
            "pg" => Ok(EntityType::Pg),
            "host" => Ok(EntityType::Host),
            other => Err(CliError::UnknownEntityType(other.to_string())),
        }
    }
}

/// `https://<tenant><endpoint>[?<query>]`
pub fn request_url(config: &Config, endpoint: &str, query: &str) -> String {
    let mut url = format!("https://{}{}", config.tenanthost, endpoint);
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}

pub fn auth_header(config: &Config) -> (&'static str, String) {
    ("Authorization", format!("Api-Token {}", config.apitoken))
}

/// Raw HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub ok: bool,
    pub body: String,
}

/// Performs GET requests for the client.
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<Response, CliError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<Response, CliError> {
        (**self).get(url, headers)
    }
}

/// Transport for cache-only operation: every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn get(&self, url: &str, _headers: &[(&str, String)]) -> Result<Response, CliError> {
        Err(CliError::Offline { url: url.to_string() })
    }
}

pub struct ApiClient<T: Transport> {
    config: Config,
    cache: ResponseCache,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: Config, cache: ResponseCache, transport: T) -> Self {
        Self { config, cache, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// GET `endpoint` with `query`, serving from cache when allowed and caching fresh responses.
    pub fn query(&self, endpoint: &str, query: &str) -> Result<Value, CliError> {
        let path = self.cache.path_for(&self.config.tenanthost, endpoint, query);
        if let Some(content) = self.cache.read(&path, SystemTime::now())? {
            return Ok(content);
        }

        let url = request_url(&self.config, endpoint, query);
        debug!(url = %url, "requesting");
        let response = self.transport.get(&url, &[auth_header(&self.config)])?;
        if !response.ok {
            // Error bodies are not always JSON (gateway pages, empty 5xx).
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| body.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "API returned an error".to_string());
            warn!(url = %url, message = %message, "API error");
            return Err(CliError::Api { message });
        }

        let content: Value = serde_json::from_str(&response.body)?;
        self.cache.store(&path, &content)?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_round_trip() {
        assert_eq!("app".parse::<EntityType>().unwrap().endpoint(), API_ENDPOINT_APPLICATIONS);
        assert_eq!("host".parse::<EntityType>().unwrap(), EntityType::Host);
        assert!(matches!("db".parse::<EntityType>(), Err(CliError::UnknownEntityType(_))));
    }

    #[test]
    fn url_and_auth() {
        let config = Config::default().with_overrides(Some("abc.live.dynatrace.com"), Some("T0K"));
        assert_eq!(
            request_url(&config, API_ENDPOINT_TIMESERIES, "timeseriesId=x"),
            "https://abc.live.dynatrace.com/api/v1/timeseries?timeseriesId=x"
        );
        assert_eq!(
            request_url(&config, API_ENDPOINT_HOSTS, ""),
            "https://abc.live.dynatrace.com/api/v1/entity/infrastructure/hosts"
        );
        assert_eq!(auth_header(&config), ("Authorization", "Api-Token T0K".to_string()));
    }
}

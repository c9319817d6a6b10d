//! On-disk cache of API responses, one JSON file per endpoint and query.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::CachePolicy;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
    policy: CachePolicy,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self { root: root.into(), policy }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Cache file for a request:
    /// `<root>/<tenant>/<endpoint>.json`, or `<root>/<tenant>/<endpoint>/<query>.json`
    /// when a query string is present.
    pub fn path_for(&self, tenant_host: &str, endpoint: &str, query: &str) -> PathBuf {
        let mut path = self.root.join(tenant_host.replace('.', "_"));
        let endpoint = endpoint.replace('/', "_");
        if query.is_empty() {
            path.push(format!("{endpoint}.json"));
        } else {
            let decoded = urlencoding::decode(query)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| query.to_string());
            let file: String = decoded
                .chars()
                .map(|c| if matches!(c, '.' | ':' | '?' | '&' | '/') { '_' } else { c })
                .collect();
            path.push(endpoint);
            path.push(format!("{file}.json"));
        }
        path
    }

    /// Read a cached response if one exists and the policy allows serving it.
    pub fn read(&self, path: &Path, now: SystemTime) -> Result<Option<Value>, CliError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => {
                trace!(path = %path.display(), "cache miss");
                return Ok(None);
            }
        };
        if !is_fresh(self.policy, metadata.modified()?, now) {
            debug!(path = %path.display(), policy = ?self.policy, "cache entry stale");
            return Ok(None);
        }
        debug!(path = %path.display(), "cache hit");
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn store(&self, path: &Path, content: &Value) -> Result<(), CliError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string(content)?)?;
        debug!(path = %path.display(), "cached response");
        Ok(())
    }
}

/// Whether a file modified at `modified` may be served at `now`.
pub fn is_fresh(policy: CachePolicy, modified: SystemTime, now: SystemTime) -> bool {
    match policy {
        CachePolicy::CacheOnly => true,
        CachePolicy::AlwaysRefresh => false,
        CachePolicy::MaxAgeSecs(max_age) => {
            // A modification time in the future counts as brand new.
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            age < Duration::from_secs(max_age)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_without_query() {
        let cache = ResponseCache::new("/cache", CachePolicy::CacheOnly);
        assert_eq!(
            cache.path_for("abc.live.dynatrace.com", "/api/v1/entity/applications", ""),
            PathBuf::from("/cache/abc_live_dynatrace_com/_api_v1_entity_applications.json")
        );
    }

    #[test]
    fn path_with_query_is_decoded_and_sanitized() {
        let cache = ResponseCache::new("/cache", CachePolicy::CacheOnly);
        assert_eq!(
            cache.path_for(
                "smpljson",
                "/api/v1/timeseries",
                "timeseriesId=com.dynatrace.builtin%3Aapp.useractions&relativeTime=hour"
            ),
            PathBuf::from(
                "/cache/smpljson/_api_v1_timeseries/timeseriesId=com_dynatrace_builtin_app_useractions_relativeTime=hour.json"
            )
        );
    }

    #[test]
    fn freshness_by_policy() {
        let now = SystemTime::now();
        let old = now - Duration::from_secs(120);
        assert!(is_fresh(CachePolicy::CacheOnly, old, now));
        assert!(!is_fresh(CachePolicy::AlwaysRefresh, now, now));
        assert!(is_fresh(CachePolicy::MaxAgeSecs(300), old, now));
        assert!(!is_fresh(CachePolicy::MaxAgeSecs(60), old, now));
        assert!(is_fresh(CachePolicy::MaxAgeSecs(60), now + Duration::from_secs(5), now));
    }
}

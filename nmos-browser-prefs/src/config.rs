//! Per-request adapter configuration.

use nmos_browser_types::ApiFamily;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the adapter needs to know about the user's preferences, taken
/// as one snapshot at the start of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Scheme and authority the default API paths are appended to
    /// (e.g. `http://registry.local:8080`).
    pub origin: String,
    /// Per-family base URL overrides, used verbatim.
    #[serde(default)]
    pub api_urls: BTreeMap<ApiFamily, String>,
    /// Send list filters as RQL expressions rather than `key=value` pairs.
    pub rql: bool,
    /// Page size for paged listings; no paging parameters when unset.
    #[serde(default)]
    pub paging_limit: Option<u32>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost".to_string(),
            api_urls: BTreeMap::new(),
            rql: true,
            paging_limit: None,
        }
    }
}

impl AdapterConfig {
    /// Creates a configuration with defaults for the given origin.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: normalize_origin(origin.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, family: ApiFamily, url: impl Into<String>) -> Self {
        self.api_urls.insert(family, url.into());
        self
    }

    #[must_use]
    pub fn with_rql(mut self, rql: bool) -> Self {
        self.rql = rql;
        self
    }

    #[must_use]
    pub fn with_paging_limit(mut self, limit: Option<u32>) -> Self {
        self.paging_limit = limit;
        self
    }

    /// Default base URL for `family` under this origin.
    #[must_use]
    pub fn default_url(&self, family: ApiFamily) -> String {
        default_url(&self.origin, family)
    }
}

/// Default base URL for `family` under `origin`.
#[must_use]
pub(crate) fn default_url(origin: &str, family: ApiFamily) -> String {
    format!("{}{}", origin.trim_end_matches('/'), family.default_suffix())
}

pub(crate) fn normalize_origin(origin: String) -> String {
    if origin.ends_with('/') {
        origin.trim_end_matches('/').to_string()
    } else {
        origin
    }
}

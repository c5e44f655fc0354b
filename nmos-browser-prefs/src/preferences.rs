//! Typed preference accessor.

use crate::config::{default_url, normalize_origin, AdapterConfig};
use crate::error::PrefsResult;
use crate::keys::{PaginationMode, PreferenceKey};
use crate::store::PreferenceStore;
use nmos_browser_types::ApiFamily;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Label reported when no page size is stored.
pub const DEFAULT_PAGING_LABEL: &str = "Default";

/// How [`Preferences::change_api_url`] should treat the stored URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiUrlChange {
    /// Keep the stored URL, materializing the default if there is none.
    Current,
    /// Overwrite with the default.
    Reset,
    /// Overwrite with the given URL.
    Set(String),
}

/// Typed view over a [`PreferenceStore`].
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Raw value for `key`.
    pub fn get(&self, key: PreferenceKey) -> PrefsResult<Option<String>> {
        self.store.get(key.name())
    }

    /// Stores a raw value for `key`.
    pub fn set(&self, key: PreferenceKey, value: &str) -> PrefsResult<()> {
        debug!("Setting preference {} = {}", key, value);
        self.store.set(key.name(), value)
    }

    // ── API base URLs ────────────────────────────────────────────

    /// Stored base URL override for `family`.
    pub fn api_url(&self, family: ApiFamily) -> PrefsResult<Option<String>> {
        self.get(PreferenceKey::ApiUrl(family))
    }

    /// URL in effect for `family` under `origin`: the stored override, or
    /// the default. Never writes.
    pub fn effective_api_url(&self, family: ApiFamily, origin: &str) -> PrefsResult<String> {
        match self.api_url(family)? {
            Some(url) => Ok(url),
            None => Ok(default_url(origin, family)),
        }
    }

    /// Reads or replaces the base URL for `family`, returning the URL now in
    /// effect.
    pub fn change_api_url(
        &self,
        family: ApiFamily,
        change: ApiUrlChange,
        origin: &str,
    ) -> PrefsResult<String> {
        let key = PreferenceKey::ApiUrl(family);
        match change {
            ApiUrlChange::Current => {
                if let Some(url) = self.get(key)? {
                    return Ok(url);
                }
                let url = default_url(origin, family);
                info!("Materializing default {} URL: {}", family, url);
                self.set(key, &url)?;
                Ok(url)
            }
            ApiUrlChange::Reset => {
                let url = default_url(origin, family);
                info!("Resetting {} URL to {}", family, url);
                self.set(key, &url)?;
                Ok(url)
            }
            ApiUrlChange::Set(url) => {
                self.set(key, &url)?;
                Ok(url)
            }
        }
    }

    // ── Query mode ───────────────────────────────────────────────

    /// Whether filters are sent as RQL. Enabled unless explicitly `"false"`.
    pub fn rql_enabled(&self) -> PrefsResult<bool> {
        Ok(self.get(PreferenceKey::RqlMode)?.as_deref() != Some("false"))
    }

    pub fn set_rql_mode(&self, enabled: bool) -> PrefsResult<()> {
        self.set(PreferenceKey::RqlMode, if enabled { "true" } else { "false" })
    }

    // ── Paging ───────────────────────────────────────────────────

    /// Stored page size. Values that are not positive integers are ignored.
    pub fn paging_limit(&self) -> PrefsResult<Option<u32>> {
        let Some(raw) = self.get(PreferenceKey::PagingLimit)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => Ok(Some(limit)),
            _ => {
                warn!("Ignoring unusable paging limit {:?}", raw);
                Ok(None)
            }
        }
    }

    /// The stored page size as shown to the user, or `"Default"`.
    pub fn paging_limit_label(&self) -> PrefsResult<String> {
        Ok(self
            .get(PreferenceKey::PagingLimit)?
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PAGING_LABEL.to_string()))
    }

    pub fn set_paging_limit(&self, limit: u32) -> PrefsResult<()> {
        self.set(PreferenceKey::PagingLimit, &limit.to_string())
    }

    /// Pagination availability recorded from the last response.
    pub fn pagination(&self) -> PrefsResult<PaginationMode> {
        match self.get(PreferenceKey::Pagination)? {
            Some(raw) => Ok(raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown pagination mode {:?}", raw);
                PaginationMode::default()
            })),
            None => Ok(PaginationMode::default()),
        }
    }

    pub fn set_pagination(&self, mode: PaginationMode) -> PrefsResult<()> {
        self.set(PreferenceKey::Pagination, mode.as_str())
    }

    // ── Snapshot ─────────────────────────────────────────────────

    /// Reads every adapter-relevant preference into one [`AdapterConfig`].
    pub fn snapshot(&self, origin: &str) -> PrefsResult<AdapterConfig> {
        let mut config = AdapterConfig {
            origin: normalize_origin(origin.to_string()),
            rql: self.rql_enabled()?,
            paging_limit: self.paging_limit()?,
            ..Default::default()
        };
        for family in ApiFamily::ALL {
            if let Some(url) = self.api_url(family)? {
                config.api_urls.insert(family, url);
            }
        }
        Ok(config)
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

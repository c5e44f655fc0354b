//! Base URL resolution.

use nmos_browser_prefs::AdapterConfig;
use nmos_browser_types::{ApiFamily, ResourceFamily};

/// Base URL of `family`: the stored override verbatim, or the family's
/// default path under the configured origin.
#[must_use]
pub fn resolve(family: ApiFamily, config: &AdapterConfig) -> String {
    match config.api_urls.get(&family) {
        Some(url) => url.clone(),
        None => config.default_url(family),
    }
}

/// Like [`resolve`], for a family named by its preference name
/// (`"Query API"`, ...). Unknown names are not routable.
#[must_use]
pub fn resolve_named(name: &str, config: &AdapterConfig) -> Option<String> {
    ApiFamily::from_preference_name(name).map(|family| resolve(family, config))
}

/// Base URL of the API serving `resource`.
#[must_use]
pub fn base_url(resource: &ResourceFamily, config: &AdapterConfig) -> String {
    resolve(resource.api_family(), config)
}

/// Joins `base` and a relative path with exactly one `/` between them.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Percent-encodes one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

//! Preference names.

use nmos_browser_types::ApiFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed set of preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// Base URL override for an API family.
    ApiUrl(ApiFamily),
    /// `"false"` disables RQL filtering; anything else (or absent) enables it.
    RqlMode,
    /// Page size for paged listings.
    PagingLimit,
    /// Pagination availability of the last response.
    Pagination,
}

impl PreferenceKey {
    /// Name under which the value is stored.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApiUrl(family) => family.preference_name(),
            Self::RqlMode => "RQL",
            Self::PagingLimit => "Paging Limit",
            Self::Pagination => "Pagination",
        }
    }

    /// Looks up a key by its stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(family) = ApiFamily::from_preference_name(name) {
            return Some(Self::ApiUrl(family));
        }
        match name {
            "RQL" => Some(Self::RqlMode),
            "Paging Limit" => Some(Self::PagingLimit),
            "Pagination" => Some(Self::Pagination),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much of the paging protocol the last listing advertised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// No `next` relation.
    #[default]
    Disabled,
    /// Both `first` and `next` relations.
    Enabled,
    /// `next` without `first`; only forward cursors are available.
    Partial,
}

impl PaginationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaginationMode {
    type Err = crate::PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "enabled" => Ok(Self::Enabled),
            "partial" => Ok(Self::Partial),
            other => Err(crate::PrefsError::InvalidValue {
                key: PreferenceKey::Pagination.name().to_string(),
                value: other.to_string(),
            }),
        }
    }
}

//! API and resource families.
//!
//! Every registry resource is served by exactly one API family. The family
//! decides which base URL a request is addressed to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An HTTP API family the browser talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFamily {
    /// Registry event log.
    Logging,
    /// IS-04 Query API.
    Query,
    /// DNS-SD browsing API, used to discover Query APIs.
    Discovery,
}

impl ApiFamily {
    /// All families, in display order.
    pub const ALL: [ApiFamily; 3] = [ApiFamily::Logging, ApiFamily::Query, ApiFamily::Discovery];

    /// Preference name under which the base URL override is stored.
    #[must_use]
    pub const fn preference_name(self) -> &'static str {
        match self {
            Self::Logging => "Logging API",
            Self::Query => "Query API",
            Self::Discovery => "DNS-SD API",
        }
    }

    /// Path appended to the origin when no override is stored.
    #[must_use]
    pub const fn default_suffix(self) -> &'static str {
        match self {
            Self::Logging => "/log/v1.0",
            Self::Query => "/x-nmos/query/v1.2",
            Self::Discovery => "/x-dns-sd/v1.0",
        }
    }

    /// Looks up a family by its preference name.
    #[must_use]
    pub fn from_preference_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.preference_name() == name)
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preference_name())
    }
}

impl FromStr for ApiFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(family) = Self::from_preference_name(s) {
            return Ok(family);
        }
        match s.to_ascii_lowercase().as_str() {
            "logging" | "log" => Ok(Self::Logging),
            "query" => Ok(Self::Query),
            "discovery" | "dns-sd" | "dnssd" => Ok(Self::Discovery),
            _ => Err(crate::Error::UnknownApiFamily(s.to_string())),
        }
    }
}

/// A resource collection exposed by one of the API families.
///
/// Known IS-04 collections get their own variant; anything else is carried
/// verbatim and routed to the Query API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceFamily {
    Nodes,
    Devices,
    Sources,
    Flows,
    Senders,
    Receivers,
    Subscriptions,
    /// Registry log events, served by the Logging API.
    Events,
    /// Query API instances advertised over DNS-SD.
    QueryApis,
    Other(String),
}

impl ResourceFamily {
    /// The path segment naming this collection.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Nodes => "nodes",
            Self::Devices => "devices",
            Self::Sources => "sources",
            Self::Flows => "flows",
            Self::Senders => "senders",
            Self::Receivers => "receivers",
            Self::Subscriptions => "subscriptions",
            Self::Events => "events",
            Self::QueryApis => "queryapis",
            Self::Other(name) => name,
        }
    }

    /// The API family that serves this collection.
    #[must_use]
    pub fn api_family(&self) -> ApiFamily {
        match self {
            Self::Events => ApiFamily::Logging,
            Self::QueryApis => ApiFamily::Discovery,
            _ => ApiFamily::Query,
        }
    }

    /// Whether single reads are expanded with Connection API documents.
    #[must_use]
    pub fn is_connectable(&self) -> bool {
        matches!(self, Self::Senders | Self::Receivers)
    }

    /// Whether listings of this family go through the paging parameters.
    #[must_use]
    pub fn is_paged(&self) -> bool {
        !matches!(self, Self::Events)
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceFamily {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let family = match s {
            "nodes" => Self::Nodes,
            "devices" => Self::Devices,
            "sources" => Self::Sources,
            "flows" => Self::Flows,
            "senders" => Self::Senders,
            "receivers" => Self::Receivers,
            "subscriptions" => Self::Subscriptions,
            "events" => Self::Events,
            "queryapis" => Self::QueryApis,
            "" => return Err(crate::Error::InvalidResource(s.to_string())),
            other if other.contains('/') || other.contains('?') => {
                return Err(crate::Error::InvalidResource(s.to_string()));
            }
            other => Self::Other(other.to_string()),
        };
        Ok(family)
    }
}

impl TryFrom<String> for ResourceFamily {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceFamily> for String {
    fn from(value: ResourceFamily) -> Self {
        value.as_str().to_string()
    }
}

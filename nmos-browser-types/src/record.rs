//! Composite sender/receiver records.
//!
//! A registry resource is only half of what an operator needs to configure a
//! sender or receiver: the other half lives on the device's Connection API.
//! [`CompositeRecord`] keeps the two apart, so nothing fetched from the
//! Connection API can shadow a field of the registry resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A per-resource document on the Connection API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Active,
    Constraints,
    Staged,
    TransportType,
    /// SDP file; senders only. Fetched as text, stored outside `endpoints`.
    TransportFile,
}

impl Endpoint {
    /// Path segment under `/single/{resource}/{id}/`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Constraints => "constraints",
            Self::Staged => "staged",
            Self::TransportType => "transporttype",
            Self::TransportFile => "transportfile",
        }
    }

    /// Key used in the flattened view.
    #[must_use]
    pub fn flat_key(self) -> String {
        format!("{}{}", CompositeRecord::FLAT_PREFIX, self.as_str())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "constraints" => Ok(Self::Constraints),
            "staged" => Ok(Self::Staged),
            "transporttype" => Ok(Self::TransportType),
            "transportfile" => Ok(Self::TransportFile),
            other => Err(crate::Error::UnknownEndpoint(other.to_string())),
        }
    }
}

/// A registry resource together with the Connection API documents resolved
/// for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecord {
    /// The resource exactly as the Query API returned it.
    pub base: Value,
    /// Connection API base address selected from the owning device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_api: Option<String>,
    /// Raw SDP text of the sender's transport file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_file: Option<String>,
    /// JSON documents keyed by endpoint.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<Endpoint, Value>,
}

impl CompositeRecord {
    /// Prefix marking side-channel keys in the flattened view.
    pub const FLAT_PREFIX: &'static str = "$";
    const FLAT_CONNECTION_API: &'static str = "$connectionAPI";

    /// Wraps a bare resource with no Connection API data.
    #[must_use]
    pub fn from_base(base: Value) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    /// The resource's `id` field.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.base.get("id").and_then(Value::as_str)
    }

    /// Whether any Connection API data has been attached.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.connection_api.is_some() || self.transport_file.is_some() || !self.endpoints.is_empty()
    }

    #[must_use]
    pub fn endpoint(&self, endpoint: Endpoint) -> Option<&Value> {
        self.endpoints.get(&endpoint)
    }

    /// The staged document, if resolved.
    #[must_use]
    pub fn staged(&self) -> Option<&Value> {
        self.endpoint(Endpoint::Staged)
    }

    /// Mutable access to the staged document, for editing.
    pub fn staged_mut(&mut self) -> Option<&mut Value> {
        self.endpoints.get_mut(&Endpoint::Staged)
    }

    /// Renders the single-object view with `$`-prefixed side-channel keys
    /// (`$connectionAPI`, `$staged`, `$transportfile`, ...).
    ///
    /// Non-object bases are returned as-is.
    #[must_use]
    pub fn to_flat_json(&self) -> Value {
        let Value::Object(base) = &self.base else {
            return self.base.clone();
        };
        let mut out = base.clone();
        if let Some(api) = &self.connection_api {
            out.insert(Self::FLAT_CONNECTION_API.to_string(), Value::String(api.clone()));
        }
        if let Some(sdp) = &self.transport_file {
            out.insert(Endpoint::TransportFile.flat_key(), Value::String(sdp.clone()));
        }
        for (endpoint, doc) in &self.endpoints {
            out.insert(endpoint.flat_key(), doc.clone());
        }
        Value::Object(out)
    }

    /// Splits a flattened object back into base and side-channel parts.
    ///
    /// Unknown `$` keys are left in the base.
    #[must_use]
    pub fn from_flat_json(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::from_base(value);
        };
        let mut record = Self::default();
        let mut base = Map::new();
        for (key, val) in map {
            if key == Self::FLAT_CONNECTION_API {
                record.connection_api = val.as_str().map(str::to_string);
                continue;
            }
            let endpoint = key
                .strip_prefix(Self::FLAT_PREFIX)
                .and_then(|name| name.parse::<Endpoint>().ok());
            match endpoint {
                Some(Endpoint::TransportFile) => {
                    record.transport_file = val.as_str().map(str::to_string);
                }
                Some(endpoint) => {
                    record.endpoints.insert(endpoint, val);
                }
                None => {
                    base.insert(key, val);
                }
            }
        }
        record.base = Value::Object(base);
        record
    }
}

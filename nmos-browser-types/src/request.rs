//! Generic data requests.
//!
//! A [`DataRequest`] is what the presentation layer hands to the adapter: an
//! operation on a resource family, independent of how the registry APIs
//! spell it on the wire.

use crate::{CompositeRecord, ResourceFamily};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered field → value filter.
///
/// Insertion order is preserved so that the generated query string is
/// stable and matches the order the user entered filters in. Setting a field
/// that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Vec<(String, String)>);

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Filter::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets `field` to `value`.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.0.push((field, value)),
        }
    }

    /// Returns the value for `field`, if set.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (k, v) in iter {
            filter.set(k, v);
        }
        filter
    }
}

/// A pagination relation advertised in a `Link` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkRelation {
    First,
    Last,
    Next,
    Prev,
}

impl LinkRelation {
    pub const ALL: [LinkRelation; 4] = [Self::First, Self::Last, Self::Next, Self::Prev];

    /// The `rel` value used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkRelation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| crate::Error::UnknownRelation(s.to_string()))
    }
}

/// A generic data-access operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Read one resource by id.
    GetOne { id: String },

    /// List a collection, optionally filtered.
    GetList { filter: Filter },

    /// Read several resources by id in one request.
    GetMany { ids: Vec<String> },

    /// List resources whose `target` field references `value`.
    GetManyReference { target: String, value: String },

    /// Stage a new configuration for a sender or receiver.
    Update {
        id: String,
        /// The record as edited by the user.
        data: CompositeRecord,
        /// The record as it was last read.
        previous: CompositeRecord,
    },

    /// Not supported by the registry APIs.
    Create,

    /// Not supported by the registry APIs.
    Delete,

    /// Follow a pagination link from the last listing.
    Navigate(LinkRelation),
}

impl Operation {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetOne { .. } => "get_one",
            Self::GetList { .. } => "get_list",
            Self::GetMany { .. } => "get_many",
            Self::GetManyReference { .. } => "get_many_reference",
            Self::Update { .. } => "update",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Navigate(_) => "navigate",
        }
    }
}

/// An operation addressed to a resource family.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub resource: ResourceFamily,
    pub operation: Operation,
}

impl DataRequest {
    #[must_use]
    pub fn new(resource: ResourceFamily, operation: Operation) -> Self {
        Self { resource, operation }
    }

    #[must_use]
    pub fn get_one(resource: ResourceFamily, id: impl Into<String>) -> Self {
        Self::new(resource, Operation::GetOne { id: id.into() })
    }

    #[must_use]
    pub fn get_list(resource: ResourceFamily, filter: Filter) -> Self {
        Self::new(resource, Operation::GetList { filter })
    }

    #[must_use]
    pub fn get_many<I, S>(resource: ResourceFamily, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            resource,
            Operation::GetMany {
                ids: ids.into_iter().map(Into::into).collect(),
            },
        )
    }

    #[must_use]
    pub fn get_many_reference(
        resource: ResourceFamily,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            resource,
            Operation::GetManyReference {
                target: target.into(),
                value: value.into(),
            },
        )
    }

    #[must_use]
    pub fn navigate(resource: ResourceFamily, relation: LinkRelation) -> Self {
        Self::new(resource, Operation::Navigate(relation))
    }
}

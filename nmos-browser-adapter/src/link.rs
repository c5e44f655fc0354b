//! `Link` header tracking for cursor-based paging.

use nmos_browser_prefs::PaginationMode;
use nmos_browser_types::LinkRelation;
use regex_lite::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static LINK_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>;[ \t]*rel="(first|last|next|prev)""#)
        .expect("link header pattern is valid")
});

/// Paging targets advertised by the last response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSet {
    pub first: Option<String>,
    pub last: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl LinkSet {
    /// Parses a `Link` header value.
    ///
    /// Only the four paging relations are recognised, and only the first
    /// occurrence of each counts. Anything unparseable is ignored.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();
        for caps in LINK_VALUE.captures_iter(header) {
            let (Some(url), Some(rel)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Ok(rel) = rel.as_str().parse::<LinkRelation>() else {
                continue;
            };
            let slot = links.slot_mut(rel);
            if slot.is_none() {
                *slot = Some(url.as_str().to_string());
            }
        }
        links
    }

    /// Parses an optional header; absent headers give an empty set.
    #[must_use]
    pub fn from_header(header: Option<&str>) -> Self {
        header.map(Self::parse).unwrap_or_default()
    }

    /// URL for `relation`, if advertised.
    #[must_use]
    pub fn get(&self, relation: LinkRelation) -> Option<&str> {
        match relation {
            LinkRelation::First => self.first.as_deref(),
            LinkRelation::Last => self.last.as_deref(),
            LinkRelation::Next => self.next.as_deref(),
            LinkRelation::Prev => self.prev.as_deref(),
        }
    }

    fn slot_mut(&mut self, relation: LinkRelation) -> &mut Option<String> {
        match relation {
            LinkRelation::First => &mut self.first,
            LinkRelation::Last => &mut self.last,
            LinkRelation::Next => &mut self.next,
            LinkRelation::Prev => &mut self.prev,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        LinkRelation::ALL.iter().all(|rel| self.get(*rel).is_none())
    }

    /// Classifies how much paging the server supports.
    #[must_use]
    pub fn pagination_mode(&self) -> PaginationMode {
        match (&self.first, &self.next) {
            (_, None) => PaginationMode::Disabled,
            (Some(_), Some(_)) => PaginationMode::Enabled,
            (None, Some(_)) => PaginationMode::Partial,
        }
    }
}

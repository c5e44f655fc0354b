//! Translation of generic data requests into registry API requests.
//!
//! List filters are expressed either as plain `key=value` parameters or, in
//! RQL mode, as a single `query.rql` expression. RQL gives substring matches
//! and lets one parameter carry several alternatives, which plain queries
//! cannot.

use crate::error::{AdapterError, AdapterResult};
use crate::link::LinkSet;
use crate::patch;
use crate::transport::HttpRequest;
use crate::url::{base_url, join, segment};
use nmos_browser_prefs::AdapterConfig;
use nmos_browser_types::{DataRequest, Filter, Operation, ResourceFamily};

/// DNS-SD service type of the Query API.
pub const QUERY_SERVICE_TYPE: &str = "_nmos-query._tcp";

/// Page size used for by-reference listings, which are never paged.
pub const REFERENCE_PAGE_LIMIT: u32 = 1000;

/// Fields compared by equality rather than substring match in RQL mode.
const EXACT_MATCH_FIELDS: &[&str] = &["level"];

/// Builds the HTTP request for `request`.
///
/// Returns `Ok(None)` when there is nothing to send: create and delete,
/// which the registry does not support, and navigation to a link the last
/// response did not advertise.
pub fn build(
    request: &DataRequest,
    config: &AdapterConfig,
    links: &LinkSet,
) -> AdapterResult<Option<HttpRequest>> {
    let resource = &request.resource;
    let http = match &request.operation {
        Operation::GetOne { id } => HttpRequest::get(one_url(resource, id, config)),
        Operation::GetList { filter } => HttpRequest::get(list_url(resource, filter, config)),
        Operation::GetMany { ids } => HttpRequest::get(many_url(resource, ids, config)?),
        Operation::GetManyReference { target, value } => {
            HttpRequest::get(reference_url(resource, target, value, config))
        }
        Operation::Update { id, data, previous } => {
            let connection_api = data.connection_api.as_deref().ok_or_else(|| {
                AdapterError::InvalidRequest(format!(
                    "{resource}/{id} has no Connection API to update"
                ))
            })?;
            let next = data.staged().ok_or_else(|| {
                AdapterError::InvalidRequest(format!("{resource}/{id} has no staged configuration"))
            })?;
            let body = patch::synthesize(resource, previous.staged(), next);
            HttpRequest::patch(staged_url(connection_api, resource, id), body.to_json()?)
        }
        Operation::Create | Operation::Delete => return Ok(None),
        Operation::Navigate(relation) => match links.get(*relation) {
            Some(url) => HttpRequest::get(url),
            None => return Ok(None),
        },
    };
    Ok(Some(http))
}

/// URL of a single resource.
#[must_use]
pub fn one_url(resource: &ResourceFamily, id: &str, config: &AdapterConfig) -> String {
    let base = base_url(resource, config);
    let id = segment(id);
    match resource {
        ResourceFamily::QueryApis => join(&base, &format!("{QUERY_SERVICE_TYPE}/{id}")),
        _ => join(&base, &format!("{resource}/{id}")),
    }
}

/// URL of a filtered, possibly paged, listing.
#[must_use]
pub fn list_url(resource: &ResourceFamily, filter: &Filter, config: &AdapterConfig) -> String {
    let base = base_url(resource, config);
    if *resource == ResourceFamily::QueryApis {
        return join(&base, &format!("{QUERY_SERVICE_TYPE}/"));
    }

    let mut params: Vec<String> = if config.rql {
        rql_filter(filter).into_iter().collect()
    } else {
        plain_filter(filter)
    };

    if let Some(limit) = config.paging_limit {
        if resource.is_paged() {
            params.push("paging.order=update".to_string());
            params.push(format!("paging.limit={limit}"));
        }
    }

    with_query(join(&base, resource.as_str()), &params)
}

/// URL fetching several resources by id.
pub fn many_url(
    resource: &ResourceFamily,
    ids: &[String],
    config: &AdapterConfig,
) -> AdapterResult<String> {
    let Some(first) = ids.first() else {
        return Err(AdapterError::InvalidRequest(format!(
            "no ids given for {resource}"
        )));
    };
    let query = if config.rql {
        let terms: Vec<String> = ids.iter().map(|id| format!("eq(id,{})", encode(id))).collect();
        format!("query.rql=or({})", terms.join(","))
    } else {
        // Plain queries cannot express alternatives; only the first id is looked up.
        format!("id={}", encode(first))
    };
    Ok(with_query(join(&base_url(resource, config), resource.as_str()), &[query]))
}

/// URL listing resources whose `target` field references `value`.
#[must_use]
pub fn reference_url(
    resource: &ResourceFamily,
    target: &str,
    value: &str,
    config: &AdapterConfig,
) -> String {
    let url = join(&base_url(resource, config), resource.as_str());
    if target.is_empty() || value.is_empty() {
        return url;
    }
    let term = if config.rql {
        format!("query.rql=matches({target},string:{},i)", encode(value))
    } else {
        format!("{}={}", encode(target), encode(value))
    };
    with_query(url, &[term, format!("paging.limit={REFERENCE_PAGE_LIMIT}")])
}

/// URL of a sender's or receiver's staged endpoint on the Connection API.
#[must_use]
pub fn staged_url(connection_api: &str, resource: &ResourceFamily, id: &str) -> String {
    join(connection_api, &format!("single/{resource}/{}/staged", segment(id)))
}

/// One `key=value` pair per filter entry.
fn plain_filter(filter: &Filter) -> Vec<String> {
    filter
        .iter()
        .map(|(field, value)| format!("{}={}", encode(field), encode(value)))
        .collect()
}

/// `query.rql=and(...)` over every comma-separated term of every entry, or
/// `None` for an empty filter.
fn rql_filter(filter: &Filter) -> Option<String> {
    let mut terms = Vec::new();
    for (field, value) in filter.iter() {
        let encoded = encode(value);
        for term in encoded.split("%2C") {
            if EXACT_MATCH_FIELDS.contains(&field) {
                terms.push(format!("eq({field},{term})"));
            } else {
                terms.push(format!("matches({field},string:{term},i)"));
            }
        }
    }
    (!terms.is_empty()).then(|| format!("query.rql=and({})", terms.join(",")))
}

fn with_query(url: String, params: &[String]) -> String {
    if params.is_empty() {
        url
    } else {
        format!("{url}?{}", params.join("&"))
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

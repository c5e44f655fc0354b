//! The data provider: the adapter's single entry point.

use crate::error::{AdapterError, AdapterResult};
use crate::link::LinkSet;
use crate::query;
use crate::resolver::{ResolutionState, Resolver};
use crate::transport::{fetch, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::url::base_url;
use nmos_browser_prefs::{AdapterConfig, Preferences};
use nmos_browser_types::{CompositeRecord, DataRequest, Operation, ResourceFamily};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;

/// Number of items behind a listing. Serializes as the count, or as the
/// string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Exact(usize),
    /// Reference listings are fetched as one oversized page; the response
    /// alone does not say whether it holds everything.
    Unknown,
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Total {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Exact(n) => serializer.serialize_u64(*n as u64),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Result of a [`DataProvider::execute`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DataResponse {
    /// A single record and the URL it was read from.
    One { url: String, record: CompositeRecord },
    /// A page of records.
    List {
        url: String,
        data: Vec<Value>,
        total: Total,
    },
    /// The staged document after an update.
    Updated { data: Value },
    /// Nothing was sent.
    NoOp,
}

/// Maps [`DataRequest`]s onto the registry and Connection APIs.
///
/// Preferences are re-read on every call. The `Link` header of the last
/// response is kept for [`Operation::Navigate`].
pub struct DataProvider<T: Transport = HttpTransport> {
    transport: T,
    preferences: Preferences,
    origin: String,
    links: RwLock<LinkSet>,
}

impl<T: Transport> DataProvider<T> {
    /// `origin` is the scheme and authority default API paths hang off.
    pub fn new(transport: T, preferences: Preferences, origin: impl Into<String>) -> Self {
        Self {
            transport,
            preferences,
            origin: origin.into(),
            links: RwLock::new(LinkSet::default()),
        }
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Current preference snapshot.
    pub fn config(&self) -> AdapterResult<AdapterConfig> {
        Ok(self.preferences.snapshot(&self.origin)?)
    }

    /// Links advertised by the last successful response.
    pub async fn links(&self) -> LinkSet {
        self.links.read().await.clone()
    }

    /// Executes one request.
    pub async fn execute(&self, request: &DataRequest) -> AdapterResult<DataResponse> {
        let config = self.config()?;
        debug!("{} {}", request.operation.kind(), request.resource);

        if let Operation::GetOne { id } = &request.operation {
            if request.resource.is_connectable() {
                return self.get_composite(&request.resource, id, &config).await;
            }
        }

        let links = self.links().await;
        let Some(http) = query::build(request, &config, &links)? else {
            debug!("{} {}: nothing to send", request.operation.kind(), request.resource);
            return Ok(DataResponse::NoOp);
        };

        let response = self.send(&http).await?;
        let data = response.json()?;
        shape(request, http.url, data)
    }

    async fn get_composite(
        &self,
        resource: &ResourceFamily,
        id: &str,
        config: &AdapterConfig,
    ) -> AdapterResult<DataResponse> {
        let url = query::one_url(resource, id, config);
        let base = self.send(&HttpRequest::get(&url)).await?.json()?;

        let resolver = Resolver::new(&self.transport, base_url(resource, config), resource.clone(), id);
        let resolution = resolver.run_from(ResolutionState::from_base(base)).await?;
        Ok(DataResponse::One {
            url,
            record: resolution.record,
        })
    }

    /// Sends a primary request and records its paging links.
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse> {
        let response = fetch(&self.transport, request).await?;
        let links = LinkSet::from_header(response.link.as_deref());
        self.preferences.set_pagination(links.pagination_mode())?;
        *self.links.write().await = links;
        Ok(response)
    }
}

fn shape(request: &DataRequest, url: String, data: Value) -> AdapterResult<DataResponse> {
    let resource = &request.resource;
    match &request.operation {
        Operation::GetOne { .. } => Ok(DataResponse::One {
            url,
            record: CompositeRecord::from_base(normalize(resource, data)),
        }),
        Operation::GetList { .. } | Operation::GetMany { .. } | Operation::Navigate(_) => {
            let data = items(resource, data)?;
            let total = Total::Exact(data.len());
            Ok(DataResponse::List { url, data, total })
        }
        Operation::GetManyReference { .. } => Ok(DataResponse::List {
            url,
            data: items(resource, data)?,
            total: Total::Unknown,
        }),
        Operation::Update { .. } => Ok(DataResponse::Updated { data }),
        Operation::Create | Operation::Delete => Ok(DataResponse::NoOp),
    }
}

fn items(resource: &ResourceFamily, data: Value) -> AdapterResult<Vec<Value>> {
    match data {
        Value::Array(items) => Ok(items.into_iter().map(|item| normalize(resource, item)).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(AdapterError::UnexpectedResponse(format!(
            "expected a list of {resource}, got {}",
            json_kind(&other)
        ))),
    }
}

/// DNS-SD entries are keyed by service name and carry no `id`.
fn normalize(resource: &ResourceFamily, mut item: Value) -> Value {
    if *resource == ResourceFamily::QueryApis {
        if let Some(obj) = item.as_object_mut() {
            if let Some(name) = obj.get("name").cloned() {
                obj.insert("id".to_string(), name);
            }
        }
    }
    item
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

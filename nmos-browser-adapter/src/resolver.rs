//! Multi-hop resolution of senders and receivers.
//!
//! A sender or receiver in the registry only names its owning device. To
//! configure it, the device's Connection API has to be found and the
//! per-resource documents fetched from there:
//!
//! ```text
//! Base ──► DeviceLookup ──► ControlSelect ──► EndpointFetch ──► Done
//!   │            │                 │
//!   └────────────┴─────────────────┴──► ShortCircuit(reason)
//! ```
//!
//! Short-circuits are ordinary outcomes: the base record is returned without
//! Connection API data. Transport failures abort the whole resolution.

use crate::error::{AdapterError, AdapterResult};
use crate::transport::{fetch_json, fetch_text, Transport, SDP_MEDIA_TYPE};
use crate::url::{join, segment};
use futures::future::try_join_all;
use nmos_browser_types::{CompositeRecord, Endpoint, ResourceFamily};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Transport type of every sender/receiver on a v1.0 Connection API.
pub const RTP_TRANSPORT_TYPE: &str = "urn:x-nmos:transport:rtp";

/// Supported Connection API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionApiVersion {
    V1_0,
    V1_1,
}

impl ConnectionApiVersion {
    /// Preference order when a device advertises several versions.
    pub const PRIORITY: [Self; 2] = [Self::V1_1, Self::V1_0];

    /// Control type advertised in a device's `controls`.
    #[must_use]
    pub const fn control_type(self) -> &'static str {
        match self {
            Self::V1_0 => "urn:x-nmos:control:sr-ctrl/v1.0",
            Self::V1_1 => "urn:x-nmos:control:sr-ctrl/v1.1",
        }
    }

    /// Version named by the trailing path segment of a Connection API
    /// address, e.g. `http://dev/x-nmos/connection/v1.0`.
    #[must_use]
    pub fn from_address(address: &str) -> Option<Self> {
        let segment = address.trim_end_matches('/').rsplit('/').next()?;
        if segment.starts_with("v1.0") {
            Some(Self::V1_0)
        } else if segment.starts_with("v1.1") {
            Some(Self::V1_1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::V1_0 => Capabilities {
                transport_type_endpoint: false,
            },
            Self::V1_1 => Capabilities::LATEST,
        }
    }

    #[must_use]
    pub const fn supports_transport_type_endpoint(self) -> bool {
        self.capabilities().transport_type_endpoint
    }
}

/// What a Connection API offers beyond the v1.0 baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Serves `/transporttype`.
    pub transport_type_endpoint: bool,
}

impl Capabilities {
    const LATEST: Self = Self {
        transport_type_endpoint: true,
    };

    /// Capabilities of the API at `address`. Unrecognised versions are
    /// assumed to be newer than any known one.
    #[must_use]
    pub fn for_address(address: &str) -> Self {
        ConnectionApiVersion::from_address(address)
            .map(ConnectionApiVersion::capabilities)
            .unwrap_or(Self::LATEST)
    }
}

/// Connection API documents fetched for `resource`.
#[must_use]
pub fn endpoints_for(resource: &ResourceFamily) -> &'static [Endpoint] {
    match resource {
        ResourceFamily::Receivers => &[
            Endpoint::Active,
            Endpoint::Constraints,
            Endpoint::Staged,
            Endpoint::TransportType,
        ],
        ResourceFamily::Senders => &[
            Endpoint::Active,
            Endpoint::Constraints,
            Endpoint::Staged,
            Endpoint::TransportType,
            Endpoint::TransportFile,
        ],
        _ => &[],
    }
}

/// Why resolution stopped before reaching the Connection API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuit {
    /// The resource has no `device_id`.
    NoDeviceReference,
    /// The device has no `controls`.
    NoControls,
    /// None of the device's controls is a supported Connection API.
    NoSupportedControl,
}

impl fmt::Display for ShortCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoDeviceReference => "resource has no device reference",
            Self::NoControls => "device advertises no controls",
            Self::NoSupportedControl => "device advertises no supported Connection API",
        })
    }
}

/// A point in the resolution pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    /// Nothing fetched yet.
    Base,
    /// Base record fetched; owning device next.
    DeviceLookup { base: Value, device_id: String },
    /// Device fetched; choose a Connection API.
    ControlSelect { base: Value, device: Value },
    /// Connection API chosen; fetch its documents.
    EndpointFetch { base: Value, connection_api: String },
    Done(CompositeRecord),
    ShortCircuit { reason: ShortCircuit, base: Value },
}

impl ResolutionState {
    /// State after the base record has been fetched.
    #[must_use]
    pub fn from_base(base: Value) -> Self {
        let device_id = base
            .get("device_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        match device_id {
            Some(device_id) => Self::DeviceLookup { base, device_id },
            None => Self::ShortCircuit {
                reason: ShortCircuit::NoDeviceReference,
                base,
            },
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::ShortCircuit { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::DeviceLookup { .. } => "device_lookup",
            Self::ControlSelect { .. } => "control_select",
            Self::EndpointFetch { .. } => "endpoint_fetch",
            Self::Done(_) => "done",
            Self::ShortCircuit { .. } => "short_circuit",
        }
    }
}

/// Outcome of a completed resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: CompositeRecord,
    /// Set when resolution stopped early.
    pub short_circuit: Option<ShortCircuit>,
}

/// Picks a Connection API address from a device's `controls`, most recent
/// supported version first. Returns `None` when the device has no controls
/// list at all, `Some(None)` when none of them is supported.
#[must_use]
pub fn select_connection_api(device: &Value) -> Option<Option<String>> {
    let controls = device.get("controls")?.as_array()?;
    let mut by_type: HashMap<&str, &str> = HashMap::new();
    for control in controls {
        if let (Some(kind), Some(href)) = (
            control.get("type").and_then(Value::as_str),
            control.get("href").and_then(Value::as_str),
        ) {
            by_type.insert(kind, href);
        }
    }
    Some(
        ConnectionApiVersion::PRIORITY
            .iter()
            .find_map(|version| by_type.get(version.control_type()))
            .map(|href| href.to_string()),
    )
}

/// Resolves one sender or receiver into a [`CompositeRecord`].
pub struct Resolver<'a> {
    transport: &'a dyn Transport,
    query_api: String,
    resource: ResourceFamily,
    id: String,
}

impl<'a> Resolver<'a> {
    /// `query_api` is the Query API base URL used for the base and device
    /// hops.
    pub fn new(
        transport: &'a dyn Transport,
        query_api: impl Into<String>,
        resource: ResourceFamily,
        id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            query_api: query_api.into(),
            resource,
            id: id.into(),
        }
    }

    /// Runs the whole pipeline from [`ResolutionState::Base`].
    pub async fn run(&self) -> AdapterResult<Resolution> {
        self.run_from(ResolutionState::Base).await
    }

    /// Runs the pipeline from an arbitrary state until it terminates.
    pub async fn run_from(&self, mut state: ResolutionState) -> AdapterResult<Resolution> {
        while !state.is_terminal() {
            state = self.step(state).await?;
        }
        match state {
            ResolutionState::Done(record) => Ok(Resolution {
                record,
                short_circuit: None,
            }),
            ResolutionState::ShortCircuit { reason, base } => {
                debug!("{}/{}: {}", self.resource, self.id, reason);
                Ok(Resolution {
                    record: CompositeRecord::from_base(base),
                    short_circuit: Some(reason),
                })
            }
            other => Err(AdapterError::UnexpectedResponse(format!(
                "resolution stopped in state {}",
                other.name()
            ))),
        }
    }

    /// Advances one state.
    pub async fn step(&self, state: ResolutionState) -> AdapterResult<ResolutionState> {
        debug!("{}/{}: resolving {}", self.resource, self.id, state.name());
        match state {
            ResolutionState::Base => {
                let path = format!("{}/{}", self.resource, segment(&self.id));
                let url = join(&self.query_api, &path);
                let base = fetch_json(self.transport, &url).await?;
                Ok(ResolutionState::from_base(base))
            }
            ResolutionState::DeviceLookup { base, device_id } => {
                let url = join(&self.query_api, &format!("devices/{}", segment(&device_id)));
                let device = fetch_json(self.transport, &url).await?;
                Ok(ResolutionState::ControlSelect { base, device })
            }
            ResolutionState::ControlSelect { base, device } => {
                Ok(match select_connection_api(&device) {
                    None => ResolutionState::ShortCircuit {
                        reason: ShortCircuit::NoControls,
                        base,
                    },
                    Some(None) => ResolutionState::ShortCircuit {
                        reason: ShortCircuit::NoSupportedControl,
                        base,
                    },
                    Some(Some(connection_api)) => ResolutionState::EndpointFetch {
                        base,
                        connection_api,
                    },
                })
            }
            ResolutionState::EndpointFetch {
                base,
                connection_api,
            } => {
                let record = self.fetch_endpoints(base, connection_api).await?;
                Ok(ResolutionState::Done(record))
            }
            terminal => Ok(terminal),
        }
    }

    async fn fetch_endpoints(
        &self,
        base: Value,
        connection_api: String,
    ) -> AdapterResult<CompositeRecord> {
        let capabilities = Capabilities::for_address(&connection_api);
        let mut record = CompositeRecord::from_base(base);

        let mut json_endpoints = Vec::new();
        let mut wants_transport_file = false;
        for endpoint in endpoints_for(&self.resource) {
            match endpoint {
                Endpoint::TransportFile => wants_transport_file = true,
                Endpoint::TransportType if !capabilities.transport_type_endpoint => {
                    record.endpoints.insert(
                        Endpoint::TransportType,
                        Value::String(RTP_TRANSPORT_TYPE.to_string()),
                    );
                }
                other => json_endpoints.push(*other),
            }
        }

        let transport_file = async {
            if !wants_transport_file {
                return Ok(None);
            }
            let url = self.endpoint_url(&connection_api, Endpoint::TransportFile);
            fetch_text(self.transport, &url, SDP_MEDIA_TYPE).await.map(Some)
        };
        let documents = try_join_all(json_endpoints.iter().map(|endpoint| {
            let url = self.endpoint_url(&connection_api, *endpoint);
            async move {
                let doc = fetch_json(self.transport, &url).await?;
                Ok::<_, AdapterError>((*endpoint, doc))
            }
        }));

        let (transport_file, documents) = futures::try_join!(transport_file, documents)?;
        record.transport_file = transport_file;
        record.endpoints.extend(documents);
        record.connection_api = Some(connection_api);
        Ok(record)
    }

    fn endpoint_url(&self, connection_api: &str, endpoint: Endpoint) -> String {
        join(
            connection_api,
            &format!("single/{}/{}/{}/", self.resource, segment(&self.id), endpoint),
        )
    }
}

//! Data-access adapter for the NMOS registry browser.
//!
//! Maps generic data requests (list, get one, get many, get by reference,
//! update) onto the IS-04 Query API, the DNS-SD browsing API, the registry
//! log and the per-device IS-05 Connection APIs.
//!
//! # Architecture
//!
//! - **URL resolution** ([`url`]): which base URL serves a resource
//! - **Query building** ([`query`]): plain or RQL filters, paging parameters
//! - **Link tracking** ([`link`]): `Link` header relations and paging mode
//! - **Resolution** ([`resolver`]): resource → device → Connection API →
//!   staged/active/constraints/transport documents
//! - **Patch synthesis** ([`patch`]): sparse PATCH bodies for staged updates
//! - **Provider** ([`DataProvider`]): ties the above to a [`Transport`]
//!
//! # Example
//!
//! ```no_run
//! use nmos_browser_adapter::{DataProvider, DataResponse, HttpTransport, TransportConfig};
//! use nmos_browser_prefs::{MemoryPreferenceStore, Preferences};
//! use nmos_browser_types::{DataRequest, Filter, ResourceFamily};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let prefs = Preferences::new(Arc::new(MemoryPreferenceStore::new()));
//! let provider = DataProvider::new(
//!     HttpTransport::new(TransportConfig::default())?,
//!     prefs,
//!     "http://registry.local",
//! );
//!
//! let request = DataRequest::get_list(ResourceFamily::Senders, Filter::new().with("label", "cam"));
//! if let DataResponse::List { data, total, .. } = provider.execute(&request).await? {
//!     println!("{total} senders, first page has {}", data.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod link;
pub mod patch;
mod provider;
pub mod query;
pub mod resolver;
mod transport;
pub mod url;

pub use error::{AdapterError, AdapterResult};
pub use link::LinkSet;
pub use patch::{synthesize, StagedPatch, TransportFilePatch};
pub use provider::{DataProvider, DataResponse, Total};
pub use resolver::{
    Capabilities, ConnectionApiVersion, Resolution, ResolutionState, Resolver, ShortCircuit,
};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, Transport, TransportConfig, SDP_MEDIA_TYPE,
};

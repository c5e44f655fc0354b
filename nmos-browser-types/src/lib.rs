//! Core type definitions for the NMOS registry browser.
//!
//! This crate defines the transport-agnostic vocabulary shared by the
//! preference store, the data-access adapter and the command-line front end:
//! - API and resource families (which registry API serves a resource)
//! - Data requests (generic list/get/update operations and their parameters)
//! - Composite records (a registry resource plus its Connection API documents)
//!
//! Nothing here performs I/O.

mod record;
mod request;
mod resource;

pub use record::{CompositeRecord, Endpoint};
pub use request::{DataRequest, Filter, LinkRelation, Operation};
pub use resource::{ApiFamily, ResourceFamily};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown API family: {0}")]
    UnknownApiFamily(String),

    #[error("unknown link relation: {0}")]
    UnknownRelation(String),

    #[error("unknown connection endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("invalid resource family: {0:?}")]
    InvalidResource(String),
}

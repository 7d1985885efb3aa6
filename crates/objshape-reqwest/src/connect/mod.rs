//! Speckle client module.
//!
//! This module provides the client used for every server operation. It
//! wraps the `reqwest` crate for the GraphQL API and the object endpoints.

mod client;
mod config;

pub use client::{SpeckleClient, TRACING_TARGET};
pub use config::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT, SpeckleClientConfig};

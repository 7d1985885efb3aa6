#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod connect;
mod error;
mod graphql;
mod service;

pub mod transport;

pub use crate::connect::{DEFAULT_SERVER_URL, SpeckleClient, SpeckleClientConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};

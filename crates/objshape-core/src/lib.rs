#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for object graph traversal.
pub const TRACING_TARGET_TRAVERSE: &str = "objshape_core::traverse";

/// Tracing target for DirectShape conversion.
pub const TRACING_TARGET_CONVERT: &str = "objshape_core::convert";

/// Tracing target for target model naming.
pub const TRACING_TARGET_NAMING: &str = "objshape_core::naming";

/// Tracing target for the objects kit bootstrap.
pub const TRACING_TARGET_KIT: &str = "objshape_core::kit";

mod error;
mod health;
mod id;

pub mod category;
pub mod convert;
pub mod kit;
pub mod naming;
pub mod object;
pub mod traverse;

pub use category::RevitCategory;
pub use convert::{convert, convert_all, display_meshes};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use id::{ModelId, ObjectId, ProjectId, VersionId};
pub use naming::generate_target_model_name;
pub use object::{Collection, DirectShape, Mesh, Node, Value};
pub use traverse::{TraversalContext, traverse};

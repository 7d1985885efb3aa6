//! Platform identifiers.
//!
//! The platform hands out opaque string ids for projects, models, versions
//! and objects. Wrapping them keeps a model id from being passed where a
//! version id is expected.

use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[derive(Deref, Display, From, Into)]
        #[display("{_0}")]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

platform_id!(
    /// Identifier of a project.
    ProjectId
);

platform_id!(
    /// Identifier of a model (a named stream of versions).
    ModelId
);

platform_id!(
    /// Identifier of a published version.
    VersionId
);

platform_id!(
    /// Content id of a stored object.
    ObjectId
);

impl ModelId {
    /// Composes the `model@version` resource id used by context views.
    pub fn at_version(&self, version: &VersionId) -> String {
        format!("{}@{}", self.0, version.0)
    }
}

//! Typed ID wrapper for operator identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up operator ids with shared-store
/// keys or other plain strings. These are just strings underneath —
/// no format requirement, the core doesn't care what ids look like.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(OperatorId, "Unique identifier of an operator node in the graph.");

/// The reserved identifier of the synthetic root node.
///
/// `ROOT` is inserted by graph construction so that every source of the
/// user's DAG is uniformly "a successor of ROOT." It never runs and
/// carries no operator configuration. User-supplied operators may not
/// use this literal as their id ([`crate::error::GraphError::ProtectedIdUsed`]).
pub const ROOT: &str = "ROOT";

impl OperatorId {
    /// The synthetic root id.
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    /// Whether this id is the synthetic root.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }
}

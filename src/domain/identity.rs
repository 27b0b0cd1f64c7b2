//! Caller identity as recorded on materials and comments.

use serde::{Deserialize, Serialize};

/// A user snapshot (`{id, name}`) taken at the time of an operation.
///
/// The store never validates or refreshes identities: a later display-name
/// change does not rewrite comments or uploads made under the old name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user identifier
    pub id: String,

    /// Display name at the time of the snapshot
    pub name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

//! Team data structure.

use serde::{Deserialize, Serialize};

/// Externally assigned team identifier.
pub type TeamId = i64;

/// A team eligible for pairing. Owned by the roster store; read-only here.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

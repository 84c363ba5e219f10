//! Errors reported by a league store.

/// Failure reported by the store collaborator. The reason is passed to the user verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// No record of this kind with this id.
    NotFound { entity: &'static str, id: i64 },
    /// The store refused the write; nothing was stored.
    Rejected(String),
    /// The store could not be reached.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { entity, id } => write!(f, "{} {} not found", entity, id),
            StoreError::Rejected(reason) => write!(f, "{}", reason),
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

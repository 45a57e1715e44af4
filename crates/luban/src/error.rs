use entries::{AppId, TreeError};

/// Unified error type for the luban crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// Rejected by the tree engine.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// No record for the authenticated user.
    #[error("user not found: {0}")]
    UserNotFound(String),
    /// No application record with this id for this owner.
    #[error("app not found: {0}")]
    AppNotFound(AppId),
    /// Malformed request outside the tree grammar.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The stored tree changed between load and save.
    #[error("tree of user {0} was modified concurrently")]
    Conflict(String),
    /// Backing store failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the caller can fix the request and try again. Everything else
    /// is reported generically.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Tree(error) => error.is_recoverable(),
            CoreError::UserNotFound(_)
            | CoreError::AppNotFound(_)
            | CoreError::BadRequest(_)
            | CoreError::Conflict(_) => true,
            CoreError::Storage(_) | CoreError::Internal(_) => false,
        }
    }
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

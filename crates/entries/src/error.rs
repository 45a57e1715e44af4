#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("invalid param {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("entry({name}) already exists under directory({dir})")]
    EntryAlreadyExists { dir: String, name: String },

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("corrupt tree: {0}")]
    Corrupt(String),

    #[error("tree invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;

impl TreeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TreeError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Stable numeric code reported to callers.
    ///
    /// User-triggerable kinds share the ranges used by the response envelope:
    /// 1xx for malformed requests and 2xx for conflicts with the tree state.
    /// Internal kinds report 500.
    pub fn code(&self) -> u16 {
        match self {
            TreeError::InvalidParameter { .. } => 102,
            TreeError::EntryNotFound(_) => 103,
            TreeError::EntryAlreadyExists { .. } => 200,
            TreeError::DirectoryNotEmpty(_) => 201,
            TreeError::Corrupt(_) | TreeError::Invariant(_) => 500,
        }
    }

    /// Stable string code reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            TreeError::InvalidParameter { .. } => "invalid_parameter",
            TreeError::EntryNotFound(_) => "entry_not_found",
            TreeError::EntryAlreadyExists { .. } => "entry_already_exists",
            TreeError::DirectoryNotEmpty(_) => "directory_not_empty",
            TreeError::Corrupt(_) => "corrupt_tree",
            TreeError::Invariant(_) => "invariant_violation",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TreeError::Corrupt(_) | TreeError::Invariant(_))
    }
}

use std::fmt;

/// Result type for toolmark-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A string did not name any variant of a closed vocabulary
    InvalidValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidValue {
                field,
                value,
                allowed,
            } => write!(
                f,
                "invalid {} '{}': must be one of {}",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

impl std::error::Error for Error {}

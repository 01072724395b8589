use std::fmt;

/// Result type for toolmark-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Database/index layer error
    Index(toolmark_index::Error),

    /// Detection or conversion error
    Provider(toolmark_providers::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Referenced record does not exist
    NotFound(String),

    /// Invalid operation or state
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "Index error: {}", err),
            Error::Provider(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::NotFound(what) => write!(f, "Not found: {}", what),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Provider(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::NotFound(_) | Error::InvalidOperation(_) => None,
        }
    }
}

impl From<toolmark_index::Error> for Error {
    fn from(err: toolmark_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<toolmark_providers::Error> for Error {
    fn from(err: toolmark_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_are_shown_verbatim() {
        let err = Error::from(toolmark_providers::Error::InvalidInput(
            "not a valid JSON file".to_string(),
        ));
        assert_eq!(err.to_string(), "Invalid input: not a valid JSON file");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("session 'abc'".to_string());
        assert_eq!(err.to_string(), "Not found: session 'abc'");
        assert!(std::error::Error::source(&err).is_none());
    }
}

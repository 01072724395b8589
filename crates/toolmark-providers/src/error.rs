use std::fmt;
use toolmark_types::SourceFormat;

/// Result type for toolmark-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while importing a document
///
/// None of these are transient. Re-running an import on the same bytes
/// reproduces the same error.
#[derive(Debug)]
pub enum Error {
    /// Input is not a JSON object (bad UTF-8, bad JSON, or a non-object root)
    InvalidInput(String),

    /// No detector reached the confidence threshold
    UnrecognizedFormat { supported: Vec<SourceFormat> },

    /// A field the matched format relies on is absent or has the wrong shape
    StructuralMismatch { format: SourceFormat, detail: String },

    /// Upload exceeds the configured byte ceiling
    PayloadTooLarge { size: usize, limit: usize },
}

impl Error {
    pub(crate) fn mismatch(format: SourceFormat, detail: impl Into<String>) -> Self {
        Error::StructuralMismatch {
            format,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::UnrecognizedFormat { supported } => {
                let names: Vec<&str> = supported.iter().map(|s| s.display_name()).collect();
                write!(
                    f,
                    "Unrecognized format: the JSON structure does not match any of {}",
                    names.join(" / ")
                )
            }
            Error::StructuralMismatch { format, detail } => {
                write!(f, "Malformed {} document: {}", format.display_name(), detail)
            }
            Error::PayloadTooLarge { size, limit } => write!(
                f,
                "Payload too large: {} bytes exceeds the {} byte limit",
                size, limit
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_format_names_families() {
        let err = Error::UnrecognizedFormat {
            supported: SourceFormat::ALL.to_vec(),
        };
        let msg = err.to_string();
        assert!(msg.contains("OpenAI / Anthropic / custom trace"));
    }

    #[test]
    fn test_mismatch_names_format_and_field() {
        let err = Error::mismatch(SourceFormat::Custom, "conversation_turns[0] is missing 'text'");
        assert_eq!(
            err.to_string(),
            "Malformed custom trace document: conversation_turns[0] is missing 'text'"
        );
    }
}

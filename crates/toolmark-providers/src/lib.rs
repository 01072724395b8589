// Error types
pub mod error;

// Detector trait and confidence scoring
pub mod traits;

// Source formats
pub mod anthropic;
pub mod custom;
pub mod openai;

// Shared conversion helpers
mod chat;
mod fields;

// Detector registry and import pipeline
pub mod registry;

pub use traits::{Evidence, FormatDetector, ProbeResult};

pub use anthropic::AnthropicFormat;
pub use custom::CustomTraceFormat;
pub use openai::OpenAiFormat;

pub use fields::encode_arguments;

pub use registry::{
    CONFIDENCE_THRESHOLD, DEFAULT_MAX_UPLOAD_BYTES, Detection, ImporterRegistry, parse_document,
};

pub use error::{Error, Result};

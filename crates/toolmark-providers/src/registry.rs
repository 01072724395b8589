use serde_json::Value;
use std::fmt;
use toolmark_types::{CanonicalSession, RawDocument, SourceFormat};

use crate::traits::FormatDetector;
use crate::{AnthropicFormat, CustomTraceFormat, Error, OpenAiFormat, Result};

/// Minimum confidence for a detector to claim a document
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Default upload ceiling: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Winning detector for a document
pub struct Detection<'a> {
    pub detector: &'a dyn FormatDetector,
    pub confidence: f32,
}

impl Detection<'_> {
    pub fn format(&self) -> SourceFormat {
        self.detector.format()
    }
}

impl fmt::Debug for Detection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detection")
            .field("format", &self.format())
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Fixed, ordered set of format detectors
///
/// Order matters: on equal confidence the earlier detector wins, so OpenAI
/// takes precedence over Anthropic, which takes precedence over custom traces.
pub struct ImporterRegistry {
    detectors: Vec<Box<dyn FormatDetector>>,
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(OpenAiFormat),
                Box::new(AnthropicFormat),
                Box::new(CustomTraceFormat),
            ],
        }
    }

    pub fn formats(&self) -> Vec<SourceFormat> {
        self.detectors.iter().map(|d| d.format()).collect()
    }

    /// Confidence of every detector, in registration order
    pub fn probe_all(&self, doc: &RawDocument) -> Vec<(SourceFormat, f32)> {
        self.detectors
            .iter()
            .map(|d| (d.format(), d.probe(doc).confidence()))
            .collect()
    }

    /// Pick the most confident detector, if it reaches the threshold
    pub fn detect_format(&self, doc: &RawDocument) -> Result<Detection<'_>> {
        let mut best: Option<Detection<'_>> = None;

        for detector in &self.detectors {
            let confidence = detector.probe(doc).confidence();
            tracing::trace!(format = %detector.format(), confidence, "probed document");

            // Strictly greater: ties keep the earlier detector
            if confidence > best.as_ref().map_or(0.0, |b| b.confidence) {
                best = Some(Detection {
                    detector: detector.as_ref(),
                    confidence,
                });
            }
        }

        match best {
            Some(detection) if detection.confidence >= CONFIDENCE_THRESHOLD => {
                tracing::debug!(
                    format = %detection.format(),
                    confidence = detection.confidence,
                    "detected document format"
                );
                Ok(detection)
            }
            _ => Err(Error::UnrecognizedFormat {
                supported: self.formats(),
            }),
        }
    }

    /// Detect and convert an already-parsed document
    pub fn import_document(&self, doc: &RawDocument) -> Result<CanonicalSession> {
        self.convert(doc).map(|(session, _)| session)
    }

    /// Full import of an uploaded buffer: size check, parse, detect, convert
    ///
    /// Returns the detection alongside the session so callers can report
    /// which format claimed the buffer.
    pub fn import_bytes(
        &self,
        bytes: &[u8],
        max_bytes: usize,
    ) -> Result<(CanonicalSession, Detection<'_>)> {
        if bytes.len() > max_bytes {
            return Err(Error::PayloadTooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        let doc = parse_document(bytes)?;
        self.convert(&doc)
    }

    fn convert(&self, doc: &RawDocument) -> Result<(CanonicalSession, Detection<'_>)> {
        let detection = self.detect_format(doc)?;
        let session = detection.detector.transform(doc)?;
        Ok((session, detection))
    }
}

/// Parse a buffer into a JSON object
pub fn parse_document(bytes: &[u8]) -> Result<RawDocument> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::InvalidInput(format!("not a valid JSON file: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order() {
        assert_eq!(ImporterRegistry::new().formats(), SourceFormat::ALL.to_vec());
    }

    #[test]
    fn test_parse_document_rejects_non_objects() {
        let err = parse_document(b"[1, 2]").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("found an array"));

        assert!(matches!(parse_document(b"{oops"), Err(Error::InvalidInput(_))));
        assert!(matches!(
            parse_document(&[0xff, 0xfe, b'{', b'}']),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_import_bytes_enforces_ceiling() {
        let registry = ImporterRegistry::new();
        let body = br#"{"messages": [{"role": "user", "content": "hi"}]}"#;

        let err = registry.import_bytes(body, 10).unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadTooLarge { size, limit: 10 } if size == body.len()
        ));
        let (session, detection) = registry.import_bytes(body, body.len()).unwrap();
        assert_eq!(detection.format(), SourceFormat::OpenAi);
        assert_eq!(session.messages.len(), 1);
    }
}

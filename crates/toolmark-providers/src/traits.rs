use crate::Result;
use toolmark_types::{CanonicalSession, RawDocument, SourceFormat};

/// A known source format: scores how well a document matches, and converts
/// documents it matched into a canonical session
///
/// Implementations are stateless.
pub trait FormatDetector: Send + Sync {
    /// Format this detector recognizes
    fn format(&self) -> SourceFormat;

    /// Score the document against this format's shape
    fn probe(&self, doc: &RawDocument) -> ProbeResult;

    /// Convert a document this detector matched
    ///
    /// Calling this with a document of another shape fails with
    /// `StructuralMismatch`; it never yields a partial session.
    fn transform(&self, doc: &RawDocument) -> Result<CanonicalSession>;
}

// --- Helper types ---

/// Probe result with confidence score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    /// Detector recognizes the document with given confidence (0.0 - 1.0)
    Confidence(f32),
    /// No evidence for this format
    NoMatch,
}

impl ProbeResult {
    /// Build from an evidence total in tenths, clamped to 1.0
    pub fn from_tenths(tenths: u8) -> Self {
        match tenths {
            0 => ProbeResult::NoMatch,
            t => ProbeResult::Confidence(f32::from(t.min(10)) / 10.0),
        }
    }

    /// Check if this is a match (confidence > 0)
    pub fn is_match(&self) -> bool {
        matches!(self, ProbeResult::Confidence(c) if *c > 0.0)
    }

    /// Get confidence score (0.0 if NoMatch)
    pub fn confidence(&self) -> f32 {
        match self {
            ProbeResult::Confidence(c) => *c,
            ProbeResult::NoMatch => 0.0,
        }
    }
}

/// Additive evidence tally
///
/// Weights are whole tenths so that totals such as 0.5 and 1.0 are exact.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evidence {
    tenths: u8,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight_tenths` when `present` holds
    pub fn add(mut self, present: bool, weight_tenths: u8) -> Self {
        if present {
            self.tenths = self.tenths.saturating_add(weight_tenths);
        }
        self
    }

    pub fn finish(self) -> ProbeResult {
        ProbeResult::from_tenths(self.tenths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tenths_is_exact_and_clamped() {
        assert_eq!(ProbeResult::from_tenths(0), ProbeResult::NoMatch);
        assert_eq!(ProbeResult::from_tenths(5).confidence(), 0.5);
        assert_eq!(ProbeResult::from_tenths(10).confidence(), 1.0);
        assert_eq!(ProbeResult::from_tenths(14).confidence(), 1.0);
    }

    #[test]
    fn test_evidence_only_counts_present_items() {
        let evidence = Evidence::new().add(true, 4).add(false, 3).add(true, 3).finish();
        assert_eq!(evidence.confidence(), 0.7);
        assert!(evidence.is_match());
        assert!(!Evidence::new().add(false, 5).finish().is_match());
    }
}

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Annotator verdict on a single tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Correct,
    Incorrect,
    Uncertain,
}

impl Correctness {
    pub const NAMES: &'static [&'static str] = &["correct", "incorrect", "uncertain"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Correctness::Correct => "correct",
            Correctness::Incorrect => "incorrect",
            Correctness::Uncertain => "uncertain",
        }
    }
}

impl FromStr for Correctness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "correct" => Ok(Correctness::Correct),
            "incorrect" => Ok(Correctness::Incorrect),
            "uncertain" => Ok(Correctness::Uncertain),
            _ => Err(Error::InvalidValue {
                field: "correctness",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong with an incorrect tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    WrongTool,
    WrongParams,
    WrongTiming,
    Redundant,
    Missing,
}

impl ErrorType {
    pub const NAMES: &'static [&'static str] = &[
        "wrong_tool",
        "wrong_params",
        "wrong_timing",
        "redundant",
        "missing",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::WrongTool => "wrong_tool",
            ErrorType::WrongParams => "wrong_params",
            ErrorType::WrongTiming => "wrong_timing",
            ErrorType::Redundant => "redundant",
            ErrorType::Missing => "missing",
        }
    }
}

impl FromStr for ErrorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wrong_tool" => Ok(ErrorType::WrongTool),
            "wrong_params" => Ok(ErrorType::WrongParams),
            "wrong_timing" => Ok(ErrorType::WrongTiming),
            "redundant" => Ok(ErrorType::Redundant),
            "missing" => Ok(ErrorType::Missing),
            _ => Err(Error::InvalidValue {
                field: "error_type",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Trivial,
}

impl Severity {
    pub const NAMES: &'static [&'static str] = &["critical", "major", "minor", "trivial"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Trivial => "trivial",
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "critical" => Ok(Severity::Critical),
            "major" => Ok(Severity::Major),
            "minor" => Ok(Severity::Minor),
            "trivial" => Ok(Severity::Trivial),
            _ => Err(Error::InvalidValue {
                field: "severity",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotation as submitted, before it is assigned an id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnnotation {
    pub session_id: String,
    pub message_index: usize,
    pub tool_call_index: usize,
    pub correctness: Correctness,
    #[serde(default)]
    pub error_type: Option<ErrorType>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Stored annotation of one tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallAnnotation {
    pub id: String,
    pub session_id: String,
    pub message_index: usize,
    pub tool_call_index: usize,
    pub annotator: String,
    pub correctness: Correctness,
    pub error_type: Option<ErrorType>,
    pub severity: Option<Severity>,
    pub comment: Option<String>,
    /// RFC 3339, UTC
    pub created_at: String,
}

impl ToolCallAnnotation {
    /// Stamp a submission with a fresh id and the current time
    pub fn from_new(new: NewAnnotation, annotator: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: new.session_id,
            message_index: new.message_index,
            tool_call_index: new.tool_call_index,
            annotator: annotator.into(),
            correctness: new.correctness,
            error_type: new.error_type,
            severity: new.severity,
            comment: new.comment,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a connection row failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDefect {
    MissingAuthor,
    NoTarget,
    BothTargets,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedConnection(ConnectionDefect),
    /// A talk/speaker row with a blank talk or speaker id.
    MalformedLink,
    SelfConnection,
    DanglingReference,
    /// A logical edge with no physical counterpart in the force simulation.
    UnsimulatedLink,
    NumericGuard,
}

/// A non-fatal record of a skipped row, dropped edge or clamped value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Id of the offending row or edge, when there is one.
    pub source: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, source: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_malformed_connection(&self) -> bool {
        matches!(self.kind, DiagnosticKind::MalformedConnection(_))
    }
}

impl fmt::Display for ConnectionDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionDefect::MissingAuthor => write!(f, "missing author"),
            ConnectionDefect::NoTarget => write!(f, "no linked talk or person"),
            ConnectionDefect::BothTargets => write!(f, "both linked talk and person set"),
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MalformedConnection(defect) => {
                write!(f, "malformed connection ({defect})")
            }
            DiagnosticKind::MalformedLink => write!(f, "malformed speaker link"),
            DiagnosticKind::SelfConnection => write!(f, "self connection"),
            DiagnosticKind::DanglingReference => write!(f, "dangling reference"),
            DiagnosticKind::UnsimulatedLink => write!(f, "unsimulated link"),
            DiagnosticKind::NumericGuard => write!(f, "numeric guard"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} [{source}]: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

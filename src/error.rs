use crate::token::{Token, TokenKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a whole command, as opposed to compile diagnostics
/// which are collected into a `CompilationResult`.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("FileNotFoundError: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),
    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ConfigError: {0}")]
    Config(String),
    #[error("PatternError: {0}")]
    Pattern(#[from] regex::Error),
    #[error("InvalidSequence: {0}")]
    InvalidSequence(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    Expected(TokenKind),
    InvalidTimedInput { found: String },
    MalformedTiming { literal: String },
}

impl SyntaxErrorKind {
    /// Numeric id of what the parser expected at the error position.
    pub fn id(&self) -> u8 {
        match self {
            SyntaxErrorKind::Expected(kind) => kind.id(),
            SyntaxErrorKind::InvalidTimedInput { .. } => 17,
            SyntaxErrorKind::MalformedTiming { .. } => 20,
        }
    }

    fn message(&self) -> String {
        match self {
            SyntaxErrorKind::Expected(kind) => format!("{} expected", kind),
            SyntaxErrorKind::InvalidTimedInput { found } => {
                format!("invalid TimedInput, expected a direction or button but found {:?}", found)
            }
            SyntaxErrorKind::MalformedTiming { literal } => {
                format!("malformed timing literal {:?}, delay taken as 0ms", literal)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SyntaxError: -- line {line} col {column}: {}", .kind.message())]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn from_token(token: &Token, kind: SyntaxErrorKind) -> Self {
        Self {
            line: token.line,
            column: token.column,
            kind,
        }
    }
}

/// Positions are 1-based, the first input is position 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("TimingError: the sequence is empty")]
    EmptySequence,
    #[error("TimingError: input {position} is too slow, timeout exceeded. Elapsed: {delay_ms}ms, maximum allowed: {max_ms}ms")]
    Timeout { position: usize, delay_ms: i64, max_ms: i64 },
    #[error("TimingError: input {position} is too fast, debounce violation. Elapsed: {delay_ms}ms, minimum required: {min_ms}ms")]
    Debounce { position: usize, delay_ms: i64, min_ms: i64 },
    #[error("TimingError: input {position} has a negative delay: {delay_ms}ms")]
    NegativeDelay { position: usize, delay_ms: i64 },
    #[error("TimingError: total sequence duration exceeds the limit. Duration: {total_ms}ms, maximum: {max_ms}ms")]
    TotalDuration { total_ms: i64, max_ms: i64 },
}

impl TimingError {
    pub fn position(&self) -> Option<usize> {
        match self {
            TimingError::Timeout { position, .. }
            | TimingError::Debounce { position, .. }
            | TimingError::NegativeDelay { position, .. } => Some(*position),
            TimingError::EmptySequence | TimingError::TotalDuration { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("MatchError: the sequence is empty")]
    EmptySequence,
    #[error("MatchError: the sequence [{}] does not match any known move", .commands.join(", "))]
    NoMatch { commands: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_renders_position_and_expectation() {
        let error = SyntaxError {
            line: 3,
            column: 7,
            kind: SyntaxErrorKind::Expected(TokenKind::SequenceEnd),
        };
        assert_eq!(error.to_string(), "SyntaxError: -- line 3 col 7: SEQUENCE_END expected");
        assert_eq!(error.kind.id(), 15);
    }

    #[test]
    fn timing_error_names_its_position() {
        let error = TimingError::Debounce { position: 3, delay_ms: 10, min_ms: 50 };
        assert_eq!(error.position(), Some(3));
        assert!(error.to_string().contains("input 3"));
        assert!(error.to_string().starts_with("TimingError:"));
    }

    #[test]
    fn match_error_lists_commands() {
        let error = MatchError::NoMatch {
            commands: vec!["UP".into(), "UP".into(), "HP".into()],
        };
        assert_eq!(
            error.to_string(),
            "MatchError: the sequence [UP, UP, HP] does not match any known move"
        );
    }
}

//! Compiler for timed controller input sequences.
//!
//! Source text such as
//!
//! ```text
//! SEQUENCE_START
//! DOWN T:0
//! DOWN T:150
//! UP T:180
//! DOWN T:200
//! HP T:175
//! SEQUENCE_END
//! ```
//!
//! is scanned, parsed with error recovery, checked against timing
//! thresholds, matched against a catalog of known moves and turned into
//! intermediate code.

pub mod catalog;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod scanner;
pub mod source;
pub mod timing;
pub mod token;

pub use catalog::{Catalog, MoveCategory, MoveDefinition};
pub use codegen::{IntermediateCode, Instruction};
pub use compiler::{CompilationResult, Compiler};
pub use config::{Config, TimingConfig};
pub use error::{CompilerError, MatchError, SyntaxError, SyntaxErrorKind, TimingError};
pub use matcher::SequenceMatcher;
pub use parser::{parse_source, ParseOutcome, Parser, TimedCommand};
pub use scanner::Scanner;
pub use timing::{TimingStatistics, TimingValidator};
pub use token::{Command, Token, TokenKind};

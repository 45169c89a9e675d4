use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::scanner::Scanner;
use crate::token::{Command, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Minimum number of successfully consumed tokens between two reported
/// syntax errors.
const MIN_ERROR_DISTANCE: usize = 2;

/// One command of a sequence and the time elapsed since the previous one.
/// The first command of a sequence carries 0 by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedCommand {
    pub command: String,
    pub delay_ms: i64,
}

impl TimedCommand {
    pub fn new(command: impl Into<String>, delay_ms: i64) -> Self {
        Self {
            command: command.into(),
            delay_ms,
        }
    }
}

impl From<(Command, i64)> for TimedCommand {
    fn from((command, delay_ms): (Command, i64)) -> Self {
        Self::new(command.name(), delay_ms)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub sequence: Vec<TimedCommand>,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Recursive-descent parser for
///
/// ```text
/// Program       = SEQUENCE_START TimedSequence SEQUENCE_END EOF
/// TimedSequence = TimedInput { TimedInput }
/// TimedInput    = ( Direction | Button ) [ TIMING ]
/// ```
///
/// with one token of lookahead. Syntax errors never stop the parse.
pub struct Parser<R> {
    scanner: Scanner<R>,
    la: Token,
    error_distance: usize,
    outcome: ParseOutcome,
}

impl<R: Read> Parser<R> {
    pub fn new(mut scanner: Scanner<R>) -> Self {
        let la = scanner.next_token();
        Self {
            scanner,
            la,
            error_distance: MIN_ERROR_DISTANCE,
            outcome: ParseOutcome::default(),
        }
    }

    pub fn parse(mut self) -> ParseOutcome {
        self.program();
        self.outcome
    }

    /// Consume the lookahead as part of the program.
    fn get(&mut self) -> Token {
        let next = self.scanner.next_token();
        self.error_distance += 1;
        std::mem::replace(&mut self.la, next)
    }

    /// Drop the lookahead during recovery. Skipped tokens do not count
    /// towards the error distance.
    fn skip(&mut self) {
        self.la = self.scanner.next_token();
    }

    fn syntax_error(&mut self, kind: SyntaxErrorKind) {
        if self.error_distance >= MIN_ERROR_DISTANCE {
            let error = SyntaxError::from_token(&self.la, kind);
            self.outcome.errors.push(error);
        }
        self.error_distance = 0;
    }

    fn expect(&mut self, kind: TokenKind) {
        if self.la.kind == kind {
            self.get();
        } else {
            self.syntax_error(SyntaxErrorKind::Expected(kind));
        }
    }

    /// Tokens the sequence body can resynchronize on.
    fn in_sync_set(kind: TokenKind) -> bool {
        kind.starts_timed_input() || matches!(kind, TokenKind::SequenceEnd | TokenKind::EndOfInput)
    }

    fn program(&mut self) {
        self.expect(TokenKind::SequenceStart);
        self.timed_sequence();
        self.expect(TokenKind::SequenceEnd);

        if self.la.kind != TokenKind::EndOfInput {
            self.syntax_error(SyntaxErrorKind::Expected(TokenKind::EndOfInput));
            while self.la.kind != TokenKind::EndOfInput {
                self.skip();
            }
        }
    }

    fn timed_sequence(&mut self) {
        if !self.la.kind.starts_timed_input() {
            self.invalid_timed_input();
            while !Self::in_sync_set(self.la.kind) {
                self.skip();
            }
        }

        while !matches!(self.la.kind, TokenKind::SequenceEnd | TokenKind::EndOfInput) {
            if self.la.kind.starts_timed_input() {
                self.timed_input();
            } else {
                self.invalid_timed_input();
                self.skip();
            }
        }
    }

    fn invalid_timed_input(&mut self) {
        let found = self.la.text.clone();
        self.syntax_error(SyntaxErrorKind::InvalidTimedInput { found });
    }

    fn timed_input(&mut self) {
        let command = match self.la.kind.command() {
            Some(command) => command,
            None => return,
        };
        self.get();

        let mut delay_ms = 0;
        if self.la.kind == TokenKind::Timing {
            let payload = self.la.timing_payload().map(str::parse::<i64>);
            match payload {
                Some(Ok(value)) => delay_ms = value,
                _ => {
                    let literal = self.la.text.clone();
                    self.syntax_error(SyntaxErrorKind::MalformedTiming { literal });
                }
            }
            self.get();
        }

        self.outcome.sequence.push(TimedCommand::from((command, delay_ms)));
    }
}

/// Parse a complete in-memory source.
pub fn parse_source(source: &str) -> ParseOutcome {
    Parser::new(Scanner::from_source(source)).parse()
}

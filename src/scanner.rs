use std::io::{ErrorKind, Read};
use tracing::warn;
use crate::token::{Token, TokenKind};

const MIN_BUFFER_LENGTH: usize = 1024;
const BYTE_ORDER_MARK: [u8; 3] = [0xEF, 0xBB, 0xBF];

const KEYWORDS: [(&[u8], TokenKind); 14] = [
    (b"UP", TokenKind::Up),
    (b"DOWN", TokenKind::Down),
    (b"LEFT", TokenKind::Left),
    (b"RIGHT", TokenKind::Right),
    (b"FORWARD", TokenKind::Forward),
    (b"BACK", TokenKind::Back),
    (b"LP", TokenKind::LowPunch),
    (b"HP", TokenKind::HighPunch),
    (b"LK", TokenKind::LowKick),
    (b"HK", TokenKind::HighKick),
    (b"BL", TokenKind::Block),
    (b"RUN", TokenKind::Run),
    (b"SEQUENCE_START", TokenKind::SequenceStart),
    (b"SEQUENCE_END", TokenKind::SequenceEnd),
];

/// Growable byte window over a reader.
///
/// Bytes are pulled from the reader only when the scanner needs them, and the
/// backing storage doubles whenever it fills up, so in-memory strings and
/// streamed sources of any length go through the same path.
///
/// Consumed bytes are never released: the buffer ends up holding the whole
/// source, which keeps byte offsets valid as plain indices.
pub struct SourceBuffer<R> {
    reader: Option<R>,
    buf: Vec<u8>,
    len: usize,
    pos: usize,
}

impl<R: Read> SourceBuffer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: vec![0; MIN_BUFFER_LENGTH],
            len: 0,
            pos: 0,
        }
    }

    /// Byte offset of the next byte `advance` would return.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek_at(0)?;
        self.pos += 1;
        Some(byte)
    }

    pub fn peek(&mut self) -> Option<u8> {
        self.peek_at(0)
    }

    pub fn peek_at(&mut self, ahead: usize) -> Option<u8> {
        while self.pos + ahead >= self.len {
            if !self.fill() {
                return None;
            }
        }
        Some(self.buf[self.pos + ahead])
    }

    fn fill(&mut self) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };

        if self.len == self.buf.len() {
            let grown = self.buf.len() * 2;
            self.buf.resize(grown, 0);
        }

        loop {
            match reader.read(&mut self.buf[self.len..]) {
                Ok(0) => {
                    self.reader = None;
                    return false;
                }
                Ok(read) => {
                    self.len += read;
                    return true;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("source read failed at byte {}, treating as end of input: {}", self.len, e);
                    self.reader = None;
                    return false;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Start,
    Keyword,
    TimingMark,
    TimingColon,
    TimingDigits,
    Accept(TokenKind),
}

#[derive(Debug, PartialEq)]
enum Step {
    Shift(State),
    Accept(TokenKind),
    Reject,
}

enum Progress {
    Partial,
    Complete(TokenKind),
    Dead,
}

fn keyword_progress(matched: &[u8], ch: u8) -> Progress {
    let depth = matched.len();
    let mut partial = false;

    for (keyword, kind) in KEYWORDS {
        if keyword.len() > depth && keyword.starts_with(matched) && keyword[depth] == ch {
            if keyword.len() == depth + 1 {
                return Progress::Complete(kind);
            }
            partial = true;
        }
    }

    if partial {
        Progress::Partial
    } else {
        Progress::Dead
    }
}

/// Transition function of the token automaton.
///
/// Keywords are accepted as soon as their last character is shifted, TIMING
/// is accepted on the first non-digit after `T:` and at least one digit.
fn step(state: State, matched: &[u8], ch: Option<u8>) -> Step {
    match (state, ch) {
        (State::Accept(kind), _) => Step::Accept(kind),
        (State::Start, Some(b'T')) => Step::Shift(State::TimingMark),
        (State::Start | State::Keyword, Some(ch)) => match keyword_progress(matched, ch) {
            Progress::Partial => Step::Shift(State::Keyword),
            Progress::Complete(kind) => Step::Shift(State::Accept(kind)),
            Progress::Dead => Step::Reject,
        },
        (State::TimingMark, Some(b':')) => Step::Shift(State::TimingColon),
        (State::TimingColon | State::TimingDigits, Some(b'0'..=b'9')) => {
            Step::Shift(State::TimingDigits)
        }
        (State::TimingDigits, _) => Step::Accept(TokenKind::Timing),
        _ => Step::Reject,
    }
}

fn is_blank(ch: u8) -> bool {
    ch.is_ascii_whitespace() || ch == 0x0B
}

fn is_continuation(ch: u8) -> bool {
    (0x80..0xC0).contains(&ch)
}

pub struct Scanner<R> {
    buffer: SourceBuffer<R>,
    ch: Option<u8>,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Scanner<&'a [u8]> {
    pub fn from_source(source: &'a str) -> Self {
        Scanner::new(source.as_bytes())
    }
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        let mut buffer = SourceBuffer::new(reader);

        let has_bom = (0..BYTE_ORDER_MARK.len())
            .all(|i| buffer.peek_at(i) == Some(BYTE_ORDER_MARK[i]));
        if has_bom {
            for _ in 0..BYTE_ORDER_MARK.len() {
                buffer.advance();
            }
        }

        let mut scanner = Self {
            buffer,
            ch: None,
            pos: 0,
            line: 1,
            column: 0,
            finished: false,
        };
        scanner.next_ch();
        scanner
    }

    fn next_ch(&mut self) {
        self.pos = self.buffer.position();
        self.ch = self.buffer.advance();

        if let Some(ch) = self.ch {
            if !is_continuation(ch) {
                self.column += 1;
            }
            // A lone carriage return ends a line on its own.
            if ch == b'\r' && self.buffer.peek() != Some(b'\n') {
                self.ch = Some(b'\n');
            }
            if self.ch == Some(b'\n') {
                self.line += 1;
                self.column = 0;
            }
        }
    }

    fn add_ch(&mut self, text: &mut Vec<u8>) {
        if let Some(ch) = self.ch {
            text.push(ch);
            self.next_ch();
        }
    }

    fn skip_blanks(&mut self) {
        loop {
            match self.ch {
                Some(ch) if is_blank(ch) => self.next_ch(),
                Some(b'/') if self.buffer.peek() == Some(b'/') => {
                    while !matches!(self.ch, None | Some(b'\n' | b'\r')) {
                        self.next_ch();
                    }
                }
                _ => break,
            }
        }
    }

    /// Consume the rest of a non-blank run into an invalid token.
    fn absorb_run(&mut self, text: &mut Vec<u8>) {
        while let Some(ch) = self.ch {
            if is_blank(ch) {
                break;
            }
            self.add_ch(text);
        }
    }

    /// Produce the next token. Once the input is exhausted every call
    /// returns an `EndOfInput` token positioned at the end of the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_blanks();

        let (byte_offset, line, column) = (self.pos, self.line, self.column);
        let mut text = Vec::new();

        let kind = if self.ch.is_none() {
            TokenKind::EndOfInput
        } else {
            let mut state = State::Start;
            loop {
                match step(state, &text, self.ch) {
                    Step::Shift(next) => {
                        self.add_ch(&mut text);
                        state = next;
                    }
                    Step::Accept(kind) => break kind,
                    Step::Reject => {
                        self.absorb_run(&mut text);
                        break TokenKind::Invalid;
                    }
                }
            }
        };

        Token {
            kind,
            text: String::from_utf8_lossy(&text).into_owned(),
            line,
            column: column.max(1),
            byte_offset,
        }
    }
}

impl<R: Read> Iterator for Scanner<R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::EndOfInput {
            self.finished = true;
        }
        Some(token)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl Token {
    /// Millisecond payload of a TIMING token, i.e. the digits after `T:`.
    pub fn timing_payload(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Timing => self.text.get(2..),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EndOfInput,

    // Directions
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,

    // Buttons
    LowPunch,   // LP
    HighPunch,  // HP
    LowKick,    // LK
    HighKick,   // HK
    Block,      // BL
    Run,        // RUN

    Timing,        // T:<digits>
    SequenceStart, // SEQUENCE_START
    SequenceEnd,   // SEQUENCE_END

    Invalid,
}

impl TokenKind {
    /// Numeric token id used in syntax diagnostics.
    pub fn id(self) -> u8 {
        match self {
            TokenKind::EndOfInput => 0,
            TokenKind::Up => 1,
            TokenKind::Down => 2,
            TokenKind::Left => 3,
            TokenKind::Right => 4,
            TokenKind::Forward => 5,
            TokenKind::Back => 6,
            TokenKind::LowPunch => 7,
            TokenKind::HighPunch => 8,
            TokenKind::LowKick => 9,
            TokenKind::HighKick => 10,
            TokenKind::Block => 11,
            TokenKind::Run => 12,
            TokenKind::Timing => 13,
            TokenKind::SequenceStart => 14,
            TokenKind::SequenceEnd => 15,
            TokenKind::Invalid => 16,
        }
    }

    pub fn command(self) -> Option<Command> {
        match self {
            TokenKind::Up => Some(Command::Up),
            TokenKind::Down => Some(Command::Down),
            TokenKind::Left => Some(Command::Left),
            TokenKind::Right => Some(Command::Right),
            TokenKind::Forward => Some(Command::Forward),
            TokenKind::Back => Some(Command::Back),
            TokenKind::LowPunch => Some(Command::LowPunch),
            TokenKind::HighPunch => Some(Command::HighPunch),
            TokenKind::LowKick => Some(Command::LowKick),
            TokenKind::HighKick => Some(Command::HighKick),
            TokenKind::Block => Some(Command::Block),
            TokenKind::Run => Some(Command::Run),
            _ => None,
        }
    }

    pub fn is_direction(self) -> bool {
        self.command().is_some_and(Command::is_direction)
    }

    pub fn is_button(self) -> bool {
        self.command().is_some_and(|command| !command.is_direction())
    }

    /// FIRST set of a timed input: any direction or button.
    pub fn starts_timed_input(self) -> bool {
        self.command().is_some()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::EndOfInput => "EOF",
            TokenKind::Timing => "TIMING",
            TokenKind::SequenceStart => "SEQUENCE_START",
            TokenKind::SequenceEnd => "SEQUENCE_END",
            TokenKind::Invalid => "???",
            other => match other.command() {
                Some(command) => command.name(),
                None => "???",
            },
        };
        f.pad(name)
    }
}

/// One of the twelve controller commands, spelled the way source text spells it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "LEFT")]
    Left,
    #[serde(rename = "RIGHT")]
    Right,
    #[serde(rename = "FORWARD")]
    Forward,
    #[serde(rename = "BACK")]
    Back,
    #[serde(rename = "LP")]
    LowPunch,
    #[serde(rename = "HP")]
    HighPunch,
    #[serde(rename = "LK")]
    LowKick,
    #[serde(rename = "HK")]
    HighKick,
    #[serde(rename = "BL")]
    Block,
    #[serde(rename = "RUN")]
    Run,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::Up,
        Command::Down,
        Command::Left,
        Command::Right,
        Command::Forward,
        Command::Back,
        Command::LowPunch,
        Command::HighPunch,
        Command::LowKick,
        Command::HighKick,
        Command::Block,
        Command::Run,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Up => "UP",
            Command::Down => "DOWN",
            Command::Left => "LEFT",
            Command::Right => "RIGHT",
            Command::Forward => "FORWARD",
            Command::Back => "BACK",
            Command::LowPunch => "LP",
            Command::HighPunch => "HP",
            Command::LowKick => "LK",
            Command::HighKick => "HK",
            Command::Block => "BL",
            Command::Run => "RUN",
        }
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|command| command.name() == name)
    }

    pub fn is_direction(self) -> bool {
        matches!(
            self,
            Command::Up
                | Command::Down
                | Command::Left
                | Command::Right
                | Command::Forward
                | Command::Back
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Up => "Direction up",
            Command::Down => "Direction down",
            Command::Left => "Direction left",
            Command::Right => "Direction right",
            Command::Forward => "Direction forward",
            Command::Back => "Direction back",
            Command::LowPunch => "Low Punch",
            Command::HighPunch => "High Punch",
            Command::LowKick => "Low Kick",
            Command::HighKick => "High Kick",
            Command::Block => "Block",
            Command::Run => "Run",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

use crate::token::Command;
use crate::token::Command::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveCategory {
    Fatality,
    Brutality,
    Friendship,
}

impl MoveCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveCategory::Fatality => "FATALITY",
            MoveCategory::Brutality => "BRUTALITY",
            MoveCategory::Friendship => "FRIENDSHIP",
        }
    }
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: MoveCategory,
    pub character_name: &'static str,
    pub description: &'static str,
    pub sequence: &'static [Command],
}

impl MoveDefinition {
    /// Whether `commands` spells out exactly this move.
    pub fn matches(&self, commands: &[&str]) -> bool {
        commands.len() == self.sequence.len() && self.starts_with(commands)
    }

    /// Whether `commands` is a strict, non-empty prefix of this move.
    pub fn has_prefix(&self, commands: &[&str]) -> bool {
        !commands.is_empty() && commands.len() < self.sequence.len() && self.starts_with(commands)
    }

    /// Command expected after `typed` inputs, if the move is longer than that.
    pub fn command_at(&self, typed: usize) -> Option<Command> {
        self.sequence.get(typed).copied()
    }

    fn starts_with(&self, commands: &[&str]) -> bool {
        commands.len() <= self.sequence.len()
            && self
                .sequence
                .iter()
                .zip(commands)
                .all(|(expected, given)| expected.name() == *given)
    }
}

static CYRAX_MOVES: [MoveDefinition; 4] = [
    MoveDefinition {
        id: "FATALITY_SELF_DESTRUCT",
        name: "Self-Destruct",
        category: MoveCategory::Fatality,
        character_name: "Cyrax",
        description: "Cyrax self-destructs in a massive explosion",
        sequence: &[Down, Down, Up, Down, HighPunch],
    },
    MoveDefinition {
        id: "FATALITY_HELICOPTER",
        name: "Helicopter",
        category: MoveCategory::Fatality,
        character_name: "Cyrax",
        description: "Cyrax uses his rotor blades to shred the opponent",
        sequence: &[Down, Down, Forward, Up, Run],
    },
    MoveDefinition {
        id: "BRUTALITY_CYRAX",
        name: "Cyrax Brutality",
        category: MoveCategory::Brutality,
        character_name: "Cyrax",
        description: "Devastating combination of 11 consecutive hits",
        sequence: &[
            HighPunch, LowKick, HighKick, HighKick, LowPunch, LowPunch, HighPunch, LowPunch,
            LowKick, HighKick, LowKick,
        ],
    },
    MoveDefinition {
        id: "FRIENDSHIP_CYRAX",
        name: "Cyrax Friendship",
        category: MoveCategory::Friendship,
        character_name: "Cyrax",
        description: "Cyrax offers a gesture of friendship",
        sequence: &[Run, Run, Run, Up],
    },
];

/// Read-only registry of known moves, in registration order.
///
/// Catalogs wrap `'static` data, so one instance can be shared by any number
/// of concurrent compilations without locking.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    moves: &'static [MoveDefinition],
}

impl Catalog {
    pub const fn new(moves: &'static [MoveDefinition]) -> Self {
        Self { moves }
    }

    pub fn builtin() -> Self {
        Self::new(&CYRAX_MOVES)
    }

    pub fn moves(&self) -> &'static [MoveDefinition] {
        self.moves
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static MoveDefinition> {
        self.moves.iter()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&'static MoveDefinition> {
        self.moves.iter().find(|m| m.id == id)
    }

    /// First move, in registration order, whose sequence equals `commands`.
    pub fn find_by_sequence(&self, commands: &[&str]) -> Option<&'static MoveDefinition> {
        self.moves.iter().find(|m| m.matches(commands))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_moves_are_well_formed() {
        let catalog = Catalog::builtin();
        let mut ids = HashSet::new();
        let mut sequences = HashSet::new();

        for m in catalog.iter() {
            assert!(!m.sequence.is_empty(), "{} has an empty sequence", m.id);
            assert!(ids.insert(m.id), "duplicate id {}", m.id);
            assert!(sequences.insert(m.sequence), "duplicate sequence for {}", m.id);
        }
        assert_eq!(catalog.moves().len(), 4);
    }

    #[test]
    fn finds_moves_by_sequence_and_id() {
        let catalog = Catalog::builtin();
        let found = catalog.find_by_sequence(&["DOWN", "DOWN", "UP", "DOWN", "HP"]);
        assert_eq!(found.map(|m| m.id), Some("FATALITY_SELF_DESTRUCT"));
        assert_eq!(catalog.find_by_sequence(&["DOWN", "DOWN", "UP", "DOWN"]), None);
        assert_eq!(catalog.find_by_id("FRIENDSHIP_CYRAX").map(|m| m.name), Some("Cyrax Friendship"));
    }

    #[test]
    fn prefix_is_strict_and_non_empty() {
        let friendship = Catalog::builtin().find_by_id("FRIENDSHIP_CYRAX").unwrap();
        assert!(friendship.has_prefix(&["RUN"]));
        assert!(friendship.has_prefix(&["RUN", "RUN", "RUN"]));
        assert!(!friendship.has_prefix(&["RUN", "RUN", "RUN", "UP"]));
        assert!(!friendship.has_prefix(&[]));
        assert!(!friendship.has_prefix(&["UP"]));
        assert_eq!(friendship.command_at(3), Some(Command::Up));
        assert_eq!(friendship.command_at(4), None);
    }

    #[test]
    fn category_serializes_uppercase() {
        let json = serde_json::to_string(&MoveCategory::Brutality).unwrap();
        assert_eq!(json, "\"BRUTALITY\"");
    }
}

use crate::catalog::{Catalog, MoveDefinition};
use crate::error::MatchError;
use crate::parser::TimedCommand;
use std::collections::BTreeMap;

fn command_names(sequence: &[TimedCommand]) -> Vec<&str> {
    sequence.iter().map(|input| input.command.as_str()).collect()
}

/// Positional matching of command sequences against a move catalog.
/// Delays are ignored here; only the order of command names matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMatcher {
    catalog: Catalog,
}

impl SequenceMatcher {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn identify_move(
        &self,
        sequence: &[TimedCommand],
    ) -> Result<&'static MoveDefinition, MatchError> {
        if sequence.is_empty() {
            return Err(MatchError::EmptySequence);
        }

        let commands = command_names(sequence);
        self.catalog
            .find_by_sequence(&commands)
            .ok_or_else(|| MatchError::NoMatch {
                commands: commands.iter().map(|c| c.to_string()).collect(),
            })
    }

    /// True while `partial` is still on the way to at least one move.
    /// An empty or already complete sequence is not an in-progress prefix.
    pub fn is_valid_prefix(&self, partial: &[TimedCommand]) -> bool {
        let commands = command_names(partial);
        self.catalog.iter().any(|m| m.has_prefix(&commands))
    }

    /// Moves that `partial` can still grow into. Nothing typed yet leaves
    /// every move open.
    pub fn possible_moves(&self, partial: &[TimedCommand]) -> Vec<&'static MoveDefinition> {
        if partial.is_empty() {
            return self.catalog.iter().collect();
        }

        let commands = command_names(partial);
        self.catalog
            .iter()
            .filter(|m| m.has_prefix(&commands))
            .collect()
    }

    /// Next command each still-possible move expects, keyed by move name.
    pub fn next_expected_inputs(&self, partial: &[TimedCommand]) -> BTreeMap<String, String> {
        self.possible_moves(partial)
            .into_iter()
            .filter_map(|m| {
                m.command_at(partial.len())
                    .map(|next| (m.name.to_string(), next.name().to_string()))
            })
            .collect()
    }
}

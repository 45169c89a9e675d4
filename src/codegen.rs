use crate::catalog::MoveDefinition;
use crate::parser::TimedCommand;
use crate::timing::total_duration;
use crate::token::Command;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const UNKNOWN_COMMAND: &str = "Unknown command";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub position: usize,
    pub command: String,
    pub timing_ms: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateCode {
    pub move_category: String,
    pub move_name: String,
    pub move_id: String,
    pub instructions: Vec<Instruction>,
    pub total_duration_ms: i64,
    pub metadata: BTreeMap<String, Value>,
}

impl IntermediateCode {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

pub fn describe(command: &str) -> &'static str {
    Command::from_name(command)
        .map(Command::description)
        .unwrap_or(UNKNOWN_COMMAND)
}

/// Structured form of a matched, timing-valid sequence. Positions are 0-based.
pub fn generate(sequence: &[TimedCommand], mv: &MoveDefinition) -> IntermediateCode {
    let instructions = sequence
        .iter()
        .enumerate()
        .map(|(position, input)| Instruction {
            position,
            command: input.command.clone(),
            timing_ms: input.delay_ms,
            description: describe(&input.command).to_string(),
        })
        .collect();

    let mut metadata = BTreeMap::new();
    metadata.insert("character".to_string(), Value::from(mv.character_name));
    metadata.insert("description".to_string(), Value::from(mv.description));
    metadata.insert("category".to_string(), Value::from(mv.category.as_str()));
    metadata.insert("inputCount".to_string(), Value::from(sequence.len()));

    IntermediateCode {
        move_category: mv.category.to_string(),
        move_name: mv.name.to_string(),
        move_id: mv.id.to_string(),
        instructions,
        total_duration_ms: total_duration(sequence),
        metadata,
    }
}

/// Human-readable rendering of the same code. The output depends only on
/// the inputs, so equal inputs always produce identical text.
pub fn generate_text(sequence: &[TimedCommand], mv: &MoveDefinition) -> String {
    let total = total_duration(sequence);

    let mut lines = vec![
        "//================================================".to_string(),
        "// GENERATED INTERMEDIATE CODE".to_string(),
        "//================================================".to_string(),
        String::new(),
        format!("// Character: {}", mv.character_name),
        format!("// Move: {} - {}", mv.category, mv.name),
        format!("// Description: {}", mv.description),
        format!("// Input count: {}", sequence.len()),
        format!("// Total duration: {}ms", total),
        String::new(),
        "EXECUTE {".to_string(),
        format!("    MOVE_TYPE: {}", mv.category),
        format!("    MOVE_ID: {}", mv.id),
        format!("    MOVE_NAME: \"{}\"", mv.name),
        format!("    CHARACTER: \"{}\"", mv.character_name),
        String::new(),
        "    SEQUENCE: [".to_string(),
    ];

    for input in sequence {
        lines.push("        {".to_string());
        lines.push(format!("            COMMAND: \"{}\",", input.command));
        lines.push(format!("            TIMING: {}ms,", input.delay_ms));
        lines.push(format!("            DESCRIPTION: \"{}\"", describe(&input.command)));
        lines.push("        },".to_string());
    }

    lines.extend([
        "    ]".to_string(),
        String::new(),
        "    ANIMATION: {".to_string(),
        "        START: true,".to_string(),
        format!("        DURATION: {}ms,", total),
        format!("        TYPE: \"{}\"", mv.category),
        "    }".to_string(),
        "}".to_string(),
        String::new(),
        "// END OF INTERMEDIATE CODE".to_string(),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn self_destruct() -> (Vec<TimedCommand>, &'static MoveDefinition) {
        let sequence = vec![
            TimedCommand::new("DOWN", 0),
            TimedCommand::new("DOWN", 150),
            TimedCommand::new("UP", 180),
            TimedCommand::new("DOWN", 200),
            TimedCommand::new("HP", 175),
        ];
        let mv = Catalog::builtin().find_by_id("FATALITY_SELF_DESTRUCT").unwrap();
        (sequence, mv)
    }

    #[test]
    fn structured_code_mirrors_the_sequence() {
        let (sequence, mv) = self_destruct();
        let code = generate(&sequence, mv);

        assert_eq!(code.move_id, "FATALITY_SELF_DESTRUCT");
        assert_eq!(code.move_category, "FATALITY");
        assert_eq!(code.len(), 5);
        assert_eq!(code.total_duration_ms, 705);
        assert_eq!(code.instructions[4].position, 4);
        assert_eq!(code.instructions[4].command, "HP");
        assert_eq!(code.instructions[4].timing_ms, 175);
        assert_eq!(code.instructions[4].description, "High Punch");
        assert_eq!(code.metadata["character"], Value::from("Cyrax"));
        assert_eq!(code.metadata["inputCount"], Value::from(5));
    }

    #[test]
    fn unknown_commands_fall_back_to_a_generic_description() {
        let (_, mv) = self_destruct();
        let code = generate(&[TimedCommand::new("JUMP", 0)], mv);
        assert_eq!(code.instructions[0].description, "Unknown command");
    }

    #[test]
    fn text_form_embeds_move_and_every_input() {
        let (sequence, mv) = self_destruct();
        let text = generate_text(&sequence, mv);

        assert!(text.contains("MOVE_ID: FATALITY_SELF_DESTRUCT"));
        assert!(text.contains("MOVE_NAME: \"Self-Destruct\""));
        assert!(text.contains("CHARACTER: \"Cyrax\""));
        assert!(text.contains("DURATION: 705ms,"));
        assert!(text.contains("COMMAND: \"UP\",\n            TIMING: 180ms,"));
        assert_eq!(text.matches("COMMAND:").count(), 5);
        assert!(text.ends_with("// END OF INTERMEDIATE CODE\n"));
    }

    #[test]
    fn text_layout_is_fixed() {
        let (sequence, mv) = self_destruct();
        let text = generate_text(&sequence, mv);

        assert!(text.starts_with(
            "//================================================\n// GENERATED INTERMEDIATE CODE\n"
        ));
        assert!(text.contains("// Total duration: 705ms\n\nEXECUTE {\n    MOVE_TYPE: FATALITY\n"));
        assert!(text.contains("        },\n    ]\n\n    ANIMATION: {\n        START: true,\n"));
        assert!(text.contains("        TYPE: \"FATALITY\"\n    }\n}\n\n// END"));
    }

    #[test]
    fn generation_is_deterministic() {
        let (sequence, mv) = self_destruct();
        assert_eq!(generate_text(&sequence, mv), generate_text(&sequence, mv));
        assert_eq!(generate(&sequence, mv), generate(&sequence, mv));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let (sequence, mv) = self_destruct();
        let json = serde_json::to_value(generate(&sequence, mv)).unwrap();
        assert_eq!(json["moveCategory"], "FATALITY");
        assert_eq!(json["totalDurationMs"], 705);
        assert_eq!(json["instructions"][1]["timingMs"], 150);
    }
}

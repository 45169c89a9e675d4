use crate::codegen::describe;
use crate::error::CompilerError;
use crate::parser::TimedCommand;
use crate::timing::total_duration;
use regex::Regex;

fn source_line(input: &TimedCommand) -> String {
    if input.delay_ms > 0 {
        format!("{} T:{}\n", input.command, input.delay_ms)
    } else {
        format!("{}\n", input.command)
    }
}

/// Plain source text for `sequence`. Only positive delays get a `T:`
/// annotation since a missing one already means 0.
pub fn to_source(sequence: &[TimedCommand]) -> String {
    let mut out = String::from("SEQUENCE_START\n");
    for input in sequence {
        out.push_str(&source_line(input));
    }
    out.push_str("SEQUENCE_END\n");
    out
}

/// Same as [`to_source`] with `//` comments naming each input.
pub fn to_annotated_source(sequence: &[TimedCommand]) -> String {
    let mut out = format!(
        "// {} inputs, {}ms total\nSEQUENCE_START\n",
        sequence.len(),
        total_duration(sequence)
    );

    for (index, input) in sequence.iter().enumerate() {
        out.push_str(&format!("// {}: {}\n", index + 1, describe(&input.command)));
        out.push_str(&source_line(input));
    }

    out.push_str("SEQUENCE_END\n");
    out
}

/// Recover the command/delay pairs from text produced by
/// [`crate::codegen::generate_text`].
pub fn sequence_from_generated_text(text: &str) -> Result<Vec<TimedCommand>, CompilerError> {
    let pattern = Regex::new(r#"COMMAND:\s*"([A-Z]+)",\s*TIMING:\s*(-?\d+)ms"#)?;
    let mut sequence = Vec::new();

    for cap in pattern.captures_iter(text) {
        if let (Some(command), Some(timing)) = (cap.get(1), cap.get(2)) {
            let delay_ms = timing.as_str().parse::<i64>().map_err(|_| {
                CompilerError::InvalidSequence(format!("timing out of range: {}", timing.as_str()))
            })?;
            sequence.push(TimedCommand::new(command.as_str(), delay_ms));
        }
    }

    if sequence.is_empty() {
        return Err(CompilerError::InvalidSequence(
            "no COMMAND/TIMING entries found in generated code".to_string(),
        ));
    }

    Ok(sequence)
}

/// Turn generated intermediate text back into compilable source.
pub fn from_generated_text(text: &str) -> Result<String, CompilerError> {
    sequence_from_generated_text(text).map(|sequence| to_source(&sequence))
}

use crate::catalog::{Catalog, MoveDefinition};
use crate::codegen::{self, IntermediateCode};
use crate::config::TimingConfig;
use crate::matcher::SequenceMatcher;
use crate::parser::{ParseOutcome, Parser, TimedCommand};
use crate::scanner::Scanner;
use crate::timing::{total_duration, TimingStatistics, TimingValidator};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, info, warn};

/// Everything a caller gets back from one compilation.
///
/// A result is either fully successful (matched, timing-valid, code
/// generated) or carries `success: false` and at least one error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub success: bool,
    pub move_category: Option<String>,
    pub move_name: Option<String>,
    pub move_id: Option<String>,
    pub errors: Vec<String>,
    pub validated_sequence: Vec<TimedCommand>,
    pub intermediate_code: Option<IntermediateCode>,
    pub text_code: Option<String>,
    pub total_duration_ms: i64,
}

impl CompilationResult {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            ..Self::default()
        }
    }
}

/// Pipeline driver: scan, parse, validate timing, match, generate.
///
/// A `Compiler` holds no per-compilation state, so `&Compiler` can be shared
/// across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    validator: TimingValidator,
    matcher: SequenceMatcher,
}

impl Compiler {
    pub fn new(timing: TimingConfig) -> Self {
        Self::with_catalog(timing, Catalog::builtin())
    }

    pub fn with_catalog(timing: TimingConfig, catalog: Catalog) -> Self {
        Self {
            validator: TimingValidator::new(timing),
            matcher: SequenceMatcher::new(catalog),
        }
    }

    pub fn catalog(&self) -> Catalog {
        self.matcher.catalog()
    }

    pub fn timing_config(&self) -> &TimingConfig {
        self.validator.config()
    }

    pub fn compile_source(&self, source: &str) -> CompilationResult {
        self.compile_parsed(Parser::new(Scanner::from_source(source)).parse())
    }

    pub fn compile_reader<R: Read>(&self, reader: R) -> CompilationResult {
        self.compile_parsed(Parser::new(Scanner::new(reader)).parse())
    }

    fn compile_parsed(&self, outcome: ParseOutcome) -> CompilationResult {
        if outcome.is_clean() {
            debug!("parsed {} inputs", outcome.sequence.len());
            return self.compile_sequence(&outcome.sequence);
        }

        warn!("{} syntax error(s)", outcome.error_count());
        let mut errors: Vec<String> = outcome.errors.iter().map(ToString::to_string).collect();

        // Later stages still run on whatever was recovered so the caller
        // sees timing and matching problems too, but nothing is generated.
        match self.validator.validate(&outcome.sequence) {
            Ok(()) => {
                if let Err(e) = self.matcher.identify_move(&outcome.sequence) {
                    errors.push(e.to_string());
                }
            }
            Err(timing) => errors.extend(timing.iter().map(ToString::to_string)),
        }

        CompilationResult::failed(errors)
    }

    /// Compile an already-parsed sequence, e.g. one captured directly from
    /// a controller.
    pub fn compile_sequence(&self, sequence: &[TimedCommand]) -> CompilationResult {
        if let Err(timing) = self.validator.validate(sequence) {
            debug!("timing validation failed with {} error(s)", timing.len());
            return CompilationResult::failed(timing.iter().map(ToString::to_string).collect());
        }

        let mv = match self.matcher.identify_move(sequence) {
            Ok(mv) => mv,
            Err(e) => {
                debug!("{}", e);
                return CompilationResult::failed(vec![e.to_string()]);
            }
        };

        info!("compiled {} ({})", mv.name, mv.id);
        self.succeeded(sequence, mv)
    }

    fn succeeded(&self, sequence: &[TimedCommand], mv: &MoveDefinition) -> CompilationResult {
        CompilationResult {
            success: true,
            move_category: Some(mv.category.to_string()),
            move_name: Some(mv.name.to_string()),
            move_id: Some(mv.id.to_string()),
            errors: Vec::new(),
            validated_sequence: sequence.to_vec(),
            intermediate_code: Some(codegen::generate(sequence, mv)),
            text_code: Some(codegen::generate_text(sequence, mv)),
            total_duration_ms: total_duration(sequence),
        }
    }

    pub fn is_valid_prefix(&self, partial: &[TimedCommand]) -> bool {
        self.matcher.is_valid_prefix(partial)
    }

    pub fn possible_moves(&self, partial: &[TimedCommand]) -> Vec<&'static MoveDefinition> {
        self.matcher.possible_moves(partial)
    }

    pub fn next_expected_inputs(&self, partial: &[TimedCommand]) -> BTreeMap<String, String> {
        self.matcher.next_expected_inputs(partial)
    }

    pub fn timing_statistics(&self, sequence: &[TimedCommand]) -> TimingStatistics {
        self.validator.statistics(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_DESTRUCT: &str =
        "SEQUENCE_START\nDOWN T:0\nDOWN T:150\nUP T:180\nDOWN T:200\nHP T:175\nSEQUENCE_END";

    #[test]
    fn compiles_self_destruct() {
        let result = Compiler::default().compile_source(SELF_DESTRUCT);

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.move_id.as_deref(), Some("FATALITY_SELF_DESTRUCT"));
        assert_eq!(result.move_name.as_deref(), Some("Self-Destruct"));
        assert_eq!(result.move_category.as_deref(), Some("FATALITY"));
        assert_eq!(result.total_duration_ms, 705);
        assert_eq!(result.validated_sequence.len(), 5);
        assert_eq!(result.intermediate_code.as_ref().map(|c| c.len()), Some(5));
        assert!(result.text_code.unwrap().contains("MOVE_ID: FATALITY_SELF_DESTRUCT"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn reader_and_string_inputs_agree() {
        let compiler = Compiler::default();
        assert_eq!(
            compiler.compile_reader(SELF_DESTRUCT.as_bytes()),
            compiler.compile_source(SELF_DESTRUCT)
        );
    }

    #[test]
    fn syntax_errors_come_first_and_block_generation() {
        let result = Compiler::default()
            .compile_source("SEQUENCE_START DOWN T:0 JUMP DOWN T:150 SEQUENCE_END");

        assert!(!result.success);
        assert!(result.errors[0].starts_with("SyntaxError:"));
        assert!(result.errors.iter().any(|e| e.starts_with("MatchError:")));
        assert!(result.intermediate_code.is_none());
        assert!(result.move_name.is_none());
        assert_eq!(result.total_duration_ms, 0);
    }

    #[test]
    fn syntax_errors_still_report_timing_context() {
        let result = Compiler::default()
            .compile_source("SEQUENCE_START DOWN T:0 DOWN T:10 UP T:180 DOWN T:200 HP T:175 SEQUENCE_END XX");

        assert!(!result.success);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("SyntaxError:"));
        assert!(result.errors[1].starts_with("TimingError:"));
    }

    #[test]
    fn timing_failure_skips_matching() {
        let result = Compiler::default().compile_source(
            "SEQUENCE_START UP T:0 UP T:2500 HP T:10 SEQUENCE_END",
        );
        assert!(!result.success);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.starts_with("TimingError:")));
    }

    #[test]
    fn stricter_config_changes_the_verdict() {
        let strict = Compiler::new(TimingConfig { timeout_ms: 160, ..TimingConfig::default() });
        let result = strict.compile_source(SELF_DESTRUCT);
        assert!(!result.success);
        assert!(result.errors[0].contains("input 3"));
    }

    #[test]
    fn result_serializes_camel_case() {
        let json = serde_json::to_value(Compiler::default().compile_source(SELF_DESTRUCT)).unwrap();
        assert_eq!(json["moveId"], "FATALITY_SELF_DESTRUCT");
        assert_eq!(json["totalDurationMs"], 705);
        assert_eq!(json["validatedSequence"][2]["delayMs"], 180);
        assert!(json["intermediateCode"].is_object());
    }

    #[test]
    fn shared_compiler_works_across_threads() {
        let compiler = Compiler::default();
        let results: Vec<CompilationResult> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| compiler.compile_source(SELF_DESTRUCT)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| r.success));
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn prefix_feedback_passes_through() {
        let compiler = Compiler::default();
        let partial = vec![TimedCommand::new("DOWN", 0), TimedCommand::new("DOWN", 150)];
        assert!(compiler.is_valid_prefix(&partial));
        assert_eq!(compiler.possible_moves(&partial).len(), 2);
        assert_eq!(compiler.next_expected_inputs(&partial).len(), 2);
        assert_eq!(compiler.timing_statistics(&partial).max_ms, 150);
    }
}

use crate::config::TimingConfig;
use crate::error::TimingError;
use crate::parser::TimedCommand;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStatistics {
    pub input_count: usize,
    pub total_duration_ms: i64,
    pub average_ms: f64,
    pub min_ms: i64,
    pub max_ms: i64,
}

/// Sum of every delay, clamped to the `i64` range. A clamped total is still
/// far above any configured limit.
pub fn total_duration(sequence: &[TimedCommand]) -> i64 {
    let total: i128 = sequence.iter().map(|input| i128::from(input.delay_ms)).sum();
    total.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Checks recorded inter-input delays after the fact.
///
/// The first input's delay is never checked on its own: nothing precedes it,
/// so it only counts towards the total duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingValidator {
    config: TimingConfig,
}

impl TimingValidator {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Collects every violation instead of stopping at the first one.
    pub fn validate(&self, sequence: &[TimedCommand]) -> Result<(), Vec<TimingError>> {
        if sequence.is_empty() {
            return Err(vec![TimingError::EmptySequence]);
        }

        let mut errors = Vec::new();

        for (index, input) in sequence.iter().enumerate().skip(1) {
            let position = index + 1;
            let delay_ms = input.delay_ms;

            if delay_ms < 0 {
                errors.push(TimingError::NegativeDelay { position, delay_ms });
            } else if delay_ms < self.config.debounce_ms {
                errors.push(TimingError::Debounce {
                    position,
                    delay_ms,
                    min_ms: self.config.debounce_ms,
                });
            }

            if delay_ms > self.config.timeout_ms {
                errors.push(TimingError::Timeout {
                    position,
                    delay_ms,
                    max_ms: self.config.timeout_ms,
                });
            }
        }

        let total_ms = total_duration(sequence);
        if total_ms > self.config.max_sequence_ms {
            errors.push(TimingError::TotalDuration {
                total_ms,
                max_ms: self.config.max_sequence_ms,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Average, min and max are taken over the checked delays, i.e. all but
    /// the first input's.
    pub fn statistics(&self, sequence: &[TimedCommand]) -> TimingStatistics {
        if sequence.is_empty() {
            return TimingStatistics::default();
        }

        let gaps: Vec<i64> = sequence.iter().skip(1).map(|input| input.delay_ms).collect();
        let average_ms = if gaps.is_empty() {
            0.0
        } else {
            gaps.iter().map(|&gap| i128::from(gap)).sum::<i128>() as f64 / gaps.len() as f64
        };

        TimingStatistics {
            input_count: sequence.len(),
            total_duration_ms: total_duration(sequence),
            average_ms,
            min_ms: gaps.iter().copied().min().unwrap_or(0),
            max_ms: gaps.iter().copied().max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(delays: &[i64]) -> Vec<TimedCommand> {
        delays.iter().map(|d| TimedCommand::new("DOWN", *d)).collect()
    }

    #[test]
    fn accepts_delays_inside_the_window() {
        let validator = TimingValidator::default();
        assert_eq!(validator.validate(&sequence(&[0, 150, 180, 200, 175])), Ok(()));
        assert_eq!(validator.validate(&sequence(&[0, 50, 2000])), Ok(()));
    }

    #[test]
    fn first_delay_is_not_checked() {
        let validator = TimingValidator::default();
        assert_eq!(validator.validate(&sequence(&[5000, 150])), Ok(()));
        assert_eq!(validator.validate(&sequence(&[0])), Ok(()));
    }

    #[test]
    fn reports_every_violation_with_its_position() {
        let validator = TimingValidator::default();
        let errors = validator.validate(&sequence(&[0, 10, 150, 2500, -5])).unwrap_err();

        assert_eq!(
            errors,
            vec![
                TimingError::Debounce { position: 2, delay_ms: 10, min_ms: 50 },
                TimingError::Timeout { position: 4, delay_ms: 2500, max_ms: 2000 },
                TimingError::NegativeDelay { position: 5, delay_ms: -5 },
            ]
        );
    }

    #[test]
    fn total_duration_is_checked_separately() {
        let validator = TimingValidator::default();
        let delays = [0, 1900, 1900, 1900, 1900, 1900, 1900];
        let errors = validator.validate(&sequence(&delays)).unwrap_err();
        assert_eq!(errors, vec![TimingError::TotalDuration { total_ms: 11400, max_ms: 10000 }]);
    }

    #[test]
    fn total_at_the_integer_limit_is_still_reported() {
        let validator = TimingValidator::default();
        let errors = validator.validate(&sequence(&[0, i64::MAX, i64::MAX])).unwrap_err();

        assert_eq!(
            errors,
            vec![
                TimingError::Timeout { position: 2, delay_ms: i64::MAX, max_ms: 2000 },
                TimingError::Timeout { position: 3, delay_ms: i64::MAX, max_ms: 2000 },
                TimingError::TotalDuration { total_ms: i64::MAX, max_ms: 10000 },
            ]
        );

        let errors = validator.validate(&sequence(&[0, i64::MAX, 2])).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[2], TimingError::TotalDuration { .. }));
    }

    #[test]
    fn statistics_survive_huge_delays() {
        let validator = TimingValidator::default();
        let stats = validator.statistics(&sequence(&[0, i64::MAX, i64::MAX]));
        assert_eq!(stats.total_duration_ms, i64::MAX);
        assert_eq!(stats.average_ms, i64::MAX as f64);
        assert_eq!(stats.max_ms, i64::MAX);
        assert_eq!(total_duration(&sequence(&[i64::MIN, -1])), i64::MIN);
        assert_eq!(total_duration(&sequence(&[i64::MAX, i64::MAX, -5])), i64::MAX);
    }

    #[test]
    fn empty_sequence_fails() {
        let validator = TimingValidator::default();
        assert_eq!(validator.validate(&[]), Err(vec![TimingError::EmptySequence]));
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let validator = TimingValidator::new(TimingConfig {
            timeout_ms: 300,
            debounce_ms: 100,
            max_sequence_ms: 1000,
        });
        let errors = validator.validate(&sequence(&[0, 90, 350])).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].position(), Some(2));
        assert_eq!(errors[1].position(), Some(3));
    }

    #[test]
    fn statistics_skip_the_first_delay() {
        let validator = TimingValidator::default();
        let stats = validator.statistics(&sequence(&[40, 100, 200, 300]));
        assert_eq!(stats.input_count, 4);
        assert_eq!(stats.total_duration_ms, 640);
        assert_eq!(stats.average_ms, 200.0);
        assert_eq!(stats.min_ms, 100);
        assert_eq!(stats.max_ms, 300);

        assert_eq!(validator.statistics(&[]), TimingStatistics::default());
        let single = validator.statistics(&sequence(&[0]));
        assert_eq!((single.input_count, single.average_ms), (1, 0.0));
    }
}

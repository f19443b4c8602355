use serde::{Deserialize, Serialize};

use crate::models::{WorkoutExercise, WorkoutStructure};

/// Time assumptions used when estimating workout length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds of work per repetition
    pub seconds_per_rep: u32,

    /// Work seconds per set when neither duration nor repetitions are known
    pub default_work_seconds: u32,

    /// Added when the plan includes a warmup
    pub warmup_allowance_seconds: u32,

    /// Added when the plan includes a cooldown
    pub cooldown_allowance_seconds: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            seconds_per_rep: 3,
            default_work_seconds: 30,
            warmup_allowance_seconds: 300,
            cooldown_allowance_seconds: 300,
        }
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Rest time totals
pub struct RestTimeCalculator;

impl RestTimeCalculator {
    /// Total rest in seconds.
    ///
    /// With a structure: rest between consecutive exercises plus rest after
    /// every set of the structure. Without one: each exercise's own rest time
    /// once per set (at least once).
    pub fn total_rest_time(
        exercises: &[WorkoutExercise],
        structure: Option<&WorkoutStructure>,
    ) -> u32 {
        let total: u64 = match structure {
            Some(s) => {
                let transitions = exercises.len().saturating_sub(1) as u64;
                u64::from(s.rest_between_exercises) * transitions
                    + u64::from(s.rest_between_sets) * u64::from(s.total_sets)
            }
            None => exercises
                .iter()
                .map(|e| {
                    u64::from(e.rest_time.unwrap_or(0)) * u64::from(e.sets.unwrap_or(0).max(1))
                })
                .sum(),
        };
        clamp_u32(total)
    }
}

/// Workout length estimation
pub struct DurationCalculator {
    config: TimingConfig,
}

impl Default for DurationCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationCalculator {
    pub fn new() -> Self {
        DurationCalculator {
            config: TimingConfig::default(),
        }
    }

    pub fn with_config(config: TimingConfig) -> Self {
        DurationCalculator { config }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Work seconds for one set of an exercise
    pub fn work_seconds_per_set(&self, exercise: &WorkoutExercise) -> u32 {
        if let Some(duration) = exercise.effective_duration().filter(|d| *d > 0) {
            return duration;
        }
        if let Some(reps) = exercise.effective_repetitions().filter(|r| *r > 0) {
            return reps.saturating_mul(self.config.seconds_per_rep);
        }
        self.config.default_work_seconds
    }

    /// Active (non-rest) seconds across all exercises
    pub fn active_time(&self, exercises: &[WorkoutExercise]) -> u32 {
        let total: u64 = exercises
            .iter()
            .map(|e| {
                u64::from(self.work_seconds_per_set(e)) * u64::from(e.sets.unwrap_or(0).max(1))
            })
            .sum();
        clamp_u32(total)
    }

    /// Total workout time in whole seconds.
    ///
    /// Work plus rest plus the warmup/cooldown allowances. A plan without
    /// exercises falls back to its base duration for the work and rest part.
    pub fn total_time(
        &self,
        base_duration_minutes: u32,
        warmup_included: bool,
        cooldown_included: bool,
        exercises: &[WorkoutExercise],
        structure: Option<&WorkoutStructure>,
    ) -> u32 {
        let main_block: u64 = if exercises.is_empty() {
            u64::from(base_duration_minutes) * 60
        } else {
            u64::from(self.active_time(exercises))
                + u64::from(RestTimeCalculator::total_rest_time(exercises, structure))
        };

        let mut total = main_block;
        if warmup_included {
            total += u64::from(self.config.warmup_allowance_seconds);
        }
        if cooldown_included {
            total += u64::from(self.config.cooldown_allowance_seconds);
        }

        clamp_u32(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseDefinition, ExerciseRole, MeasurementType};

    fn exercise(
        measurement_type: MeasurementType,
        sets: Option<u32>,
        reps: Option<u32>,
        duration: Option<u32>,
        rest: Option<u32>,
    ) -> WorkoutExercise {
        WorkoutExercise {
            exercise: ExerciseDefinition {
                id: "ex".to_string(),
                name: "Exercise".to_string(),
                measurement_type,
                primary_muscles: vec![],
                secondary_muscles: vec![],
            },
            order: 0,
            sets,
            repetitions: reps,
            duration,
            rest_time: rest,
            intensity: None,
            role: ExerciseRole::Primary,
        }
    }

    #[test]
    fn test_rest_without_structure() {
        let exercises = vec![
            exercise(MeasurementType::Repetitions, Some(3), Some(10), None, Some(60)),
            exercise(MeasurementType::Repetitions, None, Some(10), None, Some(45)),
            exercise(MeasurementType::Repetitions, Some(4), Some(8), None, None),
        ];
        // 60*3 + 45*1 + 0
        assert_eq!(RestTimeCalculator::total_rest_time(&exercises, None), 225);
    }

    #[test]
    fn test_rest_with_structure() {
        let exercises = vec![
            exercise(MeasurementType::Repetitions, Some(3), Some(10), None, Some(60)),
            exercise(MeasurementType::Repetitions, Some(3), Some(10), None, Some(60)),
            exercise(MeasurementType::Repetitions, Some(3), Some(10), None, Some(60)),
        ];
        let structure = WorkoutStructure {
            rest_between_exercises: 90,
            rest_between_sets: 60,
            total_sets: 9,
            ..Default::default()
        };
        // 90*2 + 60*9
        assert_eq!(
            RestTimeCalculator::total_rest_time(&exercises, Some(&structure)),
            720
        );
    }

    #[test]
    fn test_rest_with_structure_and_no_exercises() {
        let structure = WorkoutStructure {
            rest_between_exercises: 90,
            rest_between_sets: 30,
            total_sets: 2,
            ..Default::default()
        };
        assert_eq!(RestTimeCalculator::total_rest_time(&[], Some(&structure)), 60);
    }

    #[test]
    fn test_work_seconds_selection() {
        let calc = DurationCalculator::new();

        let plank = exercise(MeasurementType::Duration, Some(3), Some(12), Some(45), None);
        assert_eq!(calc.work_seconds_per_set(&plank), 45);

        let squat = exercise(MeasurementType::Repetitions, Some(3), Some(12), Some(45), None);
        assert_eq!(calc.work_seconds_per_set(&squat), 36);

        let unknown = exercise(MeasurementType::Repetitions, Some(3), None, None, None);
        assert_eq!(calc.work_seconds_per_set(&unknown), 30);

        let untimed = exercise(MeasurementType::Duration, Some(3), Some(12), None, None);
        assert_eq!(calc.work_seconds_per_set(&untimed), 30);
    }

    #[test]
    fn test_total_time_combines_parts() {
        let calc = DurationCalculator::new();
        let exercises = vec![
            exercise(MeasurementType::Repetitions, Some(3), Some(10), None, Some(60)),
            exercise(MeasurementType::Duration, Some(2), None, Some(45), Some(30)),
        ];
        // work: 30*3 + 45*2 = 180; rest: 60*3 + 30*2 = 240
        assert_eq!(calc.total_time(45, false, false, &exercises, None), 420);
        assert_eq!(calc.total_time(45, true, false, &exercises, None), 720);
        assert_eq!(calc.total_time(45, true, true, &exercises, None), 1020);
    }

    #[test]
    fn test_total_time_without_exercises_uses_base_duration() {
        let calc = DurationCalculator::new();
        assert_eq!(calc.total_time(30, false, false, &[], None), 1800);
        assert_eq!(calc.total_time(30, true, true, &[], None), 2400);
        assert_eq!(calc.total_time(0, false, false, &[], None), 0);
    }

    #[test]
    fn test_total_time_is_deterministic() {
        let calc = DurationCalculator::with_config(TimingConfig {
            seconds_per_rep: 4,
            ..Default::default()
        });
        let exercises = vec![exercise(MeasurementType::Repetitions, Some(5), Some(5), None, Some(120))];
        let first = calc.total_time(60, true, false, &exercises, None);
        let second = calc.total_time(60, true, false, &exercises, None);
        assert_eq!(first, second);
        assert_eq!(first, 5 * 20 + 600 + 300);
    }
}

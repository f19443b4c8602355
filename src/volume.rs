use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::WorkoutExercise;

/// Training volume calculations
pub struct VolumeLoadCalculator;

impl VolumeLoadCalculator {
    /// Volume load = Σ weight × repetitions × sets
    ///
    /// Missing weight, repetitions or sets count as zero, as do duration-measured
    /// exercises (they have no repetitions). Negative weights are ignored.
    pub fn volume_load(exercises: &[WorkoutExercise]) -> Decimal {
        exercises
            .iter()
            .map(Self::exercise_load)
            .fold(Decimal::ZERO, |acc, load| {
                acc.checked_add(load).unwrap_or(Decimal::MAX)
            })
    }

    /// Load contributed by a single exercise
    pub fn exercise_load(exercise: &WorkoutExercise) -> Decimal {
        let weight = exercise.weight().max(Decimal::ZERO);
        let reps = Decimal::from(exercise.effective_repetitions().unwrap_or(0));
        let sets = Decimal::from(exercise.sets.unwrap_or(0));

        weight
            .checked_mul(reps)
            .and_then(|v| v.checked_mul(sets))
            .unwrap_or(Decimal::MAX)
    }

    /// Volume load as a float, for the metrics record
    pub fn volume_load_f64(exercises: &[WorkoutExercise]) -> f64 {
        Self::volume_load(exercises).to_f64().unwrap_or(0.0)
    }
}

/// Work-rate calculations
pub struct DensityCalculator;

impl DensityCalculator {
    /// Volume load per second; zero when there is no time to divide by
    pub fn density(volume_load: f64, total_time: f64) -> f64 {
        if total_time <= 0.0 {
            0.0
        } else {
            volume_load / total_time
        }
    }
}

use crate::models::{Difficulty, WorkoutCategory, WorkoutExercise, WorkoutStructure};

// Component weights of the intensity score; they sum to 1.0
const DIFFICULTY_WEIGHT: f64 = 0.40;
const CATEGORY_WEIGHT: f64 = 0.25;
const STRUCTURE_WEIGHT: f64 = 0.20;
const EQUIPMENT_WEIGHT: f64 = 0.10;
const EFFORT_WEIGHT: f64 = 0.05;

/// Working sets at which the structural component saturates
const STRUCTURE_SATURATION_SETS: f64 = 24.0;

/// Equipment pieces at which the equipment component saturates
const EQUIPMENT_SATURATION: f64 = 5.0;

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Workout difficulty scoring
pub struct IntensityCalculator;

impl IntensityCalculator {
    /// Normalized intensity in [0, 1].
    ///
    /// Weighted composite of difficulty rank, category base load, structural
    /// density, equipment count and prescribed effort. Non-decreasing in
    /// difficulty rank when every other input is held fixed.
    pub fn intensity(
        difficulty: Difficulty,
        category: WorkoutCategory,
        structure: Option<&WorkoutStructure>,
        equipment_count: usize,
        exercises: &[WorkoutExercise],
    ) -> f64 {
        let score = DIFFICULTY_WEIGHT * Self::difficulty_score(difficulty)
            + CATEGORY_WEIGHT * Self::category_base_load(category)
            + STRUCTURE_WEIGHT * Self::structure_score(structure, exercises)
            + EQUIPMENT_WEIGHT * Self::equipment_score(equipment_count)
            + EFFORT_WEIGHT * Self::effort_score(exercises);

        unit(score)
    }

    pub fn difficulty_score(difficulty: Difficulty) -> f64 {
        f64::from(difficulty.rank()) / f64::from(Difficulty::max_rank())
    }

    /// Typical load of a category, independent of the plan's contents
    pub fn category_base_load(category: WorkoutCategory) -> f64 {
        match category {
            WorkoutCategory::Power => 0.90,
            WorkoutCategory::Hiit => 0.90,
            WorkoutCategory::Strength => 0.80,
            WorkoutCategory::Hypertrophy => 0.75,
            WorkoutCategory::Circuit => 0.70,
            WorkoutCategory::Endurance => 0.60,
            WorkoutCategory::Cardio => 0.55,
            WorkoutCategory::General => 0.50,
            WorkoutCategory::Mobility => 0.25,
            WorkoutCategory::Flexibility => 0.20,
            WorkoutCategory::Recovery => 0.10,
        }
    }

    /// Working sets implied by the structure, or by the exercises without one
    pub fn structural_sets(structure: Option<&WorkoutStructure>, exercises: &[WorkoutExercise]) -> u64 {
        match structure {
            Some(s) if s.total_sets > 0 => u64::from(s.total_sets),
            Some(s) => {
                let factors: Vec<u64> = [s.sets, s.circuits, s.rounds]
                    .iter()
                    .filter(|v| **v > 0)
                    .map(|v| u64::from(*v))
                    .collect();
                if factors.is_empty() {
                    0
                } else {
                    factors.iter().product()
                }
            }
            None => exercises.iter().map(|e| u64::from(e.sets.unwrap_or(0))).sum(),
        }
    }

    pub fn structure_score(structure: Option<&WorkoutStructure>, exercises: &[WorkoutExercise]) -> f64 {
        unit(Self::structural_sets(structure, exercises) as f64 / STRUCTURE_SATURATION_SETS)
    }

    pub fn equipment_score(equipment_count: usize) -> f64 {
        unit(equipment_count as f64 / EQUIPMENT_SATURATION)
    }

    /// Mean prescribed effort from %1RM or RPE, whichever is higher per exercise
    pub fn effort_score(exercises: &[WorkoutExercise]) -> f64 {
        let efforts: Vec<f64> = exercises
            .iter()
            .filter_map(|e| e.intensity.as_ref())
            .filter_map(|i| {
                let pct = i.percent_one_rep_max.map(|p| unit(p / 100.0));
                let rpe = i.rpe.map(|r| unit(r / 10.0));
                match (pct, rpe) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                }
            })
            .collect();

        if efforts.is_empty() {
            0.0
        } else {
            unit(efforts.iter().sum::<f64>() / efforts.len() as f64)
        }
    }
}

/// Energy expenditure estimate
pub struct CalorieEstimator;

impl CalorieEstimator {
    /// Metabolic equivalent for a given intensity: 3 MET at rest-like
    /// sessions, 10 MET at maximum intensity
    pub fn met(intensity: f64) -> f64 {
        3.0 + 7.0 * unit(intensity)
    }

    /// kcal = MET × body weight (kg) × hours, rounded to 0.1
    pub fn estimated_calories(intensity: f64, total_time_seconds: u32, body_weight_kg: f64) -> f64 {
        if body_weight_kg <= 0.0 || total_time_seconds == 0 {
            return 0.0;
        }
        let hours = f64::from(total_time_seconds) / 3600.0;
        let kcal = Self::met(intensity) * body_weight_kg * hours;
        (kcal * 10.0).round() / 10.0
    }
}

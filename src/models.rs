use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::cache::WorkoutMetrics;
use crate::error::InvalidInputError;

/// Plan difficulty, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Elite,
}

impl Difficulty {
    /// Every level, lowest rank first
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Elite,
    ];

    /// Fixed rank used for all difficulty comparisons
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Advanced => 2,
            Difficulty::Elite => 3,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            0 => Some(Difficulty::Beginner),
            1 => Some(Difficulty::Intermediate),
            2 => Some(Difficulty::Advanced),
            3 => Some(Difficulty::Elite),
            _ => None,
        }
    }

    /// Highest rank in the table
    pub fn max_rank() -> u8 {
        Difficulty::Elite.rank()
    }
}

impl PartialOrd for Difficulty {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Difficulty {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
            Difficulty::Elite => write!(f, "Elite"),
        }
    }
}

/// Workout categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutCategory {
    Strength,
    Hypertrophy,
    Power,
    Endurance,
    Cardio,
    Hiit,
    Circuit,
    Flexibility,
    Mobility,
    Recovery,
    General,
}

/// Training goals a plan can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitnessGoal {
    StrengthGain,
    Hypertrophy,
    MuscleBuilding,
    Power,
    AthleticPerformance,
    Endurance,
    CardiovascularHealth,
    FatLoss,
    Flexibility,
    Mobility,
    Recovery,
    GeneralFitness,
}

/// How an exercise is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementType {
    #[default]
    Repetitions,
    Duration,
}

/// Role of an exercise within a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseRole {
    #[default]
    Primary,
    Secondary,
    Accessory,
    Finisher,
    Warmup,
}

/// Exercise definition, supplied already hydrated by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub measurement_type: MeasurementType,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
}

/// Load prescription for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseIntensity {
    /// Working weight in kilograms
    #[serde(default)]
    pub weight: Option<Decimal>,

    /// Percentage of one-repetition maximum (0-100)
    #[serde(default)]
    pub percent_one_rep_max: Option<f64>,

    /// Rate of perceived exertion (1-10)
    #[serde(default)]
    pub rpe: Option<f64>,
}

/// An exercise as prescribed inside a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise: ExerciseDefinition,

    #[serde(default)]
    pub order: u32,

    #[serde(default)]
    pub sets: Option<u32>,

    /// Repetitions per set (repetition-measured exercises)
    #[serde(default)]
    pub repetitions: Option<u32>,

    /// Work duration per set in seconds (duration-measured exercises)
    #[serde(default)]
    pub duration: Option<u32>,

    /// Rest after each set in seconds
    #[serde(default)]
    pub rest_time: Option<u32>,

    #[serde(default)]
    pub intensity: Option<ExerciseIntensity>,

    #[serde(default)]
    pub role: ExerciseRole,
}

impl WorkoutExercise {
    /// Repetitions, if this exercise is measured in repetitions
    pub fn effective_repetitions(&self) -> Option<u32> {
        match self.exercise.measurement_type {
            MeasurementType::Repetitions => self.repetitions,
            MeasurementType::Duration => None,
        }
    }

    /// Duration in seconds, if this exercise is measured in time
    pub fn effective_duration(&self) -> Option<u32> {
        match self.exercise.measurement_type {
            MeasurementType::Duration => self.duration,
            MeasurementType::Repetitions => None,
        }
    }

    /// Prescribed weight, zero when absent
    pub fn weight(&self) -> Decimal {
        self.intensity
            .as_ref()
            .and_then(|i| i.weight)
            .unwrap_or(Decimal::ZERO)
    }

    fn problems(&self) -> Vec<InvalidInputError> {
        let mut problems = Vec::new();
        let name = &self.exercise.name;

        if let Some(intensity) = &self.intensity {
            if let Some(weight) = intensity.weight {
                if weight.is_sign_negative() && !weight.is_zero() {
                    problems.push(InvalidInputError::out_of_range(
                        format!("{name}.weight"),
                        weight,
                        ">= 0",
                    ));
                }
            }
            if let Some(pct) = intensity.percent_one_rep_max {
                if !(0.0..=100.0).contains(&pct) {
                    problems.push(InvalidInputError::out_of_range(
                        format!("{name}.percentOneRepMax"),
                        pct,
                        "0..=100",
                    ));
                }
            }
            if let Some(rpe) = intensity.rpe {
                if !(1.0..=10.0).contains(&rpe) {
                    problems.push(InvalidInputError::out_of_range(
                        format!("{name}.rpe"),
                        rpe,
                        "1..=10",
                    ));
                }
            }
        }

        problems
    }
}

/// Set/circuit layout of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStructure {
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub circuits: u32,
    #[serde(default)]
    pub rounds: u32,
    /// Seconds
    #[serde(default)]
    pub rest_between_exercises: u32,
    /// Seconds
    #[serde(default)]
    pub rest_between_sets: u32,
    #[serde(default)]
    pub total_sets: u32,
}

/// Shape of week-over-week progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressionType {
    Linear,
    Undulating,
    Wave,
}

impl std::str::FromStr for ProgressionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LINEAR" => Ok(ProgressionType::Linear),
            "UNDULATING" => Ok(ProgressionType::Undulating),
            "WAVE" => Ok(ProgressionType::Wave),
            _ => Err(format!("Unknown progression type: {}", s)),
        }
    }
}

// Unrecognized type names load as "no progression" instead of failing the plan
fn lenient_progression_type<'de, D>(deserializer: D) -> Result<Option<ProgressionType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse() {
        Ok(kind) => Some(kind),
        Err(reason) => {
            tracing::warn!(%reason, "Ignoring progression type");
            None
        }
    }))
}

/// Explicit multipliers for one week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverride {
    pub intensity_multiplier: f64,
    pub volume_multiplier: f64,
}

/// Progression settings of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionModel {
    /// Unknown or missing type means no progression
    #[serde(default, deserialize_with = "lenient_progression_type")]
    pub progression_type: Option<ProgressionType>,

    /// Every Nth week is a deload week; 0 disables deloads
    #[serde(default)]
    pub deload_frequency: u32,

    /// Week index -> explicit multipliers
    #[serde(default)]
    pub weekly_overrides: BTreeMap<u32, WeekOverride>,

    #[serde(default)]
    pub auto_regulate: bool,
}

impl ProgressionModel {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let mut problems = Vec::new();
        for (week, o) in &self.weekly_overrides {
            if !o.intensity_multiplier.is_finite() || o.intensity_multiplier < 0.0 {
                problems.push(InvalidInputError::out_of_range(
                    format!("weeklyOverrides[{week}].intensityMultiplier"),
                    o.intensity_multiplier,
                    ">= 0",
                ));
            }
            if !o.volume_multiplier.is_finite() || o.volume_multiplier < 0.0 {
                problems.push(InvalidInputError::out_of_range(
                    format!("weeklyOverrides[{week}].volumeMultiplier"),
                    o.volume_multiplier,
                    ">= 0",
                ));
            }
        }
        match InvalidInputError::from_problems(problems) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Equipment reference (not owned by the plan)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRef {
    pub id: String,
    pub name: String,
}

/// Workout plan aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PlanRecord")]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: WorkoutCategory,

    /// Minutes
    pub estimated_duration: u32,

    pub warmup_included: bool,
    pub cooldown_included: bool,

    pub exercises: Vec<WorkoutExercise>,
    pub structure: Option<WorkoutStructure>,
    pub progression: Option<ProgressionModel>,

    pub equipment: Vec<EquipmentRef>,
    pub tags: Vec<String>,
    pub goals: BTreeSet<FitnessGoal>,
    pub metadata: BTreeMap<String, String>,

    pub metrics: WorkoutMetrics,
    pub created_at: DateTime<Utc>,
}

/// Plan as stored; records written before any calculation carry no metrics
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    difficulty: Difficulty,
    category: WorkoutCategory,
    #[serde(default)]
    estimated_duration: u32,
    #[serde(default)]
    warmup_included: bool,
    #[serde(default)]
    cooldown_included: bool,
    #[serde(default)]
    exercises: Vec<WorkoutExercise>,
    #[serde(default)]
    structure: Option<WorkoutStructure>,
    #[serde(default)]
    progression: Option<ProgressionModel>,
    #[serde(default)]
    equipment: Vec<EquipmentRef>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    goals: BTreeSet<FitnessGoal>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    metrics: Option<WorkoutMetrics>,
    created_at: DateTime<Utc>,
}

impl From<PlanRecord> for WorkoutPlan {
    fn from(record: PlanRecord) -> Self {
        WorkoutPlan {
            id: record.id,
            name: record.name,
            description: record.description,
            difficulty: record.difficulty,
            category: record.category,
            estimated_duration: record.estimated_duration,
            warmup_included: record.warmup_included,
            cooldown_included: record.cooldown_included,
            exercises: record.exercises,
            structure: record.structure,
            progression: record.progression,
            equipment: record.equipment,
            tags: record.tags,
            goals: record.goals,
            metadata: record.metadata,
            metrics: record
                .metrics
                .unwrap_or_else(|| WorkoutMetrics::new(record.created_at)),
            created_at: record.created_at,
        }
    }
}

impl WorkoutPlan {
    /// Create an empty plan with zeroed metrics
    pub fn new(
        name: impl Into<String>,
        difficulty: Difficulty,
        category: WorkoutCategory,
        created_at: DateTime<Utc>,
    ) -> Self {
        WorkoutPlan {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            difficulty,
            category,
            estimated_duration: 0,
            warmup_included: false,
            cooldown_included: false,
            exercises: Vec::new(),
            structure: None,
            progression: None,
            equipment: Vec::new(),
            tags: Vec::new(),
            goals: BTreeSet::new(),
            metadata: BTreeMap::new(),
            metrics: WorkoutMetrics::new(created_at),
            created_at,
        }
    }

    /// Check numeric configuration before the plan is handed to the engine
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let mut problems: Vec<InvalidInputError> =
            self.exercises.iter().flat_map(|e| e.problems()).collect();

        if let Some(progression) = &self.progression {
            match progression.validate() {
                Ok(()) => {}
                Err(InvalidInputError::Multiple(inner)) => problems.extend(inner),
                Err(err) => problems.push(err),
            }
        }

        match InvalidInputError::from_problems(problems) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

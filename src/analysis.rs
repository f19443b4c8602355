use std::collections::BTreeSet;

use crate::models::{FitnessGoal, WorkoutCategory, WorkoutExercise};

/// Muscle pairs that balance each other out
pub const OPPOSING_MUSCLE_PAIRS: [(&str, &str); 4] = [
    ("chest", "back"),
    ("quadriceps", "hamstrings"),
    ("biceps", "triceps"),
    ("anterior_deltoid", "posterior_deltoid"),
];

/// Lowercase, with spaces and hyphens folded into underscores
pub fn normalize_muscle(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Muscle group coverage of a workout
pub struct MuscleBalanceAnalyzer;

impl MuscleBalanceAnalyzer {
    /// Union of every exercise's primary muscles
    pub fn primary_muscle_groups(exercises: &[WorkoutExercise]) -> BTreeSet<String> {
        exercises
            .iter()
            .flat_map(|e| e.exercise.primary_muscles.iter())
            .map(|m| normalize_muscle(m))
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// True iff at least one opposing pair is fully present
    pub fn is_balanced<S: AsRef<str>>(groups: &[S]) -> bool {
        let groups: BTreeSet<String> = groups.iter().map(|g| normalize_muscle(g.as_ref())).collect();
        Self::has_balanced_pair(&groups)
    }

    pub fn is_workout_balanced(exercises: &[WorkoutExercise]) -> bool {
        let groups = Self::primary_muscle_groups(exercises);
        Self::has_balanced_pair(&groups)
    }

    fn has_balanced_pair(groups: &BTreeSet<String>) -> bool {
        Self::balanced_pairs(groups).next().is_some()
    }

    /// Opposing pairs fully covered by `groups`
    pub fn balanced_pairs<'a>(
        groups: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = (&'static str, &'static str)> + 'a {
        OPPOSING_MUSCLE_PAIRS
            .iter()
            .copied()
            .filter(move |(a, b)| groups.contains(*a) && groups.contains(*b))
    }

    /// Muscles trained without their opposing partner
    pub fn unpaired_muscles(groups: &BTreeSet<String>) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        for (a, b) in OPPOSING_MUSCLE_PAIRS {
            match (groups.contains(a), groups.contains(b)) {
                (true, false) => missing.push((a, b)),
                (false, true) => missing.push((b, a)),
                _ => {}
            }
        }
        missing
    }
}

/// Derives training goals from a plan's category
pub struct GoalInferencer;

impl GoalInferencer {
    /// Goals implied by a category
    pub fn category_goals(category: WorkoutCategory) -> &'static [FitnessGoal] {
        match category {
            WorkoutCategory::Strength => &[FitnessGoal::StrengthGain],
            WorkoutCategory::Hypertrophy => &[FitnessGoal::Hypertrophy, FitnessGoal::MuscleBuilding],
            WorkoutCategory::Power => &[FitnessGoal::Power, FitnessGoal::AthleticPerformance],
            WorkoutCategory::Endurance | WorkoutCategory::Cardio => {
                &[FitnessGoal::Endurance, FitnessGoal::CardiovascularHealth]
            }
            WorkoutCategory::Hiit => &[FitnessGoal::FatLoss, FitnessGoal::CardiovascularHealth],
            WorkoutCategory::Flexibility | WorkoutCategory::Mobility => {
                &[FitnessGoal::Flexibility, FitnessGoal::Mobility]
            }
            WorkoutCategory::Recovery => &[FitnessGoal::Recovery],
            WorkoutCategory::Circuit | WorkoutCategory::General => &[FitnessGoal::GeneralFitness],
        }
    }

    /// Explicit goals plus those implied by the category
    pub fn fitness_goals(
        category: WorkoutCategory,
        explicit: &BTreeSet<FitnessGoal>,
    ) -> BTreeSet<FitnessGoal> {
        let mut goals = explicit.clone();
        goals.extend(Self::category_goals(category).iter().copied());
        goals
    }
}

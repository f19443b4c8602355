use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::InvalidInputError;
use crate::models::{
    Difficulty, EquipmentRef, WorkoutCategory, WorkoutPlan, WorkoutStructure,
};
use crate::progression::scale_sets;

/// Suffix appended to a variation's name
pub const VARIATION_SUFFIX: &str = " (Variation)";

/// Rest periods never drop below this when rescaled for time
pub const MIN_REST_SECONDS: u32 = 30;

/// Tunables for [`VariationGenerator::generate_variation`]; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationOptions {
    /// Positive steps difficulty up, negative steps it down
    #[serde(default)]
    pub intensity_change: Option<i32>,

    /// Fractional change of total sets, e.g. 0.2 for +20 %
    #[serde(default)]
    pub volume_change: Option<f64>,

    /// Target session length in seconds
    #[serde(default)]
    pub time_constraint: Option<u32>,

    /// Equipment ids to leave out
    #[serde(default)]
    pub exclude_equipment: Vec<String>,
}

impl VariationOptions {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let mut problems = Vec::new();
        if let Some(change) = self.volume_change {
            if !change.is_finite() || change < -1.0 {
                problems.push(InvalidInputError::out_of_range(
                    "volumeChange",
                    change,
                    ">= -1.0",
                ));
            }
        }
        if self.time_constraint == Some(0) {
            problems.push(InvalidInputError::out_of_range(
                "timeConstraint",
                0,
                "> 0 seconds",
            ));
        }
        match InvalidInputError::from_problems(problems) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Unsaved plan produced by a variation; the caller decides whether to persist it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub source_plan_id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: WorkoutCategory,
    /// Minutes
    pub estimated_duration: u32,
    pub structure: Option<WorkoutStructure>,
    pub equipment: Vec<EquipmentRef>,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Builds modified copies of a plan
pub struct VariationGenerator;

impl VariationGenerator {
    /// Copy the plan's descriptive fields and apply each requested change.
    ///
    /// The changes are independent of each other, so their order does not
    /// matter.
    pub fn generate_variation(plan: &WorkoutPlan, options: &VariationOptions) -> PlanDraft {
        let mut draft = PlanDraft {
            source_plan_id: plan.id.clone(),
            name: format!("{}{}", plan.name, VARIATION_SUFFIX),
            description: plan.description.clone(),
            difficulty: plan.difficulty,
            category: plan.category,
            estimated_duration: plan.estimated_duration,
            structure: plan.structure.clone(),
            equipment: plan.equipment.clone(),
            tags: plan.tags.clone(),
            metadata: plan.metadata.clone(),
        };

        if let Some(change) = options.intensity_change {
            draft.difficulty = Self::shift_difficulty(plan.difficulty, change);
        }

        if let Some(change) = options.volume_change {
            if let Some(structure) = draft.structure.as_mut() {
                structure.total_sets = scale_sets(structure.total_sets, 1.0 + change);
            }
        }

        if let Some(seconds) = options.time_constraint {
            Self::apply_time_constraint(&mut draft, plan.estimated_duration, seconds);
        }

        if !options.exclude_equipment.is_empty() {
            let excluded: BTreeSet<&str> =
                options.exclude_equipment.iter().map(String::as_str).collect();
            draft.equipment.retain(|e| !excluded.contains(e.id.as_str()));
        }

        tracing::info!(
            source = %plan.id,
            difficulty = %draft.difficulty,
            duration = draft.estimated_duration,
            equipment = draft.equipment.len(),
            "Generated plan variation"
        );

        draft
    }

    /// One step up or down the difficulty table.
    ///
    /// Stepping up stops at ADVANCED: ELITE is never assigned by a variation,
    /// even though stepping down goes all the way to BEGINNER.
    pub fn shift_difficulty(current: Difficulty, change: i32) -> Difficulty {
        let rank = current.rank();
        let shifted = if change > 0 && rank < Difficulty::Advanced.rank() {
            Difficulty::from_rank(rank + 1)
        } else if change < 0 && rank > Difficulty::Beginner.rank() {
            Difficulty::from_rank(rank - 1)
        } else {
            None
        };
        shifted.unwrap_or(current)
    }

    fn apply_time_constraint(draft: &mut PlanDraft, original_minutes: u32, seconds: u32) {
        let target_minutes = (f64::from(seconds) / 60.0).round() as u32;
        draft.estimated_duration = target_minutes;

        if original_minutes == 0 {
            tracing::warn!("Plan has no estimated duration; rest periods left unscaled");
            return;
        }

        let ratio = f64::from(seconds) / (f64::from(original_minutes) * 60.0);
        if let Some(structure) = draft.structure.as_mut() {
            structure.rest_between_exercises = scale_rest(structure.rest_between_exercises, ratio);
            structure.rest_between_sets = scale_rest(structure.rest_between_sets, ratio);
        }
    }
}

fn scale_rest(rest: u32, ratio: f64) -> u32 {
    let scaled = (f64::from(rest) * ratio).round();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (scaled as u32).max(MIN_REST_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn plan(difficulty: Difficulty) -> WorkoutPlan {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap();
        let mut plan = WorkoutPlan::new("Upper Body", difficulty, WorkoutCategory::Strength, created);
        plan.description = "Push and pull".to_string();
        plan.estimated_duration = 60;
        plan.structure = Some(WorkoutStructure {
            sets: 3,
            circuits: 1,
            rounds: 1,
            rest_between_exercises: 120,
            rest_between_sets: 90,
            total_sets: 12,
        });
        plan.equipment = vec![
            EquipmentRef {
                id: "barbell".to_string(),
                name: "Barbell".to_string(),
            },
            EquipmentRef {
                id: "bench".to_string(),
                name: "Flat Bench".to_string(),
            },
        ];
        plan.tags = vec!["push".to_string()];
        plan.metadata.insert("author".to_string(), "coach".to_string());
        plan
    }

    #[test]
    fn test_copies_plan_fields() {
        let source = plan(Difficulty::Intermediate);
        let draft = VariationGenerator::generate_variation(&source, &VariationOptions::default());

        assert_eq!(draft.name, "Upper Body (Variation)");
        assert_eq!(draft.source_plan_id, source.id);
        assert_eq!(draft.description, source.description);
        assert_eq!(draft.difficulty, source.difficulty);
        assert_eq!(draft.category, source.category);
        assert_eq!(draft.estimated_duration, 60);
        assert_eq!(draft.structure, source.structure);
        assert_eq!(draft.equipment, source.equipment);
        assert_eq!(draft.metadata, source.metadata);
    }

    #[test]
    fn test_step_up_from_beginner() {
        let options = VariationOptions {
            intensity_change: Some(1),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Beginner), &options);
        assert_eq!(draft.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn test_step_up_never_reaches_elite() {
        // Stepping up stops at ADVANCED; this pins the existing rule.
        let options = VariationOptions {
            intensity_change: Some(1),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Advanced), &options);
        assert_eq!(draft.difficulty, Difficulty::Advanced);

        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Elite), &options);
        assert_eq!(draft.difficulty, Difficulty::Elite);
    }

    #[test]
    fn test_step_down() {
        assert_eq!(
            VariationGenerator::shift_difficulty(Difficulty::Elite, -1),
            Difficulty::Advanced
        );
        assert_eq!(
            VariationGenerator::shift_difficulty(Difficulty::Intermediate, -3),
            Difficulty::Beginner
        );
        assert_eq!(
            VariationGenerator::shift_difficulty(Difficulty::Beginner, -1),
            Difficulty::Beginner
        );
        assert_eq!(
            VariationGenerator::shift_difficulty(Difficulty::Intermediate, 0),
            Difficulty::Intermediate
        );
    }

    #[test]
    fn test_volume_change() {
        let source = plan(Difficulty::Beginner);
        let up = VariationOptions {
            volume_change: Some(0.25),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&source, &up);
        assert_eq!(draft.structure.unwrap().total_sets, 15);

        let wipe = VariationOptions {
            volume_change: Some(-1.0),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&source, &wipe);
        assert_eq!(draft.structure.unwrap().total_sets, 1);

        let mut no_structure = plan(Difficulty::Beginner);
        no_structure.structure = None;
        let draft = VariationGenerator::generate_variation(&no_structure, &up);
        assert!(draft.structure.is_none());
    }

    #[test]
    fn test_time_constraint_rescales_rest() {
        let options = VariationOptions {
            time_constraint: Some(30 * 60),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Beginner), &options);
        let structure = draft.structure.unwrap();

        assert_eq!(draft.estimated_duration, 30);
        assert_eq!(structure.rest_between_exercises, 60);
        assert_eq!(structure.rest_between_sets, 45);
    }

    #[test]
    fn test_time_constraint_floors_rest() {
        let options = VariationOptions {
            time_constraint: Some(10 * 60),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Beginner), &options);
        let structure = draft.structure.unwrap();

        assert_eq!(draft.estimated_duration, 10);
        assert_eq!(structure.rest_between_exercises, 30);
        assert_eq!(structure.rest_between_sets, 30);
    }

    #[test]
    fn test_time_constraint_without_estimated_duration() {
        let mut source = plan(Difficulty::Beginner);
        source.estimated_duration = 0;
        let options = VariationOptions {
            time_constraint: Some(20 * 60),
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&source, &options);
        let structure = draft.structure.unwrap();

        assert_eq!(draft.estimated_duration, 20);
        assert_eq!(structure.rest_between_exercises, 120);
        assert_eq!(structure.rest_between_sets, 90);
    }

    #[test]
    fn test_exclude_equipment() {
        let options = VariationOptions {
            exclude_equipment: vec!["barbell".to_string(), "kettlebell".to_string()],
            ..Default::default()
        };
        let draft = VariationGenerator::generate_variation(&plan(Difficulty::Beginner), &options);
        assert_eq!(draft.equipment.len(), 1);
        assert_eq!(draft.equipment[0].id, "bench");
    }

    #[test]
    fn test_source_plan_untouched() {
        let source = plan(Difficulty::Beginner);
        let before = source.clone();
        let options = VariationOptions {
            intensity_change: Some(1),
            volume_change: Some(0.5),
            time_constraint: Some(900),
            exclude_equipment: vec!["bench".to_string()],
        };
        let _ = VariationGenerator::generate_variation(&source, &options);
        assert_eq!(source, before);
    }

    #[test]
    fn test_options_validation() {
        assert!(VariationOptions::default().validate().is_ok());

        let bad = VariationOptions {
            volume_change: Some(-1.5),
            time_constraint: Some(0),
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(InvalidInputError::Multiple(p)) if p.len() == 2));
    }
}

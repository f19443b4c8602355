use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::analysis::{GoalInferencer, MuscleBalanceAnalyzer};
use crate::cache::WorkoutMetrics;
pub use crate::error::ExportError;
use crate::models::{Difficulty, FitnessGoal, WorkoutCategory, WorkoutPlan};
use crate::progression::{WeekMultipliers, WeekPrescription};

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Snapshot of everything the engine knows about one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub plan_id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub category: WorkoutCategory,
    pub generated_at: DateTime<Utc>,
    pub metrics: WorkoutMetrics,
    pub current_week: u32,
    pub current_multipliers: WeekMultipliers,
    pub schedule: Vec<WeekPrescription>,
    pub muscle_groups: BTreeSet<String>,
    pub balanced: bool,
    pub goals: BTreeSet<FitnessGoal>,
}

impl PlanReport {
    /// Assemble a report from already computed pieces
    pub fn new(
        plan: &WorkoutPlan,
        generated_at: DateTime<Utc>,
        current_week: u32,
        current_multipliers: WeekMultipliers,
        schedule: Vec<WeekPrescription>,
    ) -> Self {
        let muscle_groups = MuscleBalanceAnalyzer::primary_muscle_groups(&plan.exercises);
        let balanced = MuscleBalanceAnalyzer::balanced_pairs(&muscle_groups).next().is_some();

        PlanReport {
            plan_id: plan.id.clone(),
            name: plan.name.clone(),
            difficulty: plan.difficulty,
            category: plan.category,
            generated_at,
            metrics: plan.metrics.clone(),
            current_week,
            current_multipliers,
            schedule,
            muscle_groups,
            balanced,
            goals: GoalInferencer::fitness_goals(plan.category, &plan.goals),
        }
    }
}

/// Write a full plan report in the requested format
pub fn export_report<P: AsRef<Path>>(
    report: &PlanReport,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    tracing::info!(plan = %report.plan_id, %format, path = %path.display(), "Exporting plan report");

    match format {
        ExportFormat::Csv => csv::export_report(report, path),
        ExportFormat::Json => json::export_json(report, path),
        ExportFormat::Text => text::export_report(report, path),
    }
}

/// Write a progression schedule in the requested format
pub fn export_schedule<P: AsRef<Path>>(
    schedule: &[WeekPrescription],
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    if schedule.is_empty() {
        return Err(ExportError::Empty("progression schedule has no weeks".to_string()));
    }

    let path = output_path.as_ref();
    tracing::info!(weeks = schedule.len(), %format, path = %path.display(), "Exporting schedule");

    match format {
        ExportFormat::Csv => csv::export_schedule(schedule, path),
        ExportFormat::Json => json::export_json(&schedule, path),
        ExportFormat::Text => text::export_schedule(schedule, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseDefinition, ExerciseRole, MeasurementType, WorkoutExercise};
    use crate::progression::ProgressionEngine;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_report() -> PlanReport {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut plan = WorkoutPlan::new(
            "Push Pull",
            Difficulty::Intermediate,
            WorkoutCategory::Hypertrophy,
            created,
        );
        for (id, muscle) in [("bench", "chest"), ("row", "back")] {
            plan.exercises.push(WorkoutExercise {
                exercise: ExerciseDefinition {
                    id: id.to_string(),
                    name: id.to_string(),
                    measurement_type: MeasurementType::Repetitions,
                    primary_muscles: vec![muscle.to_string()],
                    secondary_muscles: vec![],
                },
                order: 0,
                sets: Some(3),
                repetitions: Some(8),
                duration: None,
                rest_time: None,
                intensity: None,
                role: ExerciseRole::Primary,
            });
        }
        let schedule = ProgressionEngine::project(None, 2, None);
        PlanReport::new(&plan, created, 0, WeekMultipliers::identity(), schedule)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "pdf"
        ));
        assert_eq!(ExportFormat::Text.extension(), "txt");
    }

    #[test]
    fn test_report_analysis() {
        let report = sample_report();
        assert!(report.balanced);
        assert!(report.muscle_groups.contains("chest"));
        assert!(report.goals.contains(&FitnessGoal::Hypertrophy));
        assert!(report.goals.contains(&FitnessGoal::MuscleBuilding));
    }

    #[test]
    fn test_export_report_all_formats() {
        let dir = tempdir().unwrap();
        let report = sample_report();

        for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Text] {
            let path = dir.path().join(format!("report.{}", format.extension()));
            export_report(&report, format, &path).unwrap();
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("Push Pull"), "{format} output lacks plan name");
        }
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let dir = tempdir().unwrap();
        let result = export_schedule(&[], ExportFormat::Csv, dir.path().join("s.csv"));
        assert!(matches!(result, Err(ExportError::Empty(_))));
    }
}

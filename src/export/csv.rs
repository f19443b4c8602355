use super::{ExportError, PlanReport};
use crate::progression::WeekPrescription;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ScheduleRow {
    #[serde(rename = "Week")]
    week: u32,
    #[serde(rename = "Intensity_Multiplier")]
    intensity_multiplier: String,
    #[serde(rename = "Volume_Multiplier")]
    volume_multiplier: String,
    #[serde(rename = "Deload")]
    deload: u8,
    #[serde(rename = "Total_Sets")]
    total_sets: Option<u32>,
}

impl From<&WeekPrescription> for ScheduleRow {
    fn from(week: &WeekPrescription) -> Self {
        ScheduleRow {
            week: week.week,
            intensity_multiplier: format!("{:.3}", week.intensity_multiplier),
            volume_multiplier: format!("{:.3}", week.volume_multiplier),
            deload: u8::from(week.deload),
            total_sets: week.prescribed_total_sets,
        }
    }
}

/// Export a progression schedule, one row per week
pub fn export_schedule<P: AsRef<Path>>(
    schedule: &[WeekPrescription],
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = ::csv::Writer::from_path(output_path)?;
    for week in schedule {
        writer.serialize(ScheduleRow::from(week))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export a plan report as `Field,Value` pairs
pub fn export_report<P: AsRef<Path>>(
    report: &PlanReport,
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = ::csv::Writer::from_path(output_path)?;
    let metrics = &report.metrics;
    let multipliers = &report.current_multipliers;

    let rows: Vec<(&str, String)> = vec![
        ("Plan_ID", report.plan_id.clone()),
        ("Name", report.name.clone()),
        ("Difficulty", report.difficulty.to_string()),
        ("Category", format!("{:?}", report.category)),
        ("Generated_At", report.generated_at.to_rfc3339()),
        ("Volume_Load", format!("{:.2}", metrics.volume_load)),
        ("Density", format!("{:.4}", metrics.density)),
        ("Intensity", format!("{:.4}", metrics.intensity)),
        ("Total_Time_Seconds", metrics.total_time.to_string()),
        ("Total_Rest_Seconds", metrics.total_rest_time.to_string()),
        ("Estimated_Calories", format!("{:.1}", metrics.estimated_calories)),
        ("Last_Calculated", metrics.last_calculated.to_rfc3339()),
        ("Current_Week", report.current_week.to_string()),
        ("Intensity_Multiplier", format!("{:.3}", multipliers.intensity_multiplier)),
        ("Volume_Multiplier", format!("{:.3}", multipliers.volume_multiplier)),
        ("Deload", u8::from(multipliers.deload).to_string()),
        (
            "Muscle_Groups",
            report.muscle_groups.iter().cloned().collect::<Vec<_>>().join(";"),
        ),
        ("Balanced", u8::from(report.balanced).to_string()),
        (
            "Goals",
            report
                .goals
                .iter()
                .map(|g| format!("{:?}", g))
                .collect::<Vec<_>>()
                .join(";"),
        ),
    ];

    writer.write_record(["Field", "Value"])?;
    for (field, value) in rows {
        writer.write_record([field, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

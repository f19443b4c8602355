use super::{ExportError, PlanReport};
use crate::cache::WorkoutMetrics;
use crate::progression::WeekPrescription;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ScheduleLine {
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Intensity")]
    intensity: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Sets")]
    sets: String,
    #[tabled(rename = "Deload")]
    deload: &'static str,
}

#[derive(Tabled)]
struct MetricLine {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render a schedule as a table
pub fn render_schedule(schedule: &[WeekPrescription]) -> String {
    let lines = schedule.iter().map(|w| ScheduleLine {
        week: w.week,
        intensity: format!("x{:.3}", w.intensity_multiplier),
        volume: format!("x{:.3}", w.volume_multiplier),
        sets: w
            .prescribed_total_sets
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
        deload: if w.deload { "yes" } else { "" },
    });
    Table::new(lines).with(Style::modern()).to_string()
}

/// Render a metrics record as a table
pub fn render_metrics(m: &WorkoutMetrics) -> String {
    let lines = vec![
        MetricLine {
            metric: "Volume load",
            value: format!("{:.1}", m.volume_load),
        },
        MetricLine {
            metric: "Total time",
            value: format_seconds(m.total_time),
        },
        MetricLine {
            metric: "Rest time",
            value: format_seconds(m.total_rest_time),
        },
        MetricLine {
            metric: "Density",
            value: format!("{:.3} per s", m.density),
        },
        MetricLine {
            metric: "Intensity",
            value: format!("{:.2}", m.intensity),
        },
        MetricLine {
            metric: "Calories",
            value: format!("{:.1} kcal", m.estimated_calories),
        },
    ];
    Table::new(lines).with(Style::modern()).to_string()
}

/// Human-readable report
pub fn render_report(report: &PlanReport) -> String {
    let mut out = String::new();
    let mult = &report.current_multipliers;

    // Writing to a String cannot fail
    let _ = writeln!(out, "WORKOUT PLAN REPORT");
    let _ = writeln!(out, "Plan: {} ({})", report.name, report.plan_id);
    let _ = writeln!(out, "Difficulty: {}  Category: {:?}", report.difficulty, report.category);
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "METRICS");
    let _ = writeln!(out, "{}", render_metrics(&report.metrics));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Week {}: intensity x{:.3}, volume x{:.3}{}",
        report.current_week,
        mult.intensity_multiplier,
        mult.volume_multiplier,
        if mult.deload { " (deload)" } else { "" }
    );
    let _ = writeln!(
        out,
        "Muscle groups: {}",
        report.muscle_groups.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    let _ = writeln!(out, "Balanced: {}", if report.balanced { "yes" } else { "no" });
    let _ = writeln!(
        out,
        "Goals: {}",
        report
            .goals
            .iter()
            .map(|g| format!("{:?}", g))
            .collect::<Vec<_>>()
            .join(", ")
    );

    if !report.schedule.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "SCHEDULE");
        let _ = writeln!(out, "{}", render_schedule(&report.schedule));
    }

    out
}

/// Export a plan report to a text file
pub fn export_report<P: AsRef<Path>>(
    report: &PlanReport,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(render_report(report).as_bytes())?;
    Ok(())
}

/// Export a schedule table to a text file
pub fn export_schedule<P: AsRef<Path>>(
    schedule: &[WeekPrescription],
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "{}", render_schedule(schedule))?;
    Ok(())
}

/// `h:mm:ss`, or `m:ss` under an hour
pub fn format_seconds(seconds: u32) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressionModel, ProgressionType};
    use crate::progression::ProgressionEngine;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0:00");
        assert_eq!(format_seconds(600), "10:00");
        assert_eq!(format_seconds(3725), "1:02:05");
    }

    #[test]
    fn test_render_schedule_marks_deload() {
        let model = ProgressionModel {
            progression_type: Some(ProgressionType::Wave),
            deload_frequency: 3,
            ..Default::default()
        };
        let schedule = ProgressionEngine::project(Some(&model), 4, None);
        let table = render_schedule(&schedule);

        assert!(table.contains("Week"));
        assert!(table.contains("x0.600"));
        assert!(table.contains("yes"));
        assert!(table.contains("x1.100"));
    }
}

//! Week-by-week progression multipliers
//!
//! The current week is derived from the plan's creation time and "now";
//! everything else is a pure function of the week index and the plan's
//! [`ProgressionModel`], so evaluating it repeatedly is idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::clock::Clock;
use crate::models::{ProgressionModel, ProgressionType, WorkoutStructure};

const MILLIS_PER_WEEK: i64 = 7 * 24 * 60 * 60 * 1000;

/// Multipliers applied during a deload week
pub const DELOAD_INTENSITY_MULTIPLIER: f64 = 0.6;
pub const DELOAD_VOLUME_MULTIPLIER: f64 = 0.7;

const WAVE_LENGTH_WEEKS: u32 = 3;

/// Multipliers in effect for one week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekMultipliers {
    pub intensity_multiplier: f64,
    pub volume_multiplier: f64,
    pub deload: bool,
}

impl WeekMultipliers {
    pub fn identity() -> Self {
        WeekMultipliers {
            intensity_multiplier: 1.0,
            volume_multiplier: 1.0,
            deload: false,
        }
    }

    pub fn deload() -> Self {
        WeekMultipliers {
            intensity_multiplier: DELOAD_INTENSITY_MULTIPLIER,
            volume_multiplier: DELOAD_VOLUME_MULTIPLIER,
            deload: true,
        }
    }
}

/// One row of a projected progression schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPrescription {
    pub week: u32,
    pub intensity_multiplier: f64,
    pub volume_multiplier: f64,
    pub deload: bool,
    /// Base structure's total sets scaled by the volume multiplier
    pub prescribed_total_sets: Option<u32>,
}

/// Progression calculations
pub struct ProgressionEngine;

impl ProgressionEngine {
    /// Whole weeks elapsed since the plan was created; zero if `now` precedes it
    pub fn current_week(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let elapsed = (now - created_at).num_milliseconds();
        if elapsed <= 0 {
            return 0;
        }
        u32::try_from(elapsed / MILLIS_PER_WEEK).unwrap_or(u32::MAX)
    }

    /// Multipliers for the week containing `now`
    pub fn multipliers(
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
        model: Option<&ProgressionModel>,
    ) -> WeekMultipliers {
        let week = Self::current_week(created_at, now);
        let result = Self::for_week(week, model);
        tracing::debug!(
            week,
            intensity = result.intensity_multiplier,
            volume = result.volume_multiplier,
            deload = result.deload,
            "Progression multipliers evaluated"
        );
        result
    }

    /// Multipliers for the current week according to `clock`
    pub fn multipliers_now(
        clock: &dyn Clock,
        created_at: DateTime<Utc>,
        model: Option<&ProgressionModel>,
    ) -> WeekMultipliers {
        Self::multipliers(created_at, clock.now(), model)
    }

    /// Multipliers for a given week index.
    ///
    /// Deload weeks take precedence over explicit overrides, which take
    /// precedence over the progression type's formula.
    pub fn for_week(week: u32, model: Option<&ProgressionModel>) -> WeekMultipliers {
        let Some(model) = model else {
            return WeekMultipliers::identity();
        };

        if model.deload_frequency > 0 && week % model.deload_frequency == 0 {
            return WeekMultipliers::deload();
        }

        if let Some(o) = model.weekly_overrides.get(&week) {
            return WeekMultipliers {
                intensity_multiplier: o.intensity_multiplier,
                volume_multiplier: o.volume_multiplier,
                deload: false,
            };
        }

        let w = f64::from(week);
        match model.progression_type {
            Some(ProgressionType::Linear) => WeekMultipliers {
                intensity_multiplier: 1.0 + 0.05 * w,
                volume_multiplier: 1.0 + 0.025 * w,
                deload: false,
            },
            Some(ProgressionType::Undulating) => WeekMultipliers {
                intensity_multiplier: 1.0 + 0.15 * (w * FRAC_PI_2).sin(),
                volume_multiplier: 1.0 + 0.15 * (w * FRAC_PI_2).cos(),
                deload: false,
            },
            Some(ProgressionType::Wave) => {
                let wave_week = f64::from(week % WAVE_LENGTH_WEEKS);
                WeekMultipliers {
                    intensity_multiplier: 1.0 + 0.1 * wave_week,
                    volume_multiplier: 1.0 - 0.05 * wave_week,
                    deload: false,
                }
            }
            None => WeekMultipliers::identity(),
        }
    }

    /// Schedule for weeks `0..weeks`
    pub fn project(
        model: Option<&ProgressionModel>,
        weeks: u32,
        base_structure: Option<&WorkoutStructure>,
    ) -> Vec<WeekPrescription> {
        (0..weeks)
            .map(|week| {
                let m = Self::for_week(week, model);
                WeekPrescription {
                    week,
                    intensity_multiplier: m.intensity_multiplier,
                    volume_multiplier: m.volume_multiplier,
                    deload: m.deload,
                    prescribed_total_sets: base_structure
                        .map(|s| scale_sets(s.total_sets, m.volume_multiplier)),
                }
            })
            .collect()
    }

    /// Adjust a week's multipliers by how much of the planned work was done.
    ///
    /// `completion_rate` is a percentage. Below 80 % both multipliers drop by
    /// 10 %; above 110 % intensity is held at the prescription and volume is
    /// capped at 1.0. Deload weeks are returned unchanged, as are all weeks
    /// of models without `auto_regulate`.
    pub fn auto_regulate(
        multipliers: WeekMultipliers,
        model: &ProgressionModel,
        completion_rate: f64,
    ) -> WeekMultipliers {
        if !model.auto_regulate || multipliers.deload || !completion_rate.is_finite() {
            return multipliers;
        }

        if completion_rate < 80.0 {
            tracing::info!(completion_rate, "Under target, reducing prescribed load");
            WeekMultipliers {
                intensity_multiplier: multipliers.intensity_multiplier * 0.9,
                volume_multiplier: multipliers.volume_multiplier * 0.9,
                deload: false,
            }
        } else if completion_rate > 110.0 {
            tracing::info!(completion_rate, "Over target, capping volume");
            WeekMultipliers {
                intensity_multiplier: multipliers.intensity_multiplier,
                volume_multiplier: multipliers.volume_multiplier.min(1.0),
                deload: false,
            }
        } else {
            multipliers
        }
    }
}

/// `max(1, round(sets × multiplier))`
pub(crate) fn scale_sets(total_sets: u32, multiplier: f64) -> u32 {
    let scaled = (f64::from(total_sets) * multiplier).round();
    if scaled.is_nan() || scaled < 1.0 {
        1
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

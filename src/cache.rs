//! Cached workout metrics and their staleness policy
//!
//! The metrics record is never edited by hand: calculators produce a
//! [`MetricsPatch`] and [`MetricsCache::merge`] builds a fresh record from
//! the old one, leaving the original untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default staleness window for cached metrics
pub const DEFAULT_CACHE_TIMEOUT_MINUTES: u32 = 60;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Individual derived metrics tracked by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    VolumeLoad,
    Density,
    Intensity,
    TotalTime,
    TotalRestTime,
    EstimatedCalories,
}

/// Derived metrics of a workout plan, persisted next to the plan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutMetrics {
    /// Sum of weight x reps x sets (kg)
    pub volume_load: f64,

    /// Volume load per second of workout time
    pub density: f64,

    /// Normalized difficulty score in [0, 1]
    pub intensity: f64,

    /// Seconds
    pub total_time: u32,

    /// Seconds
    pub total_rest_time: u32,

    /// kcal
    pub estimated_calories: f64,

    pub last_calculated: DateTime<Utc>,

    pub cache_timeout_minutes: u32,

    /// Metrics computed inside the current staleness window
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub computed: BTreeSet<MetricKind>,
}

impl WorkoutMetrics {
    /// Zeroed record, as created alongside a new plan
    pub fn new(created_at: DateTime<Utc>) -> Self {
        WorkoutMetrics {
            volume_load: 0.0,
            density: 0.0,
            intensity: 0.0,
            total_time: 0,
            total_rest_time: 0,
            estimated_calories: 0.0,
            last_calculated: created_at,
            cache_timeout_minutes: DEFAULT_CACHE_TIMEOUT_MINUTES,
            computed: BTreeSet::new(),
        }
    }
}

/// Partial update produced by a calculation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsPatch {
    pub volume_load: Option<f64>,
    pub density: Option<f64>,
    pub intensity: Option<f64>,
    pub total_time: Option<u32>,
    pub total_rest_time: Option<u32>,
    pub estimated_calories: Option<f64>,
}

impl MetricsPatch {
    pub fn volume_load(value: f64) -> Self {
        MetricsPatch {
            volume_load: Some(value),
            ..Default::default()
        }
    }

    pub fn density(value: f64) -> Self {
        MetricsPatch {
            density: Some(value),
            ..Default::default()
        }
    }

    pub fn intensity(value: f64) -> Self {
        MetricsPatch {
            intensity: Some(value),
            ..Default::default()
        }
    }

    pub fn total_time(value: u32) -> Self {
        MetricsPatch {
            total_time: Some(value),
            ..Default::default()
        }
    }

    pub fn total_rest_time(value: u32) -> Self {
        MetricsPatch {
            total_rest_time: Some(value),
            ..Default::default()
        }
    }

    pub fn estimated_calories(value: f64) -> Self {
        MetricsPatch {
            estimated_calories: Some(value),
            ..Default::default()
        }
    }

    /// Metric kinds this patch overwrites
    pub fn kinds(&self) -> BTreeSet<MetricKind> {
        let mut kinds = BTreeSet::new();
        if self.volume_load.is_some() {
            kinds.insert(MetricKind::VolumeLoad);
        }
        if self.density.is_some() {
            kinds.insert(MetricKind::Density);
        }
        if self.intensity.is_some() {
            kinds.insert(MetricKind::Intensity);
        }
        if self.total_time.is_some() {
            kinds.insert(MetricKind::TotalTime);
        }
        if self.total_rest_time.is_some() {
            kinds.insert(MetricKind::TotalRestTime);
        }
        if self.estimated_calories.is_some() {
            kinds.insert(MetricKind::EstimatedCalories);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// Validity check and merge policy for cached metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsCache {
    default_timeout_minutes: u32,
}

impl Default for MetricsCache {
    fn default() -> Self {
        MetricsCache::new(DEFAULT_CACHE_TIMEOUT_MINUTES)
    }
}

impl MetricsCache {
    pub fn new(default_timeout_minutes: u32) -> Self {
        MetricsCache {
            default_timeout_minutes,
        }
    }

    /// True iff `now - last_calculated` is strictly inside the window
    pub fn is_valid(
        last_calculated: DateTime<Utc>,
        timeout_minutes: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let elapsed = (now - last_calculated).num_milliseconds();
        elapsed < i64::from(timeout_minutes) * MILLIS_PER_MINUTE
    }

    /// True when `kind` was computed and the record is still inside its window
    pub fn is_fresh(metrics: &WorkoutMetrics, kind: MetricKind, now: DateTime<Utc>) -> bool {
        metrics.computed.contains(&kind)
            && Self::is_valid(metrics.last_calculated, metrics.cache_timeout_minutes, now)
    }

    /// Build the successor record: patch fields overwritten, window restarted.
    ///
    /// Metrics computed in a window that has already lapsed stop counting as
    /// computed; only the patched ones are fresh in the new window.
    pub fn merge(
        &self,
        current: &WorkoutMetrics,
        patch: &MetricsPatch,
        now: DateTime<Utc>,
    ) -> WorkoutMetrics {
        let mut computed = if Self::is_valid(
            current.last_calculated,
            current.cache_timeout_minutes,
            now,
        ) {
            current.computed.clone()
        } else {
            BTreeSet::new()
        };
        computed.extend(patch.kinds());

        WorkoutMetrics {
            volume_load: patch.volume_load.unwrap_or(current.volume_load),
            density: patch.density.unwrap_or(current.density),
            intensity: patch.intensity.unwrap_or(current.intensity),
            total_time: patch.total_time.unwrap_or(current.total_time),
            total_rest_time: patch.total_rest_time.unwrap_or(current.total_rest_time),
            estimated_calories: patch
                .estimated_calories
                .unwrap_or(current.estimated_calories),
            last_calculated: now,
            cache_timeout_minutes: self.default_timeout_minutes,
            computed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validity_window_boundary() {
        let last = t0();
        assert!(MetricsCache::is_valid(last, 60, last));
        assert!(MetricsCache::is_valid(
            last,
            60,
            last + Duration::minutes(60) - Duration::milliseconds(1)
        ));
        assert!(!MetricsCache::is_valid(last, 60, last + Duration::minutes(60)));
        assert!(!MetricsCache::is_valid(last, 60, last + Duration::hours(5)));
    }

    #[test]
    fn test_zero_timeout_is_never_valid() {
        assert!(!MetricsCache::is_valid(t0(), 0, t0()));
    }

    #[test]
    fn test_merge_is_copy_on_write() {
        let cache = MetricsCache::new(30);
        let current = WorkoutMetrics::new(t0());
        let now = t0() + Duration::minutes(5);

        let next = cache.merge(&current, &MetricsPatch::volume_load(1500.0), now);

        assert_eq!(current.volume_load, 0.0);
        assert_eq!(current.last_calculated, t0());
        assert!(current.computed.is_empty());

        assert_eq!(next.volume_load, 1500.0);
        assert_eq!(next.last_calculated, now);
        assert_eq!(next.cache_timeout_minutes, 30);
        assert!(next.computed.contains(&MetricKind::VolumeLoad));
    }

    #[test]
    fn test_merge_keeps_unpatched_fields() {
        let cache = MetricsCache::default();
        let mut current = WorkoutMetrics::new(t0());
        current.intensity = 0.42;
        current.total_time = 1800;

        let next = cache.merge(&current, &MetricsPatch::density(2.5), t0());
        assert_eq!(next.intensity, 0.42);
        assert_eq!(next.total_time, 1800);
        assert_eq!(next.density, 2.5);
    }

    #[test]
    fn test_merge_after_expiry_forgets_old_metrics() {
        let cache = MetricsCache::new(60);
        let first = cache.merge(
            &WorkoutMetrics::new(t0()),
            &MetricsPatch::intensity(0.5),
            t0(),
        );

        let within = cache.merge(&first, &MetricsPatch::total_time(600), t0() + Duration::minutes(10));
        assert!(within.computed.contains(&MetricKind::Intensity));
        assert!(within.computed.contains(&MetricKind::TotalTime));

        let later = t0() + Duration::hours(3);
        let after = cache.merge(&within, &MetricsPatch::total_time(700), later);
        assert!(!after.computed.contains(&MetricKind::Intensity));
        assert!(MetricsCache::is_fresh(&after, MetricKind::TotalTime, later));
        assert!(!MetricsCache::is_fresh(&after, MetricKind::Intensity, later));
    }

    #[test]
    fn test_metrics_json_shape() {
        let cache = MetricsCache::default();
        let metrics = cache.merge(
            &WorkoutMetrics::new(t0()),
            &MetricsPatch {
                volume_load: Some(1500.0),
                density: Some(2.5),
                total_time: Some(600),
                ..Default::default()
            },
            t0(),
        );

        let json = serde_json::to_value(&metrics).unwrap();
        for key in [
            "volumeLoad",
            "density",
            "intensity",
            "totalTime",
            "totalRestTime",
            "estimatedCalories",
            "lastCalculated",
            "cacheTimeoutMinutes",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["lastCalculated"], "2024-06-01T12:00:00Z");

        let empty = serde_json::to_value(WorkoutMetrics::new(t0())).unwrap();
        assert!(empty.get("computed").is_none());
    }

    #[test]
    fn test_patch_kinds() {
        assert!(MetricsPatch::default().is_empty());
        let patch = MetricsPatch {
            intensity: Some(0.3),
            estimated_calories: Some(250.0),
            ..Default::default()
        };
        let kinds: Vec<_> = patch.kinds().into_iter().collect();
        assert_eq!(kinds, vec![MetricKind::Intensity, MetricKind::EstimatedCalories]);
    }

    proptest! {
        #[test]
        fn test_validity_matches_window(
            elapsed_ms in 0i64..(48 * 60 * 60_000),
            timeout in 0u32..1440u32
        ) {
            let last = t0();
            let now = last + Duration::milliseconds(elapsed_ms);
            let expected = elapsed_ms < i64::from(timeout) * 60_000;
            prop_assert_eq!(MetricsCache::is_valid(last, timeout, now), expected);
        }
    }
}

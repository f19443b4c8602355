//! Lazy, cache-aware metric accessors for a workout plan
//!
//! A metric is only computed when it is requested and the plan's cached
//! value is stale (or was never computed in the current window). Each
//! computation writes its result back through [`MetricsCache::merge`].

use crate::cache::{MetricKind, MetricsCache, MetricsPatch, WorkoutMetrics};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::duration::{DurationCalculator, RestTimeCalculator};
use crate::export::PlanReport;
use crate::intensity::{CalorieEstimator, IntensityCalculator};
use crate::models::WorkoutPlan;
use crate::progression::{ProgressionEngine, WeekMultipliers, WeekPrescription};
use crate::variation::{PlanDraft, VariationGenerator, VariationOptions};
use crate::volume::{DensityCalculator, VolumeLoadCalculator};

/// Metrics engine bound to a configuration and a time source
pub struct MetricsEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    cache: MetricsCache,
    duration: DurationCalculator,
    clock: C,
}

impl MetricsEngine<SystemClock> {
    /// Engine using the wall clock
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for MetricsEngine<SystemClock> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Clock> MetricsEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        MetricsEngine {
            cache: MetricsCache::new(config.cache_timeout_minutes),
            duration: DurationCalculator::with_config(config.timing.clone()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn cached_or_compute<T: Copy + std::fmt::Debug>(
        &self,
        plan: &mut WorkoutPlan,
        kind: MetricKind,
        read: fn(&WorkoutMetrics) -> T,
        compute: impl FnOnce(&Self, &mut WorkoutPlan) -> T,
        patch: fn(T) -> MetricsPatch,
    ) -> T {
        if MetricsCache::is_fresh(&plan.metrics, kind, self.clock.now()) {
            let value = read(&plan.metrics);
            tracing::debug!(plan = %plan.id, metric = ?kind, ?value, "Metric cache hit");
            return value;
        }

        let value = compute(self, plan);
        plan.metrics = self.cache.merge(&plan.metrics, &patch(value), self.clock.now());
        tracing::debug!(plan = %plan.id, metric = ?kind, ?value, "Metric recalculated");
        value
    }

    /// Σ weight × reps × sets
    pub fn volume_load(&self, plan: &mut WorkoutPlan) -> f64 {
        self.cached_or_compute(
            plan,
            MetricKind::VolumeLoad,
            |m| m.volume_load,
            |_, plan| VolumeLoadCalculator::volume_load_f64(&plan.exercises),
            MetricsPatch::volume_load,
        )
    }

    /// Rest seconds
    pub fn total_rest_time(&self, plan: &mut WorkoutPlan) -> u32 {
        self.cached_or_compute(
            plan,
            MetricKind::TotalRestTime,
            |m| m.total_rest_time,
            |_, plan| RestTimeCalculator::total_rest_time(&plan.exercises, plan.structure.as_ref()),
            MetricsPatch::total_rest_time,
        )
    }

    /// Total seconds including rest and warmup/cooldown allowances
    pub fn total_time(&self, plan: &mut WorkoutPlan) -> u32 {
        self.cached_or_compute(
            plan,
            MetricKind::TotalTime,
            |m| m.total_time,
            |engine, plan| {
                engine.duration.total_time(
                    plan.estimated_duration,
                    plan.warmup_included,
                    plan.cooldown_included,
                    &plan.exercises,
                    plan.structure.as_ref(),
                )
            },
            MetricsPatch::total_time,
        )
    }

    /// Normalized difficulty in [0, 1]
    pub fn intensity(&self, plan: &mut WorkoutPlan) -> f64 {
        self.cached_or_compute(
            plan,
            MetricKind::Intensity,
            |m| m.intensity,
            |_, plan| {
                IntensityCalculator::intensity(
                    plan.difficulty,
                    plan.category,
                    plan.structure.as_ref(),
                    plan.equipment.len(),
                    &plan.exercises,
                )
            },
            MetricsPatch::intensity,
        )
    }

    /// Volume load per second
    pub fn density(&self, plan: &mut WorkoutPlan) -> f64 {
        self.cached_or_compute(
            plan,
            MetricKind::Density,
            |m| m.density,
            |engine, plan| {
                let volume = engine.volume_load(plan);
                let time = engine.total_time(plan);
                DensityCalculator::density(volume, f64::from(time))
            },
            MetricsPatch::density,
        )
    }

    /// kcal for the whole session
    pub fn estimated_calories(&self, plan: &mut WorkoutPlan) -> f64 {
        self.cached_or_compute(
            plan,
            MetricKind::EstimatedCalories,
            |m| m.estimated_calories,
            |engine, plan| {
                let intensity = engine.intensity(plan);
                let time = engine.total_time(plan);
                CalorieEstimator::estimated_calories(intensity, time, engine.config.body_weight_kg)
            },
            MetricsPatch::estimated_calories,
        )
    }

    /// Bring every metric up to date and return the resulting record
    pub fn refresh(&self, plan: &mut WorkoutPlan) -> WorkoutMetrics {
        self.volume_load(plan);
        self.total_rest_time(plan);
        self.total_time(plan);
        self.intensity(plan);
        self.density(plan);
        self.estimated_calories(plan);
        plan.metrics.clone()
    }

    /// Recompute every metric regardless of cache state, in a single merge
    #[tracing::instrument(skip_all, fields(plan = %plan.id))]
    pub fn recalculate_all(&self, plan: &mut WorkoutPlan) -> WorkoutMetrics {
        let volume_load = VolumeLoadCalculator::volume_load_f64(&plan.exercises);
        let total_rest_time =
            RestTimeCalculator::total_rest_time(&plan.exercises, plan.structure.as_ref());
        let total_time = self.duration.total_time(
            plan.estimated_duration,
            plan.warmup_included,
            plan.cooldown_included,
            &plan.exercises,
            plan.structure.as_ref(),
        );
        let intensity = IntensityCalculator::intensity(
            plan.difficulty,
            plan.category,
            plan.structure.as_ref(),
            plan.equipment.len(),
            &plan.exercises,
        );
        let patch = MetricsPatch {
            volume_load: Some(volume_load),
            density: Some(DensityCalculator::density(volume_load, f64::from(total_time))),
            intensity: Some(intensity),
            total_time: Some(total_time),
            total_rest_time: Some(total_rest_time),
            estimated_calories: Some(CalorieEstimator::estimated_calories(
                intensity,
                total_time,
                self.config.body_weight_kg,
            )),
        };

        plan.metrics = self.cache.merge(&plan.metrics, &patch, self.clock.now());
        tracing::info!(
            volume_load,
            total_time,
            intensity,
            "Recalculated all workout metrics"
        );
        plan.metrics.clone()
    }

    /// Multipliers for the plan's current week
    pub fn progression(&self, plan: &WorkoutPlan) -> WeekMultipliers {
        ProgressionEngine::multipliers(plan.created_at, self.clock.now(), plan.progression.as_ref())
    }

    /// Current week's multipliers, auto-regulated by plan completion when enabled
    pub fn regulated_progression(&self, plan: &WorkoutPlan, completion_rate: f64) -> WeekMultipliers {
        let week = self.progression(plan);
        match plan.progression.as_ref() {
            Some(model) => ProgressionEngine::auto_regulate(week, model, completion_rate),
            None => week,
        }
    }

    /// Current week index of the plan
    pub fn current_week(&self, plan: &WorkoutPlan) -> u32 {
        ProgressionEngine::current_week(plan.created_at, self.clock.now())
    }

    /// Projected schedule for the plan's first `weeks` weeks
    pub fn schedule(&self, plan: &WorkoutPlan, weeks: u32) -> Vec<WeekPrescription> {
        ProgressionEngine::project(plan.progression.as_ref(), weeks, plan.structure.as_ref())
    }

    /// Unsaved variation of the plan
    pub fn generate_variation(&self, plan: &WorkoutPlan, options: &VariationOptions) -> PlanDraft {
        VariationGenerator::generate_variation(plan, options)
    }

    /// Refresh the metrics and bundle them with progression and muscle analysis
    pub fn report(&self, plan: &mut WorkoutPlan, weeks: u32) -> PlanReport {
        self.refresh(plan);
        PlanReport::new(
            plan,
            self.clock.now(),
            self.current_week(plan),
            self.progression(plan),
            self.schedule(plan, weeks),
        )
    }
}

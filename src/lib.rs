// Library interface for LiftRS modules
// This allows integration tests and benches to access the core functionality

pub mod analysis;
pub mod cache;
pub mod clock;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod export;
pub mod intensity;
pub mod logging;
pub mod models;
pub mod progression;
pub mod variation;
pub mod volume;

// Re-export commonly used types for convenience
pub use models::*;
pub use analysis::{GoalInferencer, MuscleBalanceAnalyzer};
pub use cache::{MetricKind, MetricsCache, MetricsPatch, WorkoutMetrics};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, EngineConfig};
pub use duration::{DurationCalculator, RestTimeCalculator, TimingConfig};
pub use engine::MetricsEngine;
pub use error::{ExportError, InvalidInputError, LiftRsError, Result};
pub use export::{ExportFormat, PlanReport};
pub use intensity::{CalorieEstimator, IntensityCalculator};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use progression::{ProgressionEngine, WeekMultipliers, WeekPrescription};
pub use variation::{PlanDraft, VariationGenerator, VariationOptions};
pub use volume::{DensityCalculator, VolumeLoadCalculator};

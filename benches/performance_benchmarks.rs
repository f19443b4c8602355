use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use liftrs::{
    Difficulty, EngineConfig, ExerciseDefinition, ExerciseIntensity, ExerciseRole, FixedClock,
    IntensityCalculator, MeasurementType, MetricsEngine, ProgressionEngine, ProgressionModel,
    ProgressionType, VariationGenerator, VariationOptions, VolumeLoadCalculator, WeekOverride,
    WorkoutCategory, WorkoutExercise, WorkoutPlan, WorkoutStructure,
};

/// Performance benchmarks for the metrics engine
///
/// Plans of increasing size check that metric calculation stays linear in
/// the number of exercises and that cache hits stay cheap.

fn create_plan(exercises: usize) -> WorkoutPlan {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
    let mut plan = WorkoutPlan::new(
        format!("Benchmark {}", exercises),
        Difficulty::Intermediate,
        WorkoutCategory::Strength,
        created,
    );
    plan.estimated_duration = 60;
    plan.structure = Some(WorkoutStructure {
        sets: 4,
        circuits: 1,
        rounds: 1,
        rest_between_exercises: 120,
        rest_between_sets: 90,
        total_sets: (exercises * 4) as u32,
    });

    for i in 0..exercises {
        plan.exercises.push(WorkoutExercise {
            exercise: ExerciseDefinition {
                id: format!("exercise-{}", i),
                name: format!("Exercise {}", i),
                measurement_type: if i % 5 == 0 {
                    MeasurementType::Duration
                } else {
                    MeasurementType::Repetitions
                },
                primary_muscles: vec![["chest", "back", "quadriceps", "hamstrings"][i % 4].to_string()],
                secondary_muscles: vec![],
            },
            order: i as u32,
            sets: Some(4),
            repetitions: if i % 5 == 0 { None } else { Some(8 + (i % 5) as u32) },
            duration: if i % 5 == 0 { Some(45) } else { None },
            rest_time: Some(90),
            intensity: Some(ExerciseIntensity {
                weight: Some(Decimal::from(20 + (i % 10) * 5)),
                rpe: Some(7.5),
                ..Default::default()
            }),
            role: ExerciseRole::Primary,
        });
    }
    plan
}

fn bench_volume_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("Volume Load");

    for &size in &[1, 10, 100, 1000] {
        let plan = create_plan(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("volume_load", size), &plan, |b, plan| {
            b.iter(|| VolumeLoadCalculator::volume_load(black_box(&plan.exercises)));
        });
    }

    group.finish();
}

fn bench_recalculate_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recalculate All");
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 8, 6, 0, 0).unwrap());
    let engine = MetricsEngine::with_clock(EngineConfig::default(), &clock);

    for &size in &[1, 10, 100, 1000] {
        let plan = create_plan(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("recalculate_all", size), &plan, |b, plan| {
            b.iter_batched(
                || plan.clone(),
                |mut plan| engine.recalculate_all(&mut plan),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_cache_hits(c: &mut Criterion) {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 8, 6, 0, 0).unwrap());
    let engine = MetricsEngine::with_clock(EngineConfig::default(), &clock);
    let mut plan = create_plan(100);
    engine.refresh(&mut plan);

    c.bench_function("refresh_cached_100", |b| {
        b.iter(|| engine.refresh(black_box(&mut plan)));
    });
}

fn bench_intensity(c: &mut Criterion) {
    let plan = create_plan(50);

    c.bench_function("intensity_50", |b| {
        b.iter(|| {
            IntensityCalculator::intensity(
                black_box(plan.difficulty),
                black_box(plan.category),
                plan.structure.as_ref(),
                plan.equipment.len(),
                &plan.exercises,
            )
        });
    });
}

fn bench_progression_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("Progression Schedule");
    let mut overrides = BTreeMap::new();
    overrides.insert(
        6,
        WeekOverride {
            intensity_multiplier: 1.3,
            volume_multiplier: 0.8,
        },
    );

    for progression_type in [ProgressionType::Linear, ProgressionType::Undulating, ProgressionType::Wave] {
        let model = ProgressionModel {
            progression_type: Some(progression_type),
            deload_frequency: 4,
            weekly_overrides: overrides.clone(),
            auto_regulate: false,
        };
        let structure = WorkoutStructure {
            total_sets: 20,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new("project_52_weeks", format!("{:?}", progression_type)),
            &model,
            |b, model| {
                b.iter(|| ProgressionEngine::project(Some(model), 52, Some(&structure)));
            },
        );
    }

    group.finish();
}

fn bench_variation(c: &mut Criterion) {
    let plan = create_plan(20);
    let options = VariationOptions {
        intensity_change: Some(1),
        volume_change: Some(0.2),
        time_constraint: Some(45 * 60),
        exclude_equipment: vec!["barbell".to_string()],
    };

    c.bench_function("generate_variation", |b| {
        b.iter(|| VariationGenerator::generate_variation(black_box(&plan), &options));
    });
}

criterion_group!(
    benches,
    bench_volume_load,
    bench_recalculate_all,
    bench_cache_hits,
    bench_intensity,
    bench_progression_schedule,
    bench_variation
);

criterion_main!(benches);

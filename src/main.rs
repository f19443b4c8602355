use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use liftrs::analysis::{GoalInferencer, MuscleBalanceAnalyzer};
use liftrs::config::AppConfig;
use liftrs::export::{self, text, ExportFormat};
use liftrs::logging::init_logging;
use liftrs::{MetricsEngine, VariationOptions, WorkoutPlan};

/// LiftRS - Workout Metrics & Progression CLI
///
/// Computes derived metrics for strength and conditioning plans, projects
/// progression schedules and generates plan variations.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(author = "LiftRS Contributors")]
#[command(version)]
#[command(about = "Workout metrics and progression CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute (or read cached) metrics of a plan
    Metrics {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Ignore cached values and recompute everything
        #[arg(short, long)]
        recalculate: bool,

        /// Write the updated metrics back into the plan file
        #[arg(short, long)]
        save: bool,
    },

    /// Show this week's progression multipliers
    Progression {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Completion rate of last week's work in percent, for auto-regulation
        #[arg(long)]
        completion: Option<f64>,
    },

    /// Project the progression schedule over several weeks
    Schedule {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Number of weeks (config default if omitted)
        #[arg(short, long)]
        weeks: Option<u32>,

        /// Write the schedule to a file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, json, text)
        #[arg(short = 'f', long)]
        format: Option<String>,
    },

    /// Generate a variation of a plan
    Variation {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Step difficulty up (positive) or down (negative)
        #[arg(long, allow_hyphen_values = true)]
        intensity_change: Option<i32>,

        /// Fractional change of total sets, e.g. 0.2 or -0.25
        #[arg(long, allow_hyphen_values = true)]
        volume_change: Option<f64>,

        /// Target session length in seconds
        #[arg(long)]
        time_constraint: Option<u32>,

        /// Equipment id to exclude (repeatable)
        #[arg(long = "exclude-equipment")]
        exclude_equipment: Vec<String>,

        /// Write the draft as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze muscle balance and training goals
    Analyze {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Export a full plan report
    Report {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, json, text)
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Weeks of schedule included in the report
        #[arg(short, long)]
        weeks: Option<u32>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;
    tracing::debug!(path = %config_path.display(), "Configuration resolved");

    let engine = MetricsEngine::new(config.engine.clone());

    match cli.command {
        Commands::Metrics {
            plan,
            recalculate,
            save,
        } => {
            let mut workout = load_plan(&plan)?;
            let metrics = if recalculate {
                engine.recalculate_all(&mut workout)
            } else {
                engine.refresh(&mut workout)
            };

            println!("{}", format!("Metrics for {}", workout.name).green().bold());
            println!("{}", text::render_metrics(&metrics));

            if save {
                save_plan(&workout, &plan)?;
                println!("{}", format!("✓ Metrics saved to {}", plan.display()).green());
            }
        }

        Commands::Progression { plan, completion } => {
            let workout = load_plan(&plan)?;
            let week = engine.current_week(&workout);
            let multipliers = match completion {
                Some(rate) => engine.regulated_progression(&workout, rate),
                None => engine.progression(&workout),
            };

            println!("{}", format!("Week {} of {}", week, workout.name).blue().bold());
            println!("  Intensity: x{:.3}", multipliers.intensity_multiplier);
            println!("  Volume:    x{:.3}", multipliers.volume_multiplier);
            if multipliers.deload {
                println!("  {}", "Deload week".yellow());
            }
        }

        Commands::Schedule {
            plan,
            weeks,
            output,
            format,
        } => {
            let workout = load_plan(&plan)?;
            let weeks = weeks.unwrap_or(config.export.schedule_weeks);
            let schedule = engine.schedule(&workout, weeks);

            match output {
                Some(path) => {
                    let format = resolve_format(format.as_deref(), &config)?;
                    export::export_schedule(&schedule, format, &path)?;
                    println!("{}", format!("✓ Schedule exported to {}", path.display()).yellow());
                }
                None => {
                    println!("{}", format!("{} week schedule", weeks).cyan().bold());
                    println!("{}", text::render_schedule(&schedule));
                }
            }
        }

        Commands::Variation {
            plan,
            intensity_change,
            volume_change,
            time_constraint,
            exclude_equipment,
            output,
        } => {
            let workout = load_plan(&plan)?;
            let options = VariationOptions {
                intensity_change,
                volume_change,
                time_constraint,
                exclude_equipment,
            };
            options.validate()?;

            let draft = engine.generate_variation(&workout, &options);
            match output {
                Some(path) => {
                    export::json::export_json(&draft, &path)?;
                    println!("{}", format!("✓ Variation written to {}", path.display()).green());
                }
                None => println!("{}", serde_json::to_string_pretty(&draft)?),
            }
        }

        Commands::Analyze { plan } => {
            let workout = load_plan(&plan)?;
            let groups = MuscleBalanceAnalyzer::primary_muscle_groups(&workout.exercises);
            let pairs: Vec<_> = MuscleBalanceAnalyzer::balanced_pairs(&groups).collect();
            let goals = GoalInferencer::fitness_goals(workout.category, &workout.goals);

            println!("{}", format!("Analysis of {}", workout.name).cyan().bold());
            println!(
                "  Muscle groups: {}",
                groups.iter().cloned().collect::<Vec<_>>().join(", ")
            );
            if pairs.is_empty() {
                println!("  Balance: {}", "unbalanced".red());
            } else {
                println!("  Balance: {}", "balanced".green());
                for (a, b) in pairs {
                    println!("    {} / {}", a, b);
                }
            }
            for (trained, missing) in MuscleBalanceAnalyzer::unpaired_muscles(&groups) {
                println!("  {} {} without {}", "!".yellow(), trained, missing);
            }
            println!(
                "  Goals: {}",
                goals.iter().map(|g| format!("{:?}", g)).collect::<Vec<_>>().join(", ")
            );
        }

        Commands::Report {
            plan,
            output,
            format,
            weeks,
        } => {
            let mut workout = load_plan(&plan)?;
            let report = engine.report(
                &mut workout,
                weeks.unwrap_or(config.export.schedule_weeks),
            );

            match output {
                Some(path) => {
                    let format = resolve_format(format.as_deref(), &config)?;
                    export::export_report(&report, format, &path)?;
                    println!("{}", format!("✓ Report exported to {}", path.display()).yellow());
                }
                None => print!("{}", text::render_report(&report)),
            }
        }

        Commands::Config {
            list,
            set,
            get,
            init,
        } => {
            if init {
                config.save_to_file(&config_path)?;
                println!(
                    "{}",
                    format!("✓ Configuration written to {}", config_path.display()).green()
                );
            } else if list {
                println!("{}", format!("Configuration ({})", config_path.display()).bold());
                println!("{}", toml::to_string_pretty(&config)?);
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got '{}'", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{}", format!("✓ {} = {}", key.trim(), value.trim()).green());
            } else if let Some(key) = get {
                match config.get_value(&key) {
                    Some(value) => println!("{}", value),
                    None => anyhow::bail!("Unknown configuration key: {}", key),
                }
            }
        }
    }

    Ok(())
}

fn load_plan(path: &Path) -> Result<WorkoutPlan> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    let plan: WorkoutPlan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan JSON: {}", path.display()))?;
    plan.validate()
        .with_context(|| format!("Plan {} has invalid settings", plan.id))?;
    tracing::info!(plan = %plan.id, exercises = plan.exercises.len(), "Loaded workout plan");
    Ok(plan)
}

fn save_plan(plan: &WorkoutPlan, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(path, json).with_context(|| format!("Failed to write plan file: {}", path.display()))?;
    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &AppConfig) -> Result<ExportFormat> {
    match requested {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.export.default_format),
    }
}

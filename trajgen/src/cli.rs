//! Command-line surface. Every collection setting can come from a JSON file
//! (`--config`) and be overridden by an individual flag.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use collector::{CollectorConfig, SampleRange};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trajgen", version, about = "Generate trajectory datasets from slide-joint simulations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run randomized episodes in parallel and log every trajectory.
    Collect(CollectArgs),
    /// Shuffle a trajectory log and cut it into train/valid/test files.
    Split(SplitArgs),
    /// Concatenate several trajectory logs into one.
    Combine(CombineArgs),
}

/// Which stepper each worker drives.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Engine {
    /// Velocity-servo dynamics with a fixed integration timestep.
    Dynamic,
    /// Joints move at exactly the commanded speed.
    Kinematic,
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// JSON file with base settings; flags below override it. A relative
    /// `model_path` inside it is resolved against the file's directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// JSON model file; the built-in maze is used when absent.
    #[arg(long)]
    pub model: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Engine::Dynamic)]
    pub engine: Engine,
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// Episodes per worker.
    #[arg(short, long)]
    pub quota: Option<usize>,
    /// Decision steps per episode.
    #[arg(long)]
    pub steps: Option<usize>,
    /// Simulated time per decision step.
    #[arg(long)]
    pub step_duration: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f64>,
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], allow_negative_numbers = true)]
    pub obstacle_range: Option<Vec<f64>>,
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], allow_negative_numbers = true)]
    pub direction_range: Option<Vec<f64>>,
    #[arg(long, allow_negative_numbers = true)]
    pub lower_threshold: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub upper_threshold: Option<f64>,
    #[arg(long)]
    pub tracked_joint: Option<String>,
    #[arg(long)]
    pub tracked_actuator: Option<String>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fixed decimals per sample instead of the shortest exact form.
    #[arg(long)]
    pub precision: Option<usize>,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

fn range(values: &[f64]) -> SampleRange {
    SampleRange::new(values[0], values[1])
}

impl CollectArgs {
    /// Merge the config file (or defaults) with the flags.
    pub fn resolve(&self) -> Result<CollectorConfig> {
        let mut config = match &self.config {
            Some(path) => CollectorConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => CollectorConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model_path = Some(model.clone());
        }
        if let Some(output) = &self.output {
            config.output_path.clone_from(output);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(quota) = self.quota {
            config.quota_per_worker = quota;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.precision.is_some() {
            config.precision = self.precision;
        }

        let episode = &mut config.episode;
        if let Some(steps) = self.steps {
            episode.steps = steps;
        }
        if let Some(duration) = self.step_duration {
            episode.step_duration = duration;
        }
        if let Some(speed) = self.speed {
            episode.speed = speed;
        }
        if let Some(values) = &self.obstacle_range {
            episode.obstacle_range = range(values);
        }
        if let Some(values) = &self.direction_range {
            episode.direction_range = range(values);
        }
        if let Some(lower) = self.lower_threshold {
            episode.lower_threshold = lower;
        }
        if let Some(upper) = self.upper_threshold {
            episode.upper_threshold = upper;
        }
        if let Some(joint) = &self.tracked_joint {
            episode.tracked_joint.clone_from(joint);
        }
        if let Some(actuator) = &self.tracked_actuator {
            episode.tracked_actuator.clone_from(actuator);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    pub input: PathBuf,
    /// Directory for the split files; defaults to the input's directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Records in the training set.
    #[arg(long, requires = "valid", conflicts_with_all = ["train_fraction", "valid_fraction"])]
    pub train: Option<usize>,
    /// Records in the validation set.
    #[arg(long, requires = "train")]
    pub valid: Option<usize>,
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,
    #[arg(long, default_value_t = 0.1)]
    pub valid_fraction: f64,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Keep the input order instead of shuffling first.
    #[arg(long)]
    pub no_shuffle: bool,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(short, long)]
    pub output: PathBuf,
    /// Shuffle the combined records with this seed.
    #[arg(long)]
    pub shuffle_seed: Option<u64>,
}

//! # trajgen Application Logic
//!
//! Dispatches the parsed command line. `collect` resolves the model once and
//! shares it between all workers; each worker still gets its own stepper.

use anyhow::{bail, Context, Result};
use collector::dataset::{self, SplitSpec};
use physics::{KinematicStepper, PhysicsError, SlideModel, SlideSim, Stepper};
use std::path::Path;
use std::sync::Arc;

use crate::cli::{Cli, CollectArgs, CombineArgs, Command, Engine, SplitArgs};

/// Run the selected subcommand.
///
/// # Errors
///
/// Returns configuration, simulation and I/O failures, and an incomplete
/// collection run.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Collect(args) => collect(&args),
        Command::Split(args) => split(&args),
        Command::Combine(args) => combine(&args),
    }
}

fn load_model(path: Option<&Path>) -> Result<SlideModel> {
    match path {
        Some(path) => SlideModel::load(path)
            .with_context(|| format!("failed to load model {}", path.display())),
        None => {
            tracing::info!("No model file given, using the built-in maze");
            Ok(SlideModel::maze())
        }
    }
}

fn collect(args: &CollectArgs) -> Result<()> {
    let config = args.resolve()?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let model = Arc::new(load_model(config.model_path.as_deref())?);
    let engine = args.engine;
    tracing::info!(
        "Collecting {} trajectories with the {:?} engine",
        config.total_episodes(),
        engine
    );

    let make_stepper = || -> Result<Box<dyn Stepper>, PhysicsError> {
        let stepper: Box<dyn Stepper> = match engine {
            Engine::Dynamic => Box::new(SlideSim::new(Arc::clone(&model))?),
            Engine::Kinematic => Box::new(KinematicStepper::new(&model)?),
        };
        Ok(stepper)
    };
    let summary = collector::collect_to_file(&config, make_stepper)
        .context("trajectory collection failed")?;

    for failure in &summary.failures {
        tracing::error!("{failure}");
    }
    let summary = summary.ensure_complete()?;
    tracing::info!(
        "Done: {} trajectories (seed {}) in {:.2?}",
        summary.written,
        summary.seed,
        summary.elapsed
    );
    Ok(())
}

fn split(args: &SplitArgs) -> Result<()> {
    let spec = match (args.train, args.valid) {
        (Some(train), Some(valid)) => SplitSpec::Counts { train, valid },
        (None, None) => SplitSpec::Fractions {
            train: args.train_fraction,
            valid: args.valid_fraction,
        },
        _ => bail!("--train and --valid must be given together"),
    };

    let Some(stem) = args.input.file_stem().and_then(|s| s.to_str()) else {
        bail!("cannot derive an output name from {}", args.input.display());
    };
    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut records = dataset::read_records(&args.input)?;
    if !args.no_shuffle {
        dataset::shuffle(&mut records, args.seed);
    }
    let summary = dataset::write_split(&records, spec, &out_dir, stem)?;
    tracing::info!(
        "Split {} records: {} train, {} valid, {} test",
        records.len(),
        summary.train.1,
        summary.valid.1,
        summary.test.1
    );
    Ok(())
}

fn combine(args: &CombineArgs) -> Result<()> {
    let count = dataset::combine(&args.inputs, &args.output, args.shuffle_seed)?;
    tracing::info!("Combined {} records into {:?}", count, args.output);
    Ok(())
}

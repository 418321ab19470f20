//! # Worker Pool Coordinator
//!
//! Runs one OS thread per [`SimulationHandle`]. Every worker owns its handle
//! and its own generator, seeded from a master seed, so the only state the
//! workers share is the [`Sink`]. Progress is pushed through an unbounded
//! channel and reported by the coordinating thread, which keeps logging off
//! the workers' critical path.
//!
//! A worker that fails stops on the spot; the others carry on and the failure
//! is reported back in the [`RunSummary`].

use crate::config::CollectorConfig;
use crate::encode::encode;
use crate::episode::EpisodeGenerator;
use crate::handle::SimulationHandle;
use crate::sink::Sink;
use crate::CollectorError;
use physics::{PhysicsError, Stepper};
use std::io::Write;
use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

/// A worker crossed another whole percent of its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub worker: usize,
    pub percent: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub worker: usize,
    pub episodes: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct RunSummary {
    pub seed: u64,
    pub expected: usize,
    pub written: usize,
    pub reports: Vec<WorkerReport>,
    pub failures: Vec<CollectorError>,
    pub elapsed: Duration,
}

impl RunSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.written == self.expected
    }

    /// Turn an incomplete run into an error.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::ShortRun`] unless every expected record was written.
    pub fn ensure_complete(self) -> Result<Self, CollectorError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(CollectorError::ShortRun {
                written: self.written,
                expected: self.expected,
            })
        }
    }
}

pub struct Coordinator {
    generator: EpisodeGenerator,
    quota: usize,
    precision: Option<usize>,
    seed: u64,
}

impl Coordinator {
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidConfig`] if the configuration fails validation.
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectorError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        Ok(Self {
            generator: EpisodeGenerator::new(config.episode.clone()),
            quota: config.quota_per_worker,
            precision: config.precision,
            seed,
        })
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run every handle to its full quota, logging progress.
    ///
    /// # Errors
    ///
    /// Only fails up front, when `handles` is empty. Worker failures are
    /// collected in the returned summary.
    pub fn run<W: Write + Send>(
        &self,
        handles: Vec<SimulationHandle>,
        sink: &Sink<W>,
    ) -> Result<RunSummary, CollectorError> {
        self.run_with_progress(handles, sink, |p| {
            tracing::info!(
                "Worker #{} has collected {}% of its data ({} episodes)",
                p.worker,
                p.percent,
                p.completed
            );
        })
    }

    /// Same as [`Coordinator::run`] with a caller-supplied progress observer.
    /// The observer runs on the coordinating thread, never on a worker.
    ///
    /// # Errors
    ///
    /// Only fails up front, when `handles` is empty.
    pub fn run_with_progress<W, F>(
        &self,
        handles: Vec<SimulationHandle>,
        sink: &Sink<W>,
        mut on_progress: F,
    ) -> Result<RunSummary, CollectorError>
    where
        W: Write + Send,
        F: FnMut(Progress),
    {
        if handles.is_empty() {
            return Err(CollectorError::InvalidConfig("no simulation handles to run".into()));
        }

        let start = Instant::now();
        let workers = handles.len();
        let expected = workers * self.quota;
        let before = sink.records();

        let mut master = fastrand::Rng::with_seed(self.seed);
        let seeds: Vec<u64> = (0..workers).map(|_| master.u64(..)).collect();
        tracing::info!(
            "Starting {} workers x {} episodes (seed {})",
            workers,
            self.quota,
            self.seed
        );

        let mut reports = Vec::with_capacity(workers);
        let mut failures = Vec::new();

        std::thread::scope(|s| {
            let (tx, rx) = mpsc::channel();

            let tasks: Vec<_> = handles
                .into_iter()
                .zip(seeds)
                .enumerate()
                .map(|(worker, (handle, seed))| {
                    let tx = tx.clone();
                    tracing::info!("Worker #{} starts", worker);
                    s.spawn(move || {
                        self.collect(worker, handle, fastrand::Rng::with_seed(seed), sink, &tx)
                    })
                })
                .collect();

            // The loop below ends once every worker has dropped its sender.
            drop(tx);
            for progress in rx {
                on_progress(progress);
            }

            for (worker, task) in tasks.into_iter().enumerate() {
                match task.join() {
                    Ok(Ok(report)) => {
                        tracing::info!(
                            "Worker #{} finished {} episodes in {:.2?}",
                            worker,
                            report.episodes,
                            report.elapsed
                        );
                        reports.push(report);
                    }
                    Ok(Err(e)) => {
                        tracing::error!("Worker #{} failed: {}", worker, e);
                        failures.push(e);
                    }
                    Err(_) => {
                        tracing::error!("Worker #{} panicked", worker);
                        failures.push(CollectorError::WorkerPanicked(worker));
                    }
                }
            }
        });

        let written = sink.records() - before;
        if written != expected {
            tracing::warn!("Wrote {} of {} expected records", written, expected);
        }

        Ok(RunSummary {
            seed: self.seed,
            expected,
            written,
            reports,
            failures,
            elapsed: start.elapsed(),
        })
    }

    fn collect<W: Write + Send>(
        &self,
        worker: usize,
        mut handle: SimulationHandle,
        mut rng: fastrand::Rng,
        sink: &Sink<W>,
        progress: &Sender<Progress>,
    ) -> Result<WorkerReport, CollectorError> {
        let start = Instant::now();
        let mut last_percent = 0;

        for completed in 0..self.quota {
            let fail = |source: CollectorError| CollectorError::Worker {
                worker,
                completed,
                source: Box::new(source),
            };

            let trajectory = self
                .generator
                .run_episode(&mut handle, &mut rng)
                .map_err(|e| fail(e.into()))?;
            sink.append(&encode(&trajectory, self.precision))
                .map_err(fail)?;

            let done = completed + 1;
            let percent = done * 100 / self.quota;
            if percent > last_percent {
                last_percent = percent;
                // Progress is advisory; a closed channel must not stop the worker.
                let _ = progress.send(Progress {
                    worker,
                    percent,
                    completed: done,
                });
            }
        }

        Ok(WorkerReport {
            worker,
            episodes: self.quota,
            elapsed: start.elapsed(),
        })
    }
}

/// Build one handle per worker, open the output, run, and close the output.
///
/// Stepper construction and opening the output both happen before any
/// worker starts; either failing aborts the run.
///
/// # Errors
///
/// Returns configuration, stepper construction, output and final flush
/// errors. Worker failures are reported in the summary instead.
pub fn collect_to_file<F>(
    config: &CollectorConfig,
    make_stepper: F,
) -> Result<RunSummary, CollectorError>
where
    F: FnMut() -> Result<Box<dyn Stepper>, PhysicsError>,
{
    let coordinator = Coordinator::new(config)?;
    let handles = SimulationHandle::pool(config.workers, &config.episode, make_stepper)?;
    let sink = Sink::create(&config.output_path)?;

    let summary = coordinator.run(handles, &sink)?;
    sink.finish()?;
    tracing::info!(
        "Collected {} trajectories into {:?} in {:.2?}",
        summary.written,
        config.output_path,
        summary.elapsed
    );
    Ok(summary)
}

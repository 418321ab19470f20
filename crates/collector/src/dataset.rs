//! # Dataset Preparation
//!
//! Post-processing for collected logs: merging shards, shuffling, and cutting
//! a log into train / validation / test files. Records are validated on the
//! way in, so a truncated or hand-edited log is caught before it reaches a
//! training pipeline.

use crate::encode::DELIMITER;
use crate::CollectorError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Read every record of a trajectory log.
///
/// Blank lines are skipped. Every other line must parse as floats and carry
/// the same number of fields as the first record.
///
/// # Errors
///
/// Returns [`CollectorError::Io`] on read failure and
/// [`CollectorError::MalformedRecord`] on the first bad line.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<String>, CollectorError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CollectorError::io(path, source))?;

    let mut records = Vec::new();
    let mut width = None;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| CollectorError::io(path, source))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = check_record(&line).map_err(|reason| CollectorError::MalformedRecord {
            line: i + 1,
            reason,
        })?;
        match width {
            None => width = Some(fields),
            Some(w) if w != fields => {
                return Err(CollectorError::MalformedRecord {
                    line: i + 1,
                    reason: format!("expected {w} fields, found {fields}"),
                });
            }
            Some(_) => {}
        }
        records.push(line);
    }

    tracing::info!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

fn check_record(line: &str) -> Result<usize, String> {
    let mut fields = 0;
    for field in line.split(DELIMITER) {
        field
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("field {} `{field}`: {e}", fields + 1))?;
        fields += 1;
    }
    Ok(fields)
}

/// Write `records` one per line, creating or truncating `path`.
///
/// # Errors
///
/// Returns [`CollectorError::Io`] if the file cannot be created or written.
pub fn write_records(path: impl AsRef<Path>, records: &[String]) -> Result<(), CollectorError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| CollectorError::io(path, source))?;
    let mut out = BufWriter::new(file);
    for record in records {
        writeln!(out, "{record}").map_err(|source| CollectorError::io(path, source))?;
    }
    out.flush().map_err(|source| CollectorError::io(path, source))
}

pub fn shuffle(records: &mut [String], seed: u64) {
    fastrand::Rng::with_seed(seed).shuffle(records);
}

/// How many records go to the training and validation sets. The test set
/// takes whatever is left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitSpec {
    Counts { train: usize, valid: usize },
    /// Proportions of the whole log; cut points are rounded to the nearest record.
    Fractions { train: f64, valid: f64 },
}

impl SplitSpec {
    /// Cut points `(train_end, valid_end)` for a log of `total` records.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidConfig`] if the split does not fit.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bounds(&self, total: usize) -> Result<(usize, usize), CollectorError> {
        match *self {
            Self::Counts { train, valid } => train
                .checked_add(valid)
                .filter(|&end| end <= total)
                .map(|end| (train, end))
                .ok_or_else(|| {
                    CollectorError::InvalidConfig(format!(
                        "split of {train} + {valid} exceeds {total} records"
                    ))
                }),
            Self::Fractions { train, valid } => {
                let ok = |f: f64| f.is_finite() && (0.0..=1.0).contains(&f);
                if !(ok(train) && ok(valid) && train + valid <= 1.0 + f64::EPSILON) {
                    return Err(CollectorError::InvalidConfig(format!(
                        "split fractions {train} + {valid} must lie in [0, 1]"
                    )));
                }
                let cut = |f: f64| ((total as f64 * f).round() as usize).min(total);
                Ok((cut(train), cut(train + valid)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub train: (PathBuf, usize),
    pub valid: (PathBuf, usize),
    pub test: (PathBuf, usize),
}

/// Write `records` into `<stem>_train.csv`, `<stem>_valid.csv` and
/// `<stem>_test.csv` under `out_dir`, in order.
///
/// # Errors
///
/// Fails if the split does not fit or any output cannot be written.
pub fn write_split(
    records: &[String],
    spec: SplitSpec,
    out_dir: impl AsRef<Path>,
    stem: &str,
) -> Result<SplitSummary, CollectorError> {
    let out_dir = out_dir.as_ref();
    let (train_end, valid_end) = spec.bounds(records.len())?;

    let write_part = |suffix: &str, part: &[String]| -> Result<(PathBuf, usize), CollectorError> {
        let path = out_dir.join(format!("{stem}_{suffix}.csv"));
        write_records(&path, part)?;
        tracing::info!("Wrote {} records to {:?}", part.len(), path);
        Ok((path, part.len()))
    };

    Ok(SplitSummary {
        train: write_part("train", &records[..train_end])?,
        valid: write_part("valid", &records[train_end..valid_end])?,
        test: write_part("test", &records[valid_end..])?,
    })
}

/// Concatenate several logs into `output`, optionally shuffling the result.
/// All inputs must share one record width.
///
/// # Errors
///
/// Fails on unreadable or malformed inputs, mismatched widths, or if the
/// output cannot be written.
pub fn combine(
    inputs: &[PathBuf],
    output: impl AsRef<Path>,
    shuffle_seed: Option<u64>,
) -> Result<usize, CollectorError> {
    let mut all = Vec::new();
    let mut width = None;
    for input in inputs {
        let records = read_records(input)?;
        if let Some(first) = records.first() {
            let fields = first.split(DELIMITER).count();
            match width {
                None => width = Some(fields),
                Some(w) if w != fields => {
                    return Err(CollectorError::MalformedRecord {
                        line: 1,
                        reason: format!("{input:?} has {fields} fields per record, expected {w}"),
                    });
                }
                Some(_) => {}
            }
        }
        all.extend(records);
    }

    if let Some(seed) = shuffle_seed {
        shuffle(&mut all, seed);
    }
    write_records(output, &all)?;
    Ok(all.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_bounds() {
        let spec = SplitSpec::Counts { train: 7, valid: 2 };
        assert_eq!(spec.bounds(10).unwrap(), (7, 9));
        assert!(spec.bounds(8).is_err());

        let huge = SplitSpec::Counts { train: usize::MAX, valid: 1 };
        assert!(matches!(huge.bounds(10), Err(CollectorError::InvalidConfig(_))));
    }

    #[test]
    fn fraction_bounds_round_to_nearest() {
        let spec = SplitSpec::Fractions { train: 0.8, valid: 0.1 };
        assert_eq!(spec.bounds(10).unwrap(), (8, 9));
        assert_eq!(spec.bounds(3).unwrap(), (2, 3));
        assert!(SplitSpec::Fractions { train: 0.9, valid: 0.2 }.bounds(10).is_err());
    }

    #[test]
    fn record_check_counts_fields() {
        assert_eq!(check_record("1,2.5,-3").unwrap(), 3);
        assert!(check_record("1,,3").is_err());
        assert!(check_record("1,abc").is_err());
    }

    #[test]
    fn shuffle_is_seeded() {
        let original: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut a = original.clone();
        let mut b = original.clone();
        shuffle(&mut a, 3);
        shuffle(&mut b, 3);
        assert_eq!(a, b);
        assert_ne!(a, original);
    }
}

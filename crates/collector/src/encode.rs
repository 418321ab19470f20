//! Text encoding of trajectories: one comma-separated line per trajectory.

use crate::episode::Trajectory;

pub const DELIMITER: char = ',';

/// Render `trajectory` as a single record terminated by `\n`.
///
/// Samples use the shortest text that parses back to the same `f64`
/// (`1.0` becomes `1`) unless `precision` fixes the number of decimals.
#[must_use]
pub fn encode(trajectory: &Trajectory, precision: Option<usize>) -> String {
    encode_samples(trajectory.samples(), precision)
}

#[must_use]
pub fn encode_samples(samples: &[f64], precision: Option<usize>) -> String {
    // Typical samples render in well under 24 bytes.
    let mut line = String::with_capacity(samples.len() * 24 + 1);
    for (i, sample) in samples.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        match precision {
            Some(digits) => line.push_str(&format!("{sample:.digits$}")),
            None => line.push_str(&sample.to_string()),
        }
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_render_without_fraction() {
        assert_eq!(encode_samples(&[1.0, 2.0, 3.0], None), "1,2,3\n");
    }

    #[test]
    fn fractions_round_trip() {
        let samples = [0.1, -9.875, 1.0e-7, 12.345_678_901_234];
        let line = encode_samples(&samples, None);
        let parsed: Vec<f64> = line
            .trim_end()
            .split(DELIMITER)
            .map(|f| f.parse().unwrap())
            .collect();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn fixed_precision_matches_six_decimals() {
        assert_eq!(encode_samples(&[1.0, -0.5], Some(6)), "1.000000,-0.500000\n");
    }

    #[test]
    fn single_sample_has_no_delimiter() {
        assert_eq!(encode_samples(&[4.25], None), "4.25\n");
    }
}

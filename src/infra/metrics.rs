// ============================================================
// Layer 6 — Evaluation Metrics
// ============================================================
// Scores an interpolated frame against the ground-truth middle
// frame and records one CSV row per triplet.
//
// Metrics recorded per sample:
//   - name:       triplet directory relative to the dataset root
//   - psnr:       peak signal-to-noise ratio in dB (peak = 1.0)
//   - mae:        mean absolute error over all channels
//   - elapsed_ms: wall time of the interpolation call
//
// Output file: <report_dir>/metrics.csv
//
//   sample,psnr,mae,elapsed_ms
//   00001/0001,34.215300,0.011200,412.5
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::frame::Frame;

/// PSNR reported for bit-identical frames, where the ratio is unbounded.
pub const MAX_PSNR: f64 = 100.0;

/// Peak signal-to-noise ratio between two same-sized frames, values in [0, 1].
/// Both frames are clamped to [0, 1] first, matching what gets written to disk.
pub fn psnr(a: &Frame, b: &Frame) -> f64 {
    let mse = mean_squared_error(a, b);
    if mse <= 0.0 {
        return MAX_PSNR;
    }
    (-10.0 * mse.log10()).min(MAX_PSNR)
}

pub fn mean_squared_error(a: &Frame, b: &Frame) -> f64 {
    mean_of(a, b, |d| d * d)
}

pub fn mean_abs_error(a: &Frame, b: &Frame) -> f64 {
    mean_of(a, b, f64::abs)
}

fn mean_of(a: &Frame, b: &Frame, f: impl Fn(f64) -> f64) -> f64 {
    debug_assert!(a.same_size(b));
    if a.data.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.data.iter()
        .zip(&b.data)
        .map(|(x, y)| f(x.clamp(0.0, 1.0) as f64 - y.clamp(0.0, 1.0) as f64))
        .sum();
    sum / a.data.len() as f64
}

/// One row of evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetrics {
    /// Triplet directory relative to the dataset root
    pub name:       String,
    /// Peak signal-to-noise ratio in dB, capped at MAX_PSNR
    pub psnr:       f64,
    /// Mean absolute error on the 0..1 scale
    pub mae:        f64,
    /// Wall-clock time of the interpolate call
    pub elapsed_ms: f64,
}

impl SampleMetrics {
    /// Compare a predicted frame with its ground truth.
    pub fn score(name: impl Into<String>, predicted: &Frame, truth: &Frame, elapsed_ms: f64) -> Self {
        Self {
            name: name.into(),
            psnr: psnr(predicted, truth),
            mae:  mean_abs_error(predicted, truth),
            elapsed_ms,
        }
    }
}

/// Averages over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub samples:         usize,
    pub mean_psnr:       f64,
    pub mean_mae:        f64,
    pub mean_elapsed_ms: f64,
}

/// Mean of every column; all zeros for an empty slice.
pub fn summarize(rows: &[SampleMetrics]) -> EvalSummary {
    if rows.is_empty() {
        return EvalSummary::default();
    }
    let n = rows.len() as f64;
    EvalSummary {
        samples:         rows.len(),
        mean_psnr:       rows.iter().map(|r| r.psnr).sum::<f64>() / n,
        mean_mae:        rows.iter().map(|r| r.mae).sum::<f64>() / n,
        mean_elapsed_ms: rows.iter().map(|r| r.elapsed_ms).sum::<f64>() / n,
    }
}

/// Appends per-sample metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "sample,psnr,mae,elapsed_ms")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &SampleMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{:.6},{:.6},{:.1}", m.name, m.psnr, m.mae, m.elapsed_ms)?;

        tracing::debug!("{}: psnr={:.2} dB, mae={:.4}", m.name, m.psnr, m.mae);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psnr_identical_is_capped() {
        let f = Frame::filled(4, 4, [0.3, 0.6, 0.9]);
        assert_eq!(psnr(&f, &f), MAX_PSNR);
    }

    #[test]
    fn test_psnr_known_value() {
        // Uniform error of 0.1 → MSE 0.01 → 20 dB
        let a = Frame::filled(4, 4, [0.5; 3]);
        let b = Frame::filled(4, 4, [0.6; 3]);
        assert!((psnr(&a, &b) - 20.0).abs() < 1e-4);
        assert!((mean_abs_error(&a, &b) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_summarize() {
        let rows = vec![
            SampleMetrics { name: "a".into(), psnr: 30.0, mae: 0.02, elapsed_ms: 10.0 },
            SampleMetrics { name: "b".into(), psnr: 40.0, mae: 0.04, elapsed_ms: 30.0 },
        ];
        let s = summarize(&rows);
        assert_eq!(s.samples, 2);
        assert!((s.mean_psnr - 35.0).abs() < 1e-9);
        assert!((s.mean_elapsed_ms - 20.0).abs() < 1e-9);
        assert_eq!(summarize(&[]), EvalSummary::default());
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir = std::env::temp_dir().join(format!("ifnet-metrics-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&SampleMetrics { name: "x/1".into(), psnr: 31.5, mae: 0.01, elapsed_ms: 5.0 }).unwrap();
        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["sample,psnr,mae,elapsed_ms", "x/1,31.500000,0.010000,5.0"]);

        fs::remove_dir_all(&dir).ok();
    }
}

// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Measures interpolation quality on a triplet dataset:
//
//   Step 1: Discover triplet directories       (Layer 4 - data)
//   Step 2: Pick a reproducible subset         (Layer 4 - data)
//   Step 3: Load the checkpoint                (Layer 6 - infra)
//   Step 4: For each triplet, interpolate im1/im3 and score
//           the result against im2             (Layer 5 + 6)
//   Step 5: Append every score to metrics.csv  (Layer 6 - infra)
//
// A triplet that fails to load is logged and skipped; the
// summary only averages the triplets that were scored.

use anyhow::{bail, Result};
use burn::{data::dataset::Dataset, prelude::*};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

use crate::data::{
    dataset::{TripletDataset, TripletSample},
    loader::ImageLoader,
    sampler::sample_subset,
};
use crate::domain::{settings::InterpolationSettings, traits::FrameInterpolator};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{summarize, EvalSummary, MetricsLogger, SampleMetrics},
};
use crate::ml::device::{dispatch, BackendTask, ComputeBackend};
use crate::ml::inferencer::Interpolator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    /// Root searched recursively for im1/im2/im3 directories
    pub dataset_dir:    String,
    /// Where metrics.csv is appended
    pub report_dir:     String,
    pub checkpoint_dir: String,
    /// Score at most this many triplets
    pub limit:          Option<usize>,
    /// Seed for picking the subset when `limit` is set
    pub seed:           u64,
    pub backend:        ComputeBackend,
    pub settings:       InterpolationSettings,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            dataset_dir:    "data/triplets".to_string(),
            report_dir:     "reports".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            limit:          None,
            seed:           42,
            backend:        ComputeBackend::default(),
            settings:       InterpolationSettings::default(),
        }
    }
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvalSummary> {
        let cfg = &self.config;

        // ── Step 1 + 2: discover and subset ───────────────────────────────────
        let dataset = TripletDataset::discover(&cfg.dataset_dir)?;
        if dataset.is_empty() {
            bail!("no triplets (im1.png, im2.png, im3.png) found under '{}'", cfg.dataset_dir);
        }
        let samples: Vec<TripletSample> = (0..dataset.len())
            .filter_map(|i| dataset.get(i))
            .collect();
        let samples = sample_subset(samples, cfg.limit, cfg.seed);

        let task = EvaluateTask {
            samples,
            ckpt:       CheckpointManager::new(&cfg.checkpoint_dir),
            report_dir: PathBuf::from(&cfg.report_dir),
            settings:   cfg.settings,
        };
        dispatch(cfg.backend, task)
    }
}

struct EvaluateTask {
    samples:    Vec<TripletSample>,
    ckpt:       CheckpointManager,
    report_dir: PathBuf,
    settings:   InterpolationSettings,
}

impl BackendTask for EvaluateTask {
    type Output = EvalSummary;

    fn run<B: Backend>(self, device: B::Device) -> Result<EvalSummary> {
        // ── Step 3: model ─────────────────────────────────────────────────────
        let interp = Interpolator::<B>::from_checkpoint(&self.ckpt, self.settings, device)?;
        let logger = MetricsLogger::new(&self.report_dir)?;

        // ── Step 4 + 5: score every triplet ───────────────────────────────────
        let total = self.samples.len();
        let mut rows = Vec::with_capacity(total);
        for (i, sample) in self.samples.iter().enumerate() {
            match score_triplet(&interp, sample) {
                Ok(row) => {
                    logger.log(&row)?;
                    rows.push(row);
                }
                Err(e) => tracing::warn!("Skipping '{}': {:#}", sample.name, e),
            }
            if (i + 1) % 50 == 0 {
                tracing::info!("Evaluated {}/{}", i + 1, total);
            }
        }

        let summary = summarize(&rows);
        tracing::info!(
            "Scored {} triplets: PSNR {:.2} dB, MAE {:.4}, {:.1} ms/frame, report '{}'",
            summary.samples,
            summary.mean_psnr,
            summary.mean_mae,
            summary.mean_elapsed_ms,
            logger.csv_path().display()
        );
        Ok(summary)
    }
}

fn score_triplet<I: FrameInterpolator>(interp: &I, sample: &TripletSample) -> Result<SampleMetrics> {
    let first  = ImageLoader::load(&sample.first)?;
    let middle = ImageLoader::load(&sample.middle)?;
    let last   = ImageLoader::load(&sample.last)?;
    if !middle.same_size(&first) {
        bail!("ground truth is {}x{}, inputs are {}x{}",
            middle.width, middle.height, first.width, first.height);
    }

    let started   = Instant::now();
    let predicted = interp.interpolate(&first, &last)?;
    let elapsed   = started.elapsed().as_secs_f64() * 1e3;

    Ok(SampleMetrics::score(&sample.name, &predicted, &middle, elapsed))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::Frame;
    use crate::infra::{frame_store::FrameStore, metrics::MAX_PSNR};

    /// Stand-in that averages the two frames.
    struct Average;

    impl FrameInterpolator for Average {
        fn interpolate(&self, a: &Frame, b: &Frame) -> Result<Frame> {
            let data = a.data.iter().zip(&b.data).map(|(x, y)| (x + y) / 2.0).collect();
            Ok(Frame { width: a.width, height: a.height, data })
        }
    }

    #[test]
    fn test_score_triplet() {
        let dir = std::env::temp_dir().join(format!("ifnet-eval-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = FrameStore::new(&dir).unwrap();

        // 0, 128, 255 grey: averaging the ends gives 127.5 ≈ the middle
        let grey = |v: u8| Frame::from_rgb8(4, 4, &[v; 48]).unwrap();
        store.save(&dir.join("im1.png"), &grey(0)).unwrap();
        store.save(&dir.join("im2.png"), &grey(128)).unwrap();
        store.save(&dir.join("im3.png"), &grey(255)).unwrap();

        let sample = TripletSample {
            name:   "t".into(),
            first:  dir.join("im1.png"),
            middle: dir.join("im2.png"),
            last:   dir.join("im3.png"),
        };
        let row = score_triplet(&Average, &sample).unwrap();
        assert!(row.psnr > 40.0 && row.psnr < MAX_PSNR);
        assert!(row.mae < 0.01);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let dir = std::env::temp_dir().join(format!("ifnet-eval-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cfg = EvaluateConfig {
            dataset_dir: dir.to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert!(EvaluateUseCase::new(cfg).execute().is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}

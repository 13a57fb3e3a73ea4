// ============================================================
// Layer 2 — InterpolateUseCase
// ============================================================
// Two workflows share one loaded model:
//
//   pair:     frame0 + frame1 → the frame halfway between
//
//   sequence: a directory of N frames → (N-1) * multiplier + 1
//             frames. Each gap is bisected log2(multiplier)
//             times, so 2× inserts one frame, 4× inserts three:
//
//             f0  m(¼) m(½) m(¾)  f1  m(¼) ...  fN
//
// Steps:
//   1. Validate settings and inputs          (Layer 3 - domain)
//   2. Load frames                           (Layer 4 - data)
//   3. Load the checkpoint on the backend    (Layer 6 - infra)
//   4. Interpolate                           (Layer 5 - ml)
//   5. Write frames                          (Layer 6 - infra)

use anyhow::{bail, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

use crate::data::loader::{ImageLoader, SequenceLoader};
use crate::domain::{
    settings::InterpolationSettings,
    traits::{FrameInterpolator, FrameSource},
};
use crate::infra::{checkpoint::CheckpointManager, frame_store::FrameStore};
use crate::ml::device::{dispatch, BackendTask, ComputeBackend};
use crate::ml::inferencer::Interpolator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolateConfig {
    /// Directory written by `init` (config + weights)
    pub checkpoint_dir: String,
    pub backend:        ComputeBackend,
    /// Scale, ensemble and auto-scale for every pair
    pub settings:       InterpolationSettings,
}

impl Default for InterpolateConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            backend:        ComputeBackend::default(),
            settings:       InterpolationSettings::default(),
        }
    }
}

/// What a sequence run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    /// Frames successfully decoded from the input directory
    pub input_frames:  usize,
    /// Originals plus interpolated frames written
    pub output_frames: usize,
}

pub struct InterpolateUseCase {
    config: InterpolateConfig,
}

impl InterpolateUseCase {
    pub fn new(config: InterpolateConfig) -> Self {
        Self { config }
    }

    /// Write the middle frame of `frame0` and `frame1` to `output`.
    pub fn run_pair(&self, frame0: PathBuf, frame1: PathBuf, output: PathBuf) -> Result<()> {
        let task = PairTask {
            ckpt:     CheckpointManager::new(&self.config.checkpoint_dir),
            settings: self.config.settings,
            frame0,
            frame1,
            output,
        };
        dispatch(self.config.backend, task)
    }

    /// Raise the frame rate of the clip in `input_dir` by `multiplier`.
    pub fn run_sequence(
        &self,
        input_dir:  PathBuf,
        output_dir: PathBuf,
        multiplier: u32,
    ) -> Result<SequenceReport> {
        let depth = bisection_depth(multiplier)?;
        let task = SequenceTask {
            ckpt:     CheckpointManager::new(&self.config.checkpoint_dir),
            settings: self.config.settings,
            input_dir,
            output_dir,
            depth,
        };
        dispatch(self.config.backend, task)
    }
}

/// multiplier = 2^depth, depth ≥ 1.
pub fn bisection_depth(multiplier: u32) -> Result<u32> {
    if multiplier < 2 || !multiplier.is_power_of_two() {
        bail!("multiplier must be a power of two >= 2, got {multiplier}");
    }
    Ok(multiplier.trailing_zeros())
}

struct PairTask {
    ckpt:     CheckpointManager,
    settings: InterpolationSettings,
    frame0:   PathBuf,
    frame1:   PathBuf,
    output:   PathBuf,
}

impl BackendTask for PairTask {
    type Output = ();

    fn run<B: Backend>(self, device: B::Device) -> Result<()> {
        let frame0 = ImageLoader::load(&self.frame0)?;
        let frame1 = ImageLoader::load(&self.frame1)?;
        let interp = Interpolator::<B>::from_checkpoint(&self.ckpt, self.settings, device)?;

        let started = Instant::now();
        let mid = interp.interpolate(&frame0, &frame1)?;
        tracing::info!(
            "Interpolated {}x{} in {:.1} ms",
            mid.width,
            mid.height,
            started.elapsed().as_secs_f64() * 1e3
        );

        let out_dir = self.output.parent().map(PathBuf::from).unwrap_or_default();
        FrameStore::new(out_dir)?.save(&self.output, &mid)
    }
}

struct SequenceTask {
    ckpt:       CheckpointManager,
    settings:   InterpolationSettings,
    input_dir:  PathBuf,
    output_dir: PathBuf,
    depth:      u32,
}

impl BackendTask for SequenceTask {
    type Output = SequenceReport;

    fn run<B: Backend>(self, device: B::Device) -> Result<SequenceReport> {
        let frames = SequenceLoader::new(&self.input_dir).load_all()?;
        if frames.len() < 2 {
            bail!(
                "need at least two frames in '{}', found {}",
                self.input_dir.display(),
                frames.len()
            );
        }

        let interp = Interpolator::<B>::from_checkpoint(&self.ckpt, self.settings, device)?;
        let store  = FrameStore::new(&self.output_dir)?;

        let mut written = 0usize;
        for (i, pair) in frames.windows(2).enumerate() {
            written += 1;
            store.save_numbered(written, &pair[0])?;
            for mid in interp.midpoints(&pair[0], &pair[1], self.depth)? {
                written += 1;
                store.save_numbered(written, &mid)?;
            }
            tracing::info!("Pair {}/{} done", i + 1, frames.len() - 1);
        }
        if let Some(last) = frames.last() {
            written += 1;
            store.save_numbered(written, last)?;
        }

        tracing::info!("Wrote {} frames to '{}'", written, self.output_dir.display());
        Ok(SequenceReport { input_frames: frames.len(), output_frames: written })
    }
}

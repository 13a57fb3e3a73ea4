// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and their flags:
//   init:        write a freshly initialised checkpoint
//   interpolate: one pair of frames → the middle frame
//   sequence:    a directory of frames → higher frame rate
//   evaluate:    score against ground truth triplets
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{
    evaluate_use_case::EvaluateConfig,
    init_use_case::InitConfig,
    interpolate_use_case::InterpolateConfig,
};
use crate::domain::settings::InterpolationSettings;
use crate::ml::device::ComputeBackend;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a checkpoint with freshly initialised weights
    Init(InitArgs),

    /// Synthesise the frame halfway between two images
    Interpolate(InterpolateArgs),

    /// Multiply the frame rate of a directory of frames
    Sequence(SequenceArgs),

    /// Measure PSNR on a directory of im1/im2/im3 triplets
    Evaluate(EvaluateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    /// GPU via wgpu
    Wgpu,
    /// CPU via ndarray
    Cpu,
}

impl From<BackendArg> for ComputeBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Wgpu => ComputeBackend::Wgpu,
            BackendArg::Cpu  => ComputeBackend::Cpu,
        }
    }
}

/// Flags shared by every command that loads a model.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Directory holding ifnet_config.json and ifnet.mpk.gz
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Compute backend
    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,

    /// Flow working resolution: 1.0 = full, 0.5 = half (large motion / 4K)
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Skip the swapped-order pass (about twice as fast, slightly less accurate)
    #[arg(long)]
    pub no_ensemble: bool,

    /// Probe motion per pair and choose the scale automatically
    #[arg(long)]
    pub auto_scale: bool,
}

impl ModelArgs {
    fn settings(&self) -> Result<InterpolationSettings> {
        InterpolationSettings::new(self.scale, !self.no_ensemble, self.auto_scale)
    }

    pub fn to_config(&self) -> Result<InterpolateConfig> {
        Ok(InterpolateConfig {
            checkpoint_dir: self.checkpoint_dir.clone(),
            backend:        self.backend.into(),
            settings:       self.settings()?,
        })
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write the checkpoint into
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Feature width of each IFNet block
    #[arg(long, default_value_t = 90)]
    pub channels: usize,

    /// Overwrite an existing checkpoint
    #[arg(long)]
    pub force: bool,

    /// Backend used to initialise the weights
    #[arg(long, value_enum, default_value_t = BackendArg::Cpu)]
    pub backend: BackendArg,
}

impl From<InitArgs> for InitConfig {
    fn from(a: InitArgs) -> Self {
        InitConfig {
            checkpoint_dir: a.checkpoint_dir,
            channels:       a.channels,
            force:          a.force,
            backend:        a.backend.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct InterpolateArgs {
    /// First frame
    #[arg(long)]
    pub frame0: PathBuf,

    /// Second frame
    #[arg(long)]
    pub frame1: PathBuf,

    /// Where to write the middle frame (format from extension)
    #[arg(long, default_value = "middle.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct SequenceArgs {
    /// Directory of input frames, ordered by file name
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the numbered output frames
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Frame-rate multiplier (2, 4, 8, ...)
    #[arg(long, default_value_t = 2)]
    pub multiplier: u32,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Root of the triplet dataset
    #[arg(long, default_value = "data/triplets")]
    pub dataset_dir: String,

    /// Where metrics.csv is written
    #[arg(long, default_value = "reports")]
    pub report_dir: String,

    /// Evaluate a random subset of this many triplets
    #[arg(long)]
    pub limit: Option<usize>,

    /// Seed for the subset shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl EvaluateArgs {
    pub fn to_config(&self) -> Result<EvaluateConfig> {
        let model = self.model.to_config()?;
        Ok(EvaluateConfig {
            dataset_dir:    self.dataset_dir.clone(),
            report_dir:     self.report_dir.clone(),
            checkpoint_dir: model.checkpoint_dir,
            limit:          self.limit,
            seed:           self.seed,
            backend:        model.backend,
            settings:       model.settings,
        })
    }
}

// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Builds an IFNet with freshly initialised weights and writes it
// out as a checkpoint directory (config + weights). Useful for
// smoke-testing the pipeline on new hardware, and as the
// starting point for weights produced elsewhere.

use anyhow::{bail, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::device::{dispatch, BackendTask, ComputeBackend};
use crate::ml::model::IfNetConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Where ifnet_config.json and ifnet.mpk.gz are written
    pub checkpoint_dir: String,
    /// Feature width of every block (must be even)
    pub channels:       usize,
    /// Overwrite an existing checkpoint
    pub force:          bool,
    /// Backend the weights are initialised on
    pub backend:        ComputeBackend,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            channels:       90,
            force:          false,
            backend:        ComputeBackend::Cpu,
        }
    }
}

pub struct InitUseCase {
    config: InitConfig,
}

impl InitUseCase {
    pub fn new(config: InitConfig) -> Self {
        Self { config }
    }

    /// Returns the number of parameters written.
    pub fn execute(&self) -> Result<usize> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);

        if ckpt.exists() && !cfg.force {
            bail!(
                "A checkpoint already exists in '{}'; pass --force to overwrite it",
                cfg.checkpoint_dir
            );
        }
        if cfg.channels < 2 || cfg.channels % 2 != 0 {
            bail!("channels must be an even number >= 2, got {}", cfg.channels);
        }

        dispatch(cfg.backend, InitTask { ckpt, channels: cfg.channels })
    }
}

struct InitTask {
    ckpt:     CheckpointManager,
    channels: usize,
}

impl BackendTask for InitTask {
    type Output = usize;

    fn run<B: Backend>(self, device: B::Device) -> Result<usize> {
        let model_cfg = IfNetConfig::new().with_channels(self.channels);
        let model     = model_cfg.init::<B>(&device);
        let params    = model.num_params();

        self.ckpt.save_config(&model_cfg)?;
        self.ckpt.save_model(&model)?;
        tracing::info!(
            "Initialised IFNet (channels={}, {} parameters) in '{}'",
            self.channels,
            params,
            self.ckpt.dir().display()
        );
        Ok(params)
    }
}

// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores IFNet weights using Burn's CompactRecorder.
//
// What a checkpoint directory holds:
//   ifnet_config.json: model architecture (channel width)
//   ifnet.mpk.gz:      all learned parameters
//
// The config is stored separately because the model has to be
// rebuilt with the right architecture before its weights can be
// loaded into it. Loading fails if the two don't match.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::{IfNet, IfNetConfig};

const CONFIG_FILE:  &str = "ifnet_config.json";
/// Recorder appends `.mpk.gz`
const WEIGHTS_STEM: &str = "ifnet";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True if both the config and the weights are present.
    pub fn exists(&self) -> bool {
        self.dir.join(CONFIG_FILE).is_file()
            && self.dir.join(format!("{WEIGHTS_STEM}.mpk.gz")).is_file()
    }

    /// Write model weights to {dir}/ifnet.mpk.gz.
    pub fn save_model<B: Backend>(&self, model: &IfNet<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(WEIGHTS_STEM);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        tracing::debug!("Saved weights to '{}'", path.display());
        Ok(())
    }

    /// Load weights into a model built from the matching config.
    pub fn load_model<B: Backend>(
        &self,
        model:  IfNet<B>,
        device: &B::Device,
    ) -> Result<IfNet<B>> {
        let path = self.dir.join(WEIGHTS_STEM);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you run 'init' first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &IfNetConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<IfNetConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure the checkpoint directory is correct.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed model config '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ifnet-ckpt-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_checkpoint_restores_weights() {
        let dir    = scratch_dir("weights");
        let device = Default::default();
        let ckpt   = CheckpointManager::new(&dir);
        assert!(!ckpt.exists());

        let cfg = IfNetConfig::new().with_channels(8);
        let original: IfNet<TB> = cfg.init(&device);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&original).unwrap();
        assert!(ckpt.exists());

        let loaded_cfg = ckpt.load_config().unwrap();
        assert_eq!(loaded_cfg.channels, 8);

        // A fresh init has different random weights until the record is loaded
        let restored = ckpt.load_model(loaded_cfg.init::<TB>(&device), &device).unwrap();
        let bias = |m: &IfNet<TB>| {
            m.blocks[0].down0.conv.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap()
        };
        assert_eq!(bias(&original), bias(&restored));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let ckpt = CheckpointManager::new(scratch_dir("missing"));
        assert!(ckpt.load_config().is_err());
    }
}

// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Wraps a loaded IfNet and turns two Frames into the Frame
// halfway between them:
//
//   pad both frames to the settings' alignment
//   → batch into [1, 6, H', W']
//   → IfNet forward
//   → crop merged [1, 3, H', W'] back to [3, H, W]
use anyhow::{bail, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{
    batcher::{FramePair, FramePairBatcher, PairBatch},
    preprocessor::Preprocessor,
};
use crate::domain::{frame::Frame, settings::InterpolationSettings, traits::FrameInterpolator};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ForwardOptions, IfNet};

/// A loaded model ready to synthesise middle frames.
pub struct Interpolator<B: Backend> {
    model:    IfNet<B>,
    /// Scale, ensemble and auto-scale used for every pair
    settings: InterpolationSettings,
    /// The device tensors are created on (e.g. GPU index 0)
    device:   B::Device,
}

impl<B: Backend> Interpolator<B> {
    /// Wrap an already-initialised model.
    pub fn new(model: IfNet<B>, settings: InterpolationSettings, device: B::Device) -> Self {
        Self { model, settings, device }
    }

    /// Rebuild the model from `ifnet_config.json`, then load its weights.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        settings:     InterpolationSettings,
        device:       B::Device,
    ) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = ckpt_manager.load_model(cfg.init::<B>(&device), &device)?;
        tracing::info!("Model loaded from checkpoint (channels={})", cfg.channels);
        Ok(Self::new(model, settings, device))
    }

    fn forward_options(&self) -> ForwardOptions {
        ForwardOptions {
            scale_list: self.settings.scale_list(),
            ensemble:   self.settings.ensemble,
            auto_scale: self.settings.auto_scale,
        }
    }
}

impl<B: Backend> FrameInterpolator for Interpolator<B> {
    fn interpolate(&self, frame0: &Frame, frame1: &Frame) -> Result<Frame> {
        if !frame0.same_size(frame1) {
            bail!(
                "frame sizes differ: {}x{} vs {}x{}",
                frame0.width, frame0.height, frame1.width, frame1.height
            );
        }
        if frame0.width == 0 || frame0.height == 0 {
            bail!("cannot interpolate empty frames");
        }
        let (width, height) = (frame0.width, frame0.height);

        let prep  = Preprocessor::new(self.settings.alignment());
        let pair  = FramePair::new(prep.pad(frame0), prep.pad(frame1));
        let batch: PairBatch<B> = FramePairBatcher.batch(vec![pair], &self.device);

        let output = self.model.forward(batch.input, &self.forward_options());
        let merged = output.merged.slice([0..1, 0..3, 0..height, 0..width]);

        let data = merged
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read merged frame: {e:?}"))?;

        tracing::debug!("Interpolated {}x{} frame", width, height);
        Frame::from_planar(width, height, data)
            .ok_or_else(|| anyhow::anyhow!("merged tensor has unexpected size"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::ml::model::IfNetConfig;

    type TB = NdArray;

    fn interpolator(settings: InterpolationSettings) -> Interpolator<TB> {
        let device = Default::default();
        let model  = IfNetConfig::new().with_channels(8).init(&device);
        Interpolator::new(model, settings, device)
    }

    #[test]
    fn test_unaligned_frames_come_back_at_original_size() {
        let interp = interpolator(InterpolationSettings::default());
        let a = Frame::filled(37, 21, [0.5, 0.5, 0.5]);
        let b = Frame::filled(37, 21, [0.5, 0.5, 0.5]);

        let mid = interp.interpolate(&a, &b).unwrap();
        assert_eq!((mid.width, mid.height), (37, 21));
        assert_eq!(mid.data.len(), 3 * 37 * 21);
    }

    #[test]
    fn test_rejects_mismatched_sizes() {
        let interp = interpolator(InterpolationSettings::default());
        let a = Frame::filled(8, 8, [0.0; 3]);
        let b = Frame::filled(8, 9, [0.0; 3]);
        assert!(interp.interpolate(&a, &b).is_err());
    }

    #[test]
    fn test_midpoints_count() {
        let settings = InterpolationSettings::new(1.0, false, false).unwrap();
        let interp = interpolator(settings);
        let a = Frame::filled(16, 16, [0.2, 0.4, 0.6]);
        let mids = interp.midpoints(&a, &a, 2).unwrap();
        assert_eq!(mids.len(), 3);
    }
}

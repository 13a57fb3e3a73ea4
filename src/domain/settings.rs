// ============================================================
// Layer 3 — Interpolation Settings
// ============================================================
// The knobs a user can turn for one interpolation run:
//
//   scale:      working resolution of the flow estimate.
//               1.0 = full resolution, 0.5 = half (better for
//               large motion / 4K), 2.0 = finer detail.
//   ensemble:   also run every block with the frames swapped
//               and average both predictions.
//   auto_scale: let the model probe the motion and pick a
//               scale of 1.0, 0.5 or 0.25 per pair.
//
// The three IFNet blocks run coarse-to-fine at [4, 2, 1] / scale.
// Each block downsamples by a further 4 inside its encoder, so
// input frames are padded to a multiple of alignment().

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Smallest scale auto-scaling may choose.
pub const AUTO_SCALE_FLOOR: f64 = 0.25;

const MIN_ALIGNMENT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationSettings {
    pub scale:      f64,
    pub ensemble:   bool,
    pub auto_scale: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self { scale: 1.0, ensemble: true, auto_scale: false }
    }
}

impl InterpolationSettings {
    /// Validated constructor. Scale must be a power of two in [0.125, 4].
    pub fn new(scale: f64, ensemble: bool, auto_scale: bool) -> Result<Self> {
        if !(0.125..=4.0).contains(&scale) || scale.log2().fract() != 0.0 {
            bail!("scale must be a power of two between 0.125 and 4, got {scale}");
        }
        Ok(Self { scale, ensemble, auto_scale })
    }

    /// Per-block downsampling factors, coarse to fine.
    pub fn scale_list(&self) -> [f64; 3] {
        [4.0 / self.scale, 2.0 / self.scale, 1.0 / self.scale]
    }

    /// Frame dimensions must be padded to a multiple of this.
    pub fn alignment(&self) -> usize {
        let s = if self.auto_scale { AUTO_SCALE_FLOOR.min(self.scale) } else { self.scale };
        ((MIN_ALIGNMENT as f64 / s).ceil() as usize).max(MIN_ALIGNMENT)
    }
}

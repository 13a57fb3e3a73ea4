// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits:
//   - SequenceLoader implements FrameSource
//   - Interpolator<B> implements FrameInterpolator for any
//     Burn backend
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::frame::Frame;

// ─── FrameSource ──────────────────────────────────────────────────────────────
/// Any component that yields an ordered run of frames.
pub trait FrameSource {
    /// Load all frames in temporal order.
    fn load_all(&self) -> Result<Vec<Frame>>;
}

// ─── FrameInterpolator ────────────────────────────────────────────────────────
/// Any component that can synthesise the frame halfway between two others.
pub trait FrameInterpolator {
    fn interpolate(&self, frame0: &Frame, frame1: &Frame) -> Result<Frame>;

    /// Recursively bisect the interval `depth` times, returning the
    /// 2^depth - 1 intermediate frames in temporal order.
    fn midpoints(&self, frame0: &Frame, frame1: &Frame, depth: u32) -> Result<Vec<Frame>> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        let mid = self.interpolate(frame0, frame1)?;
        let mut out = self.midpoints(frame0, &mid, depth - 1)?;
        let right   = self.midpoints(&mid, frame1, depth - 1)?;
        out.push(mid);
        out.extend(right);
        Ok(out)
    }
}

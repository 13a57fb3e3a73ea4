// ============================================================
// Layer 4 — Frame Preprocessor
// ============================================================
// IFNet downsamples by up to 4 × max(scale_list) internally and
// upsamples back, so both spatial dimensions must divide evenly
// or the residual flow no longer lines up with the running one.
//
// Frames are zero-padded on the right and bottom edges up to the
// next multiple of `align`. The inferencer crops the output back
// to the original size, so the padding never reaches the caller.

use crate::domain::frame::{Frame, CHANNELS};

pub struct Preprocessor {
    align: usize,
}

impl Preprocessor {
    /// `align` must be non-zero.
    pub fn new(align: usize) -> Self {
        Self { align: align.max(1) }
    }

    /// Dimensions after padding.
    pub fn padded_size(&self, width: usize, height: usize) -> (usize, usize) {
        (round_up(width, self.align), round_up(height, self.align))
    }

    /// Zero-pad right and bottom edges to the alignment.
    pub fn pad(&self, frame: &Frame) -> Frame {
        let (pw, ph) = self.padded_size(frame.width, frame.height);
        if (pw, ph) == (frame.width, frame.height) {
            return frame.clone();
        }

        let src_plane = frame.width * frame.height;
        let dst_plane = pw * ph;
        let mut data  = vec![0.0f32; CHANNELS * dst_plane];

        for c in 0..CHANNELS {
            for y in 0..frame.height {
                let src = c * src_plane + y * frame.width;
                let dst = c * dst_plane + y * pw;
                data[dst..dst + frame.width].copy_from_slice(&frame.data[src..src + frame.width]);
            }
        }

        Frame { width: pw, height: ph, data }
    }
}

fn round_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}

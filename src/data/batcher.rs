// ============================================================
// Layer 4 — Frame Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to turn frame pairs into the
// [N, 6, H, W] tensor IfNet consumes: channels 0..3 are the
// first frame, 3..6 the second.
//
// Frames are already planar, so each pair is two straight
// buffer copies. All pairs in a batch must share one size
// (pad them first with the Preprocessor).
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::frame::Frame;

/// Two frames to interpolate between.
#[derive(Debug, Clone)]
pub struct FramePair {
    /// Earlier frame, becomes channels 0..3
    pub frame0: Frame,
    /// Later frame, becomes channels 3..6
    pub frame1: Frame,
}

impl FramePair {
    pub fn new(frame0: Frame, frame1: Frame) -> Self {
        Self { frame0, frame1 }
    }
}

/// A batch of frame pairs ready for IfNet::forward.
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Both frames stacked on the channel axis: [batch_size, 6, height, width]
    pub input: Tensor<B, 4>,
}

/// Stateless; the target device is passed to each `batch` call.
#[derive(Clone, Debug, Default)]
pub struct FramePairBatcher;

impl<B: Backend> Batcher<B, FramePair, PairBatch<B>> for FramePairBatcher {
    /// Panics on an empty batch, or if the pairs don't all share the
    /// first frame's size.
    fn batch(&self, items: Vec<FramePair>, device: &B::Device) -> PairBatch<B> {
        assert!(!items.is_empty(), "cannot batch an empty list of frame pairs");
        let batch_size = items.len();
        let (width, height) = (items[0].frame0.width, items[0].frame0.height);

        let mut flat = Vec::with_capacity(batch_size * 2 * items[0].frame0.data.len());
        for pair in &items {
            assert!(
                pair.frame0.width == width && pair.frame0.height == height
                    && pair.frame0.same_size(&pair.frame1),
                "all frames in a batch must be {width}x{height}"
            );
            flat.extend_from_slice(&pair.frame0.data);
            flat.extend_from_slice(&pair.frame1.data);
        }

        let input = Tensor::<B, 4>::from_data(
            TensorData::new(flat, [batch_size, 6, height, width]),
            device,
        );
        PairBatch { input }
    }
}

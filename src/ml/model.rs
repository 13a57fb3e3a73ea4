// ============================================================
// Layer 5 — IFNet
// ============================================================
// Intermediate-flow network: three IfBlocks refine a
// bidirectional flow coarse-to-fine, then the two frames are
// warped toward the middle and blended with a learned mask.
//
//   x = [img0 | img1]            (channel halves)
//   flow = 0, mask = 0
//   for block, scale in zip(blocks, scale_list):
//       Δflow, Δmask = block(warped0, warped1, mask, flow, scale)
//       (ensemble: average with the swapped-order prediction)
//       flow += Δflow; mask += Δmask
//       warped0 = warp(img0, flow[0:2])
//       warped1 = warp(img1, flow[2:4])
//   merged = warped0 * σ(mask) + warped1 * (1 - σ(mask))
//
// The model is generic over the backend; instantiate it on an
// Autodiff<B> backend to get gradients through the whole pass.

use burn::{prelude::*, tensor::activation::sigmoid};

use crate::ml::block::{IfBlock, IfBlockConfig};
use crate::ml::resample::warp;

/// Two RGB images plus one mask channel.
const BLOCK_IN_PLANES: usize = 7;
const NUM_BLOCKS: usize = 3;
/// Reference pixel count (1920 × 1088) for the auto-scale threshold.
const AUTO_SCALE_REF_PIXELS: f64 = 2_088_960.0;
const AUTO_SCALE_REF_MOTION: f64 = 64.0;

#[derive(Config, Debug)]
pub struct IfNetConfig {
    /// Feature width shared by all three blocks
    #[config(default = 90)]
    pub channels: usize,
}

impl IfNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> IfNet<B> {
        let blocks = (0..NUM_BLOCKS)
            .map(|_| {
                IfBlockConfig::new(BLOCK_IN_PLANES)
                    .with_channels(self.channels)
                    .init(device)
            })
            .collect();
        IfNet { blocks }
    }
}

/// Forward-pass switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardOptions {
    /// Downsampling factor per block, coarse to fine
    pub scale_list: [f64; 3],
    /// Also run each block on the swapped pair and average the two
    pub ensemble:   bool,
    /// Replace scale_list with [4, 2, 1] / auto_scale(x)
    pub auto_scale: bool,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self { scale_list: [4.0, 2.0, 1.0], ensemble: true, auto_scale: false }
    }
}

/// What one block iteration produced (cumulative values).
#[derive(Debug, Clone)]
pub struct StageOutput<B: Backend> {
    /// Flow so far: [batch, 4, H, W], channels 0..2 warp img0, 2..4 warp img1
    pub flow:    Tensor<B, 4>,
    /// Mask logit so far: [batch, 1, H, W] (sigmoid applied on the last stage)
    pub mask:    Tensor<B, 4>,
    /// img0 warped by flow[0..2]
    pub warped0: Tensor<B, 4>,
    /// img1 warped by flow[2..4]
    pub warped1: Tensor<B, 4>,
}

#[derive(Debug, Clone)]
pub struct IfNetOutput<B: Backend> {
    /// One entry per block, coarse to fine
    pub stages: Vec<StageOutput<B>>,
    /// Blended middle frame: [batch, channel, H, W]
    pub merged: Tensor<B, 4>,
    /// Cumulative flow after the last block: [batch, 4, H, W]
    pub flow:   Tensor<B, 4>,
    /// Blend weight for warped0, sigmoid of the last mask: [batch, 1, H, W]
    pub mask:   Tensor<B, 4>,
}

#[derive(Module, Debug)]
pub struct IfNet<B: Backend> {
    /// Three flow refinement blocks, applied coarse to fine
    pub blocks: Vec<IfBlock<B>>,
}

impl<B: Backend> IfNet<B> {
    /// x: [batch, 2 * channel, H, W] with channel ≥ 3.
    /// H and W must be divisible by 4 * max(scale_list).
    pub fn forward(&self, x: Tensor<B, 4>, options: &ForwardOptions) -> IfNetOutput<B> {
        let (img0, img1) = split_pair(&x);
        let [b, _, h, w] = img0.dims();
        let device = x.device();

        let scale_list = if options.auto_scale {
            let s = self.auto_scale(x);
            tracing::debug!("auto-scale picked {}", s);
            [4.0 / s, 2.0 / s, 1.0 / s]
        } else {
            options.scale_list
        };

        let mut flow    = Tensor::<B, 4>::zeros([b, 4, h, w], &device);
        let mut mask    = Tensor::<B, 4>::zeros([b, 1, h, w], &device);
        let mut warped0 = img0.clone();
        let mut warped1 = img1.clone();
        let mut stages  = Vec::with_capacity(NUM_BLOCKS);

        for (block, &scale) in self.blocks.iter().zip(scale_list.iter()) {
            let rgb0 = rgb(&warped0);
            let rgb1 = rgb(&warped1);

            let (mut d_flow, mut d_mask) = block.forward(
                Tensor::cat(vec![rgb0.clone(), rgb1.clone(), mask.clone()], 1),
                flow.clone(),
                scale,
            );
            if options.ensemble {
                let (r_flow, r_mask) = block.forward(
                    Tensor::cat(vec![rgb1, rgb0, mask.clone().neg()], 1),
                    swap_halves(flow.clone()),
                    scale,
                );
                d_flow = (d_flow + swap_halves(r_flow)).div_scalar(2.0);
                d_mask = (d_mask - r_mask).div_scalar(2.0);
            }

            flow = flow + d_flow;
            mask = mask + d_mask;
            warped0 = warp(img0.clone(), flow.clone().slice([0..b, 0..2, 0..h, 0..w]));
            warped1 = warp(img1.clone(), flow.clone().slice([0..b, 2..4, 0..h, 0..w]));

            stages.push(StageOutput {
                flow:    flow.clone(),
                mask:    mask.clone(),
                warped0: warped0.clone(),
                warped1: warped1.clone(),
            });
        }

        let blend  = sigmoid(mask);
        let merged = warped0 * blend.clone() + warped1 * blend.clone().neg().add_scalar(1.0);
        if let Some(last) = stages.last_mut() {
            last.mask = blend.clone();
        }

        IfNetOutput { stages, merged, flow, mask: blend }
    }

    /// Probe block 0 at coarse scales and return the working scale
    /// (1.0, 0.5 or 0.25) suited to the amount of motion in `x`.
    ///
    /// H and W must be divisible by 32.
    pub fn auto_scale(&self, x: Tensor<B, 4>) -> f64 {
        let (img0, img1) = split_pair(&x);
        let [b, _, h, w] = img0.dims();
        let device = x.device();
        let threshold = ((h * w) as f64 / AUTO_SCALE_REF_PIXELS).sqrt() * AUTO_SCALE_REF_MOTION;

        let input = Tensor::cat(
            vec![rgb(&img0), rgb(&img1), Tensor::zeros([b, 1, h, w], &device)],
            1,
        );
        let flow = Tensor::<B, 4>::zeros([b, 4, h, w], &device);

        let (probe, _) = self.blocks[0].forward(input.clone(), flow.clone(), 4.0);
        if !motion_exceeds(&probe, threshold) {
            return 1.0;
        }
        let (probe, _) = self.blocks[0].forward(input, flow, 8.0);
        if motion_exceeds(&probe, threshold) { 0.25 } else { 0.5 }
    }
}

/// Split the channel axis into (img0, img1) halves.
fn split_pair<B: Backend>(x: &Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
    let [b, c2, h, w] = x.dims();
    let c = c2 / 2;
    (
        x.clone().slice([0..b, 0..c, 0..h, 0..w]),
        x.clone().slice([0..b, c..c2, 0..h, 0..w]),
    )
}

/// First three channels.
fn rgb<B: Backend>(x: &Tensor<B, 4>) -> Tensor<B, 4> {
    let [b, _, h, w] = x.dims();
    x.clone().slice([0..b, 0..3, 0..h, 0..w])
}

/// [f0x, f0y, f1x, f1y] → [f1x, f1y, f0x, f0y]
fn swap_halves<B: Backend>(flow: Tensor<B, 4>) -> Tensor<B, 4> {
    let [b, _, h, w] = flow.dims();
    Tensor::cat(
        vec![
            flow.clone().slice([0..b, 2..4, 0..h, 0..w]),
            flow.slice([0..b, 0..2, 0..h, 0..w]),
        ],
        1,
    )
}

/// Both directions' peak |flow| above threshold.
fn motion_exceeds<B: Backend>(flow: &Tensor<B, 4>, threshold: f64) -> bool {
    let [b, _, h, w] = flow.dims();
    let peak = |range: std::ops::Range<usize>| -> f64 {
        flow.clone()
            .slice([0..b, range, 0..h, 0..w])
            .abs()
            .max()
            .into_scalar()
            .elem::<f64>()
    };
    peak(0..2) > threshold && peak(2..4) > threshold
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, TensorData};

    type TB = NdArray;

    fn small_model() -> IfNet<TB> {
        IfNetConfig::new().with_channels(8).init(&Default::default())
    }

    fn values(t: Tensor<TB, 4>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_forward_shapes() {
        let model  = small_model();
        let device = Default::default();
        let x = Tensor::<TB, 4>::random([1, 6, 32, 64], Distribution::Default, &device);

        for ensemble in [false, true] {
            let opts = ForwardOptions { ensemble, ..Default::default() };
            let out  = model.forward(x.clone(), &opts);
            assert_eq!(out.stages.len(), 3);
            assert_eq!(out.merged.dims(), [1, 3, 32, 64]);
            assert_eq!(out.flow.dims(),   [1, 4, 32, 64]);
            assert_eq!(out.mask.dims(),   [1, 1, 32, 64]);
            assert_eq!(out.stages[0].warped0.dims(), [1, 3, 32, 64]);
        }
    }

    #[test]
    fn test_identical_constant_frames_blend_to_constant() {
        // Warping a flat image yields the same flat image whatever the
        // flow, and blending two equal images is a no-op, so this holds
        // for untrained weights.
        let model  = small_model();
        let device = Default::default();
        let x = Tensor::<TB, 4>::full([1, 6, 32, 32], 0.3, &device);

        let out = model.forward(x, &ForwardOptions::default());
        for v in values(out.merged) {
            assert!((v - 0.3).abs() < 1e-4, "got {v}");
        }
    }

    #[test]
    fn test_merged_stays_within_input_range() {
        let model  = small_model();
        let device = Default::default();
        let x = Tensor::<TB, 4>::random([1, 6, 32, 32], Distribution::Uniform(0.2, 0.8), &device);

        let merged = values(model.forward(x, &ForwardOptions::default()).merged);
        assert!(merged.iter().all(|v| (0.2 - 1e-4..=0.8 + 1e-4).contains(v)));
    }

    #[test]
    fn test_final_mask_is_sigmoid() {
        let model  = small_model();
        let device = Default::default();
        let x = Tensor::<TB, 4>::random([1, 6, 32, 32], Distribution::Default, &device);

        let out = model.forward(x, &ForwardOptions { ensemble: false, ..Default::default() });
        assert!(values(out.mask.clone()).iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(values(out.stages[2].mask.clone()), values(out.mask));
    }

    #[test]
    fn test_auto_scale_choices() {
        let model  = small_model();
        let device = Default::default();
        let x = Tensor::<TB, 4>::random([1, 6, 64, 64], Distribution::Default, &device);

        let s = model.auto_scale(x.clone());
        assert!([1.0, 0.5, 0.25].contains(&s), "unexpected scale {s}");

        let opts = ForwardOptions { auto_scale: true, ensemble: false, ..Default::default() };
        assert_eq!(model.forward(x, &opts).merged.dims(), [1, 3, 64, 64]);
    }

    #[test]
    fn test_swap_halves() {
        let device = Default::default();
        let flow = Tensor::<TB, 4>::from_data(
            TensorData::new(vec![0.0f32, 1.0, 2.0, 3.0], [1, 4, 1, 1]),
            &device,
        );
        assert_eq!(values(swap_halves(flow)), vec![2.0, 3.0, 0.0, 1.0]);
    }

    fn max_abs_diff(a: Tensor<TB, 4>, b: Tensor<TB, 4>) -> f32 {
        (a - b).abs().max().into_scalar().elem::<f32>()
    }

    #[test]
    fn test_ensemble_is_symmetric_in_frame_order() {
        // With ensemble on, [img1 | img0] must give the swapped flow,
        // the negated mask logit and the same middle frame.
        let model  = small_model();
        let device = Default::default();
        let img0 = Tensor::<TB, 4>::random([1, 3, 32, 32], Distribution::Default, &device);
        let img1 = Tensor::<TB, 4>::random([1, 3, 32, 32], Distribution::Default, &device);
        let opts = ForwardOptions::default();

        let fwd = model.forward(Tensor::cat(vec![img0.clone(), img1.clone()], 1), &opts);
        let rev = model.forward(Tensor::cat(vec![img1, img0], 1), &opts);

        assert!(max_abs_diff(fwd.merged, rev.merged) < 1e-4);
        assert!(max_abs_diff(fwd.flow, swap_halves(rev.flow)) < 1e-4);
        assert!(max_abs_diff(fwd.mask, rev.mask.neg().add_scalar(1.0)) < 1e-4);
    }

    #[test]
    fn test_gradients_reach_input_and_weights() {
        use burn::backend::Autodiff;

        type AB = Autodiff<NdArray>;

        let device = Default::default();
        let model: IfNet<AB> = IfNetConfig::new().with_channels(8).init(&device);
        let x = Tensor::<AB, 4>::random([1, 6, 32, 32], Distribution::Default, &device)
            .require_grad();

        let out   = model.forward(x.clone(), &ForwardOptions::default());
        let grads = out.merged.sum().backward();

        let gx = x.grad(&grads).expect("input gradient");
        let gw = model.blocks[0].down0.conv.weight.grad(&grads).expect("weight gradient");
        assert!(gx.abs().sum().into_scalar().elem::<f32>() > 0.0);
        assert!(gw.abs().sum().into_scalar().elem::<f32>() > 0.0);
    }
}

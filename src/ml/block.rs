// ============================================================
// Layer 5 — IFBlock
// ============================================================
// One coarse-to-fine stage of IFNet. Given the two (already
// warped) frames, the current mask and the current flow, it
// predicts a flow *residual* and a mask residual:
//
//   resize inputs by 1/scale
//        │
//   encoder: conv3x3/2 → conv3x3/2      (resolution / 4)
//        │
//   4 × residual stage (conv3x3 → conv3x3) + skip
//        │
//   ├── flow head: deconv4x4/2 → deconv4x4/2 → 4 channels
//   └── mask head: deconv4x4/2 → deconv4x4/2 → 1 channel
//        │
//   resize back by scale (flow values multiplied by scale)
//
// Every conv is followed by a per-channel PReLU.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        PRelu, PReluConfig, PaddingConfig2d,
    },
    prelude::*,
};

use crate::ml::resample::resize_bilinear;

const PRELU_INIT: f64 = 0.25;

#[derive(Config, Debug)]
pub struct IfBlockConfig {
    /// Channels of the image/mask input, excluding the 4 flow channels
    pub in_planes: usize,
    /// Feature width after the encoder (the first conv outputs half)
    #[config(default = 90)]
    pub channels: usize,
    /// Number of residual stages between encoder and heads
    #[config(default = 4)]
    pub residual_stages: usize,
}

impl IfBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> IfBlock<B> {
        let c = self.channels;
        let residuals = (0..self.residual_stages)
            .map(|_| ResidualStage {
                first:  conv_prelu(c, c, 1, device),
                second: conv_prelu(c, c, 1, device),
            })
            .collect();
        IfBlock {
            down0:     conv_prelu(self.in_planes + 4, c / 2, 2, device),
            down1:     conv_prelu(c / 2, c, 2, device),
            residuals,
            flow_head: upsample_head(c, 4, device),
            mask_head: upsample_head(c, 1, device),
        }
    }
}

fn conv_prelu<B: Backend>(
    in_planes:  usize,
    out_planes: usize,
    stride:     usize,
    device:     &B::Device,
) -> ConvPrelu<B> {
    let conv = Conv2dConfig::new([in_planes, out_planes], [3, 3])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_bias(true)
        .init(device);
    let act = PReluConfig::new()
        .with_num_parameters(out_planes)
        .with_alpha(PRELU_INIT)
        .init(device);
    ConvPrelu { conv, act }
}

fn upsample_head<B: Backend>(c: usize, out_planes: usize, device: &B::Device) -> UpsampleHead<B> {
    let up0 = ConvTranspose2dConfig::new([c, c / 2], [4, 4])
        .with_stride([2, 2])
        .with_padding([1, 1])
        .init(device);
    let act = PReluConfig::new()
        .with_num_parameters(c / 2)
        .with_alpha(PRELU_INIT)
        .init(device);
    let up1 = ConvTranspose2dConfig::new([c / 2, out_planes], [4, 4])
        .with_stride([2, 2])
        .with_padding([1, 1])
        .init(device);
    UpsampleHead { up0, act, up1 }
}

// ─── Building blocks ──────────────────────────────────────────────────────────

/// conv3x3 (padding 1) followed by a per-channel PReLU.
#[derive(Module, Debug)]
pub struct ConvPrelu<B: Backend> {
    pub conv: Conv2d<B>,
    /// One learned slope per output channel, starting at 0.25
    pub act:  PRelu<B>,
}

impl<B: Backend> ConvPrelu<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.act.forward(self.conv.forward(x))
    }
}

/// Two same-width ConvPrelus with the stage input added back.
#[derive(Module, Debug)]
pub struct ResidualStage<B: Backend> {
    pub first:  ConvPrelu<B>,
    pub second: ConvPrelu<B>,
}

impl<B: Backend> ResidualStage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.second.forward(self.first.forward(x.clone())) + x
    }
}

/// Two stride-2 transposed convs: resolution × 4.
#[derive(Module, Debug)]
pub struct UpsampleHead<B: Backend> {
    /// channels → channels / 2, resolution × 2
    pub up0: ConvTranspose2d<B>,
    pub act: PRelu<B>,
    /// channels / 2 → output planes, resolution × 2
    pub up1: ConvTranspose2d<B>,
}

impl<B: Backend> UpsampleHead<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.up1.forward(self.act.forward(self.up0.forward(x)))
    }
}

// ─── IfBlock ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct IfBlock<B: Backend> {
    /// Stride-2 conv: in_planes + 4 → channels / 2
    pub down0:     ConvPrelu<B>,
    /// Stride-2 conv: channels / 2 → channels
    pub down1:     ConvPrelu<B>,
    /// Residual stages at 1/4 of the block's working resolution
    pub residuals: Vec<ResidualStage<B>>,
    /// Predicts the 4-channel flow residual (both directions)
    pub flow_head: UpsampleHead<B>,
    /// Predicts the 1-channel mask logit residual
    pub mask_head: UpsampleHead<B>,
}

impl<B: Backend> IfBlock<B> {
    /// x: [batch, in_planes, H, W], flow: [batch, 4, H, W]
    /// → (flow residual [batch, 4, H, W], mask residual [batch, 1, H, W])
    ///
    /// H and W must be divisible by 4 * scale.
    pub fn forward(
        &self,
        x:     Tensor<B, 4>,
        flow:  Tensor<B, 4>,
        scale: f64,
    ) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let x    = resize_bilinear(x, 1.0 / scale);
        let flow = resize_bilinear(flow, 1.0 / scale).div_scalar(scale);

        let mut feat = self.down1.forward(self.down0.forward(Tensor::cat(vec![x, flow], 1)));
        for stage in &self.residuals {
            feat = stage.forward(feat);
        }

        let flow = self.flow_head.forward(feat.clone());
        let mask = self.mask_head.forward(feat);

        (
            resize_bilinear(flow, scale).mul_scalar(scale),
            resize_bilinear(mask, scale),
        )
    }
}

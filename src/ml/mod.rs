// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// The network and everything that touches tensors lives here.
//
//   resample.rs:   bilinear resize and backward warp built
//                  from Burn gather/select primitives
//   block.rs:      IfBlock, a conv encoder, residual stages,
//                  transposed-conv flow and mask heads
//   model.rs:      IfNet, three blocks refining flow
//                  coarse-to-fine, ensemble and auto-scale
//   inferencer.rs: pads, batches, runs and crops frames
//   device.rs:     picks the Wgpu or ndarray backend
//
// Reference: Burn Book §3 (Building Blocks)
//            Huang et al. (2022) RIFE: Real-Time Intermediate
//            Flow Estimation for Video Frame Interpolation

/// Bilinear resize and flow-based warping
pub mod resample;

/// One coarse-to-fine flow refinement stage
pub mod block;

/// The three-block intermediate flow network
pub mod model;

/// Frame-level inference on a loaded checkpoint
pub mod inferencer;

/// Backend selection and dispatch
pub mod device;

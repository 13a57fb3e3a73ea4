// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between image files on disk and tensor batches:
//
//   image files
//       │
//       ▼
//   ImageLoader / SequenceLoader → decode into Frames
//       │
//       ▼
//   Preprocessor                 → zero-pad to the model alignment
//       │
//       ▼
//   FramePairBatcher             → stack pairs into [N, 6, H, W]
//
// For evaluation, TripletDataset enumerates (im1, im2, im3)
// directories and sample_subset() picks a reproducible subset.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Decodes image files into Frames using the image crate
pub mod loader;

/// Pads frames to the alignment the network needs
pub mod preprocessor;

/// Implements Burn's Dataset trait over triplet directories
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle-and-truncate for evaluation subsets
pub mod sampler;

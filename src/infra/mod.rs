// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to one business layer:
//
//   checkpoint.rs:  Saving and loading model weights with
//                   Burn's CompactRecorder, plus the model
//                   config as JSON so inference can rebuild
//                   the architecture.
//
//   frame_store.rs: Writing frames back to disk as images,
//                   either to one path or as a numbered
//                   sequence.
//
//   metrics.rs:     PSNR / MAE scoring and a CSV logger for
//                   evaluation runs.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Image output for interpolated frames
pub mod frame_store;

/// Evaluation metrics and CSV logger
pub mod metrics;

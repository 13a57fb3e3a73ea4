// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case coordinates the other layers to accomplish one
// command:
//   - No tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Work that needs a Burn backend is wrapped in a BackendTask so
// the command picks Wgpu or CPU once and everything below stays
// generic.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Create a freshly initialised checkpoint
pub mod init_use_case;

// Interpolate a single pair or a whole frame sequence
pub mod interpolate_use_case;

// Score interpolation quality on a triplet dataset
pub mod evaluate_use_case;

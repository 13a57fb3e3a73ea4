// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing frames and how they
// are interpolated.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A decoded RGB frame in planar float layout
pub mod frame;

// User-facing interpolation knobs (scale, ensemble, auto-scale)
pub mod settings;

// Core abstractions (traits) that other layers implement
pub mod traits;

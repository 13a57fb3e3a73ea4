// ============================================================
// Layer 3 — Frame Domain Type
// ============================================================
// A single video frame, decoded and normalised.
//
// Layout is planar (CHW): all red values, then all green, then
// all blue. This is the order the network consumes, so the
// batcher can copy planes straight into a tensor buffer.
//
//   data[c * width * height + y * width + x]
//
// Values are nominally in [0.0, 1.0]. Interpolated frames may
// drift slightly outside that range; to_rgb8() clamps.
//
// Reference: Rust Book §5 (Structs and Methods)

/// Number of colour channels carried by a frame.
pub const CHANNELS: usize = 3;

/// A decoded RGB frame in planar float layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width:  usize,
    pub height: usize,
    /// Planar RGB, length = 3 * width * height
    pub data:   Vec<f32>,
}

impl Frame {
    /// Wrap an existing planar buffer.
    /// Returns None if the buffer length doesn't match the dimensions.
    pub fn from_planar(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        if data.len() != CHANNELS * width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// A frame filled with one colour.
    pub fn filled(width: usize, height: usize, rgb: [f32; 3]) -> Self {
        let plane = width * height;
        let mut data = Vec::with_capacity(CHANNELS * plane);
        for value in rgb {
            data.extend(std::iter::repeat(value).take(plane));
        }
        Self { width, height, data }
    }

    /// Build a frame from interleaved 8-bit RGB (the layout image decoders give us).
    pub fn from_rgb8(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        let plane = width * height;
        if rgb.len() != CHANNELS * plane {
            return None;
        }
        let mut data = vec![0.0f32; CHANNELS * plane];
        for (i, px) in rgb.chunks_exact(CHANNELS).enumerate() {
            for c in 0..CHANNELS {
                data[c * plane + i] = px[c] as f32 / 255.0;
            }
        }
        Some(Self { width, height, data })
    }

    /// Convert back to interleaved 8-bit RGB, rounding and clamping.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let plane = self.width * self.height;
        let mut out = Vec::with_capacity(CHANNELS * plane);
        for i in 0..plane {
            for c in 0..CHANNELS {
                let v = self.data[c * plane + i].clamp(0.0, 1.0);
                out.push((v * 255.0).round() as u8);
            }
        }
        out
    }

    /// RGB value at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let plane = self.width * self.height;
        let i = y * self.width + x;
        [self.data[i], self.data[plane + i], self.data[2 * plane + i]]
    }

    pub fn same_size(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

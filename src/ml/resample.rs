// ============================================================
// Layer 5 — Resampling Ops
// ============================================================
// Two spatial ops the IFNet blocks are built around, composed
// from Burn primitives (select, gather, floor, clamp) so they
// run on any backend and stay differentiable:
//
//   resize_bilinear: scale a [B, C, H, W] tensor by a factor
//                    (half-pixel centres, align_corners = false)
//   warp:            backward-warp an image by a 2-channel
//                    flow field (bilinear, border padding)

use burn::prelude::*;

// ─── Bilinear resize ──────────────────────────────────────────────────────────

/// Source taps and weights for resizing one axis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinearTaps {
    pub lo:   Vec<i32>,
    pub hi:   Vec<i32>,
    pub w_lo: Vec<f32>,
    pub w_hi: Vec<f32>,
}

/// Compute taps for `out_len = floor(in_len * scale_factor)` outputs.
/// The factor itself drives the coordinate mapping:
///   src = max(0, (d + 0.5) / scale_factor - 0.5)
pub(crate) fn linear_taps(in_len: usize, out_len: usize, scale_factor: f64) -> LinearTaps {
    let ratio = 1.0 / scale_factor;
    let last  = in_len.saturating_sub(1);
    let mut taps = LinearTaps {
        lo:   Vec::with_capacity(out_len),
        hi:   Vec::with_capacity(out_len),
        w_lo: Vec::with_capacity(out_len),
        w_hi: Vec::with_capacity(out_len),
    };
    for d in 0..out_len {
        let src = ((d as f64 + 0.5) * ratio - 0.5).max(0.0);
        let lo  = (src.floor() as usize).min(last);
        let hi  = (lo + 1).min(last);
        let frac = (src - lo as f64).clamp(0.0, 1.0) as f32;
        taps.lo.push(lo as i32);
        taps.hi.push(hi as i32);
        taps.w_lo.push(1.0 - frac);
        taps.w_hi.push(frac);
    }
    taps
}

/// Output length of an axis resized by `scale_factor`.
pub fn scaled_len(len: usize, scale_factor: f64) -> usize {
    ((len as f64) * scale_factor).floor() as usize
}

/// Bilinearly resize the two spatial axes of `x` by `scale_factor`.
pub fn resize_bilinear<B: Backend>(x: Tensor<B, 4>, scale_factor: f64) -> Tensor<B, 4> {
    if scale_factor == 1.0 {
        return x;
    }
    let [_, _, h, w] = x.dims();
    let x = resize_axis(x, 2, h, scaled_len(h, scale_factor), scale_factor);
    resize_axis(x, 3, w, scaled_len(w, scale_factor), scale_factor)
}

fn resize_axis<B: Backend>(
    x:            Tensor<B, 4>,
    dim:          usize,
    in_len:       usize,
    out_len:      usize,
    scale_factor: f64,
) -> Tensor<B, 4> {
    let device = x.device();
    let taps   = linear_taps(in_len, out_len, scale_factor);

    let lo = Tensor::<B, 1, Int>::from_ints(taps.lo.as_slice(), &device);
    let hi = Tensor::<B, 1, Int>::from_ints(taps.hi.as_slice(), &device);

    // Weights broadcast along every axis except the one being resized
    let shape = if dim == 2 { [1, 1, out_len, 1] } else { [1, 1, 1, out_len] };
    let w_lo = Tensor::<B, 1>::from_floats(taps.w_lo.as_slice(), &device).reshape(shape);
    let w_hi = Tensor::<B, 1>::from_floats(taps.w_hi.as_slice(), &device).reshape(shape);

    x.clone().select(dim, lo) * w_lo + x.select(dim, hi) * w_hi
}

// ─── Backward warp ────────────────────────────────────────────────────────────

/// Sample `img` at (x + flow_x, y + flow_y) for every output pixel.
///
/// `img`:  [B, C, H, W]
/// `flow`: [B, 2, H, W], channel 0 = x displacement, 1 = y, in pixels
///
/// Coordinates are clamped to the image (border padding) and pixel
/// centres sit on integer coordinates.
pub fn warp<B: Backend>(img: Tensor<B, 4>, flow: Tensor<B, 4>) -> Tensor<B, 4> {
    let [b, c, h, w] = img.dims();
    let device = img.device();
    let hw = h * w;

    let base_x = Tensor::<B, 1, Int>::arange(0..w as i64, &device)
        .float()
        .reshape([1, 1, 1, w]);
    let base_y = Tensor::<B, 1, Int>::arange(0..h as i64, &device)
        .float()
        .reshape([1, 1, h, 1]);

    let sx = (flow.clone().slice([0..b, 0..1, 0..h, 0..w]) + base_x)
        .clamp(0.0, (w - 1) as f32);
    let sy = (flow.slice([0..b, 1..2, 0..h, 0..w]) + base_y)
        .clamp(0.0, (h - 1) as f32);

    let x0 = sx.clone().floor();
    let y0 = sy.clone().floor();
    let fx = (sx - x0.clone()).reshape([b, 1, hw]);
    let fy = (sy - y0.clone()).reshape([b, 1, hw]);
    let gx = fx.clone().neg().add_scalar(1.0);
    let gy = fy.clone().neg().add_scalar(1.0);

    let x0 = x0.int();
    let y0 = y0.int();
    let x1 = x0.clone().add_scalar(1).clamp_max((w - 1) as i32);
    let y1 = y0.clone().add_scalar(1).clamp_max((h - 1) as i32);

    let flat = img.reshape([b, c, hw]);
    let v00 = gather_pixels(&flat, y0.clone(), x0.clone(), w, [b, c, hw]);
    let v01 = gather_pixels(&flat, y0, x1.clone(), w, [b, c, hw]);
    let v10 = gather_pixels(&flat, y1.clone(), x0, w, [b, c, hw]);
    let v11 = gather_pixels(&flat, y1, x1, w, [b, c, hw]);

    let out = v00 * (gx.clone() * gy.clone())
        + v01 * (fx.clone() * gy)
        + v10 * (gx * fy.clone())
        + v11 * (fx * fy);
    out.reshape([b, c, h, w])
}

/// Gather `flat[b, c, y * w + x]` for per-pixel integer coordinates.
fn gather_pixels<B: Backend>(
    flat:  &Tensor<B, 3>,
    y:     Tensor<B, 4, Int>,
    x:     Tensor<B, 4, Int>,
    w:     usize,
    shape: [usize; 3],
) -> Tensor<B, 3> {
    let [b, _, hw] = shape;
    let index = (y.mul_scalar(w as i32) + x)
        .reshape([b, 1, hw])
        .expand(shape);
    flat.clone().gather(2, index)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TB = NdArray;

    fn row(values: &[f32]) -> Tensor<TB, 4> {
        let device = Default::default();
        Tensor::<TB, 1>::from_floats(values, &device).reshape([1, 1, 1, values.len()])
    }

    fn to_vec(t: Tensor<TB, 4>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_taps_upsample() {
        let t = linear_taps(2, 4, 2.0);
        assert_eq!(t.lo, vec![0, 0, 0, 1]);
        assert_eq!(t.hi, vec![1, 1, 1, 1]);
        // Last output sits past the final sample, both taps point at it
        assert_close(&t.w_hi, &[0.0, 0.25, 0.75, 0.25]);
    }

    #[test]
    fn test_resize_identity() {
        let x = row(&[1.0, 2.0, 3.0]);
        assert_close(&to_vec(resize_bilinear(x, 1.0)), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resize_down_and_up() {
        // Two identical rows so the height pass has something to halve
        let device = Default::default();
        let x = Tensor::<TB, 4>::from_data(
            TensorData::new(vec![0.0f32, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0], [1, 1, 2, 4]),
            &device,
        );
        let down = resize_bilinear(x, 0.5);
        assert_eq!(down.dims(), [1, 1, 1, 2]);
        assert_close(&to_vec(down), &[0.5, 2.5]);

        let up = resize_axis(row(&[0.0, 1.0]), 3, 2, 4, 2.0);
        assert_close(&to_vec(up), &[0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_warp_zero_flow_is_identity() {
        let device = Default::default();
        let img  = Tensor::<TB, 4>::random([1, 3, 4, 5], burn::tensor::Distribution::Default, &device);
        let flow = Tensor::<TB, 4>::zeros([1, 2, 4, 5], &device);
        assert_close(&to_vec(warp(img.clone(), flow)), &to_vec(img));
    }

    #[test]
    fn test_warp_shift_clamps_at_border() {
        let device = Default::default();
        let img  = row(&[0.0, 10.0, 20.0, 30.0]);
        let flow = Tensor::<TB, 4>::from_data(
            TensorData::new(vec![1.0f32, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0], [1, 2, 1, 4]),
            &device,
        );
        assert_close(&to_vec(warp(img, flow)), &[10.0, 20.0, 30.0, 30.0]);
    }

    #[test]
    fn test_warp_half_pixel_blends() {
        let device = Default::default();
        let img  = row(&[0.0, 10.0]);
        let flow = Tensor::<TB, 4>::from_data(
            TensorData::new(vec![0.5f32, 0.5, 0.0, 0.0], [1, 2, 1, 2]),
            &device,
        );
        assert_close(&to_vec(warp(img, flow)), &[5.0, 10.0]);
    }
}

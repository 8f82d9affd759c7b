use crate::pixels::source::SourceImage;

/// Coordinates are clamped to `[0, dim - 1 - EDGE_EPS]` so the +1 neighbour weight never reaches
/// past the last texel.
pub const EDGE_EPS: f64 = 0.001;

/// Clamp `coord` for an axis of `dim` texels and return `(i0, i1, frac)`.
///
/// Both indices are always `< dim`. `coord` must not be NaN.
#[inline]
pub fn neighbours(coord: f64, dim: u32) -> (usize, usize, f64) {
    let hi = (f64::from(dim) - 1.0 - EDGE_EPS).max(0.0);
    let c = coord.clamp(0.0, hi);
    let last = dim.saturating_sub(1) as usize;
    let i0 = (c.floor() as usize).min(last);
    let i1 = (i0 + 1).min(last);
    (i0, i1, c - i0 as f64)
}

/// Edge-clamped bilinear sample of `src` at `(sx, sy)`, written into `out` (one pixel, same
/// channel count as the source). Values are rounded to nearest and saturated.
#[inline]
pub fn sample_bilinear(src: &SourceImage, sx: f64, sy: f64, out: &mut [u8]) {
    let (x0, x1, fx) = neighbours(sx, src.width());
    let (y0, y1, fy) = neighbours(sy, src.height());

    let c00 = src.pixel(x0, y0);
    let c10 = src.pixel(x1, y0);
    let c01 = src.pixel(x0, y1);
    let c11 = src.pixel(x1, y1);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    for (c, dst) in out.iter_mut().enumerate() {
        let v = f64::from(c00[c]) * w00
            + f64::from(c10[c]) * w10
            + f64::from(c01[c]) * w01
            + f64::from(c11[c]) * w11;
        *dst = v.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/sampler.rs"]
mod tests;

//! Fold functions: map a lattice offset into the fundamental cell of each symmetry family.
//!
//! Every fold takes the pre-transformed offset from the sampling centre (already divided by zoom
//! and rotated) and returns the folded offset to add back onto the source centre.

use std::f64::consts::TAU;

use crate::foundation::core::Vec2;
use crate::params::model::Geometry;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

pub(crate) type FoldFn = fn(Vec2, &Tiling) -> Vec2;

/// Per-render cell dimensions derived from the geometry and the source size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tiling {
    /// Angular width of one radial wedge (`2π / N`); 0 for tiled modes.
    pub segment_angle: f64,
    /// Horizontal period (or equilateral side length) in source pixels.
    pub tile_w: f64,
    /// Vertical period in source pixels.
    pub tile_h: f64,
}

impl Tiling {
    pub fn new(geometry: &Geometry, src_w: u32, src_h: u32) -> Self {
        let base = f64::from(src_w.min(src_h));
        let side = |pct: f64| pct / 100.0 * base;
        match *geometry {
            Geometry::Radial { num_segments } => Self {
                segment_angle: TAU / f64::from(num_segments),
                tile_w: 0.0,
                tile_h: 0.0,
            },
            Geometry::Rectangle {
                tile_size_pct,
                tile_aspect,
            } => {
                let w = side(tile_size_pct);
                Self {
                    segment_angle: 0.0,
                    tile_w: w,
                    tile_h: w * tile_aspect,
                }
            }
            Geometry::Triangle45 { tile_size_pct } | Geometry::Triangle60 { tile_size_pct } => {
                let s = side(tile_size_pct);
                Self {
                    segment_angle: 0.0,
                    tile_w: s,
                    tile_h: s,
                }
            }
            Geometry::Triangle3060 { tile_size_pct } => {
                let w = side(tile_size_pct);
                Self {
                    segment_angle: 0.0,
                    tile_w: w,
                    tile_h: w * SQRT_3,
                }
            }
        }
    }
}

/// Triangle-wave fold of `v` with period `period`. Result lies in `[0, period / 2]`.
#[inline]
pub fn tri_fold(v: f64, period: f64) -> f64 {
    let m = v.rem_euclid(period);
    if m <= period * 0.5 { m } else { period - m }
}

/// Fold an angle into `[0, segment_angle / 2]`: wrap into one wedge, then mirror the far half.
#[inline]
pub fn fold_angle(theta: f64, segment_angle: f64) -> f64 {
    let t = theta.rem_euclid(TAU).rem_euclid(segment_angle);
    if t > segment_angle * 0.5 {
        segment_angle - t
    } else {
        t
    }
}

/// Reflect fractional triangular-lattice coordinates into the lower triangle `u + v <= 1`.
///
/// Points already inside are returned unchanged; the rest are reflected across the shared edge
/// via `(u, v) -> (1 - v, 1 - u)`.
#[inline]
pub fn fold_lattice(u: f64, v: f64) -> (f64, f64) {
    let uf = u - u.floor();
    let vf = v - v.floor();
    if uf + vf >= 1.0 {
        (1.0 - vf, 1.0 - uf)
    } else {
        (uf, vf)
    }
}

pub(crate) fn radial(d: Vec2, t: &Tiling) -> Vec2 {
    let r = d.hypot();
    let theta = fold_angle(d.atan2(), t.segment_angle);
    Vec2::from_angle(theta) * r
}

pub(crate) fn rectangle(d: Vec2, t: &Tiling) -> Vec2 {
    Vec2::new(tri_fold(d.x, t.tile_w), tri_fold(d.y, t.tile_h))
}

pub(crate) fn triangle_45(d: Vec2, t: &Tiling) -> Vec2 {
    let tx = tri_fold(d.x, t.tile_w);
    let ty = tri_fold(d.y, t.tile_w);
    if tx < ty {
        Vec2::new(ty, tx)
    } else {
        Vec2::new(tx, ty)
    }
}

pub(crate) fn triangle_60(d: Vec2, t: &Tiling) -> Vec2 {
    let s = t.tile_w;
    let row_h = s * SQRT_3 * 0.5;
    // Solve d = u * (s, 0) + v * (s/2, s*sqrt(3)/2).
    let v = d.y / row_h;
    let u = d.x / s - v * 0.5;
    let (u, v) = fold_lattice(u, v);
    Vec2::new((u + v * 0.5) * s, v * row_h)
}

pub(crate) fn triangle_30_60(d: Vec2, t: &Tiling) -> Vec2 {
    let p = Vec2::new(tri_fold(d.x, t.tile_w), tri_fold(d.y, t.tile_h));
    // Hypotenuse of the 30-60-90 cell: a * x + b * y = 1.
    let n = Vec2::new(2.0 / t.tile_w, 2.0 / t.tile_h);
    let dist = n.dot(p) - 1.0;
    if dist > 0.0 {
        p - n * (2.0 * dist / n.hypot2())
    } else {
        p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fold.rs"]
mod tests;

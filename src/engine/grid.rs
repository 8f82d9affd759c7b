use crate::engine::fold::{FoldFn, Tiling};
use crate::engine::registry::mode_entry;
use crate::foundation::core::{Affine, Vec2};
use crate::params::model::{CommonParams, EffectParameters};
use crate::pixels::output::OutputSpec;

/// Shared pre-transform: output pixel -> offset from the canvas centre, divided by zoom and
/// rotated with the sampling lattice.
#[derive(Clone, Copy, Debug)]
pub struct SamplingFrame {
    out_center: Vec2,
    src_center: Vec2,
    lattice: Affine,
}

impl SamplingFrame {
    pub fn new(common: &CommonParams, src_w: u32, src_h: u32, out: OutputSpec) -> Self {
        Self {
            out_center: Vec2::new(f64::from(out.width) * 0.5, f64::from(out.height) * 0.5),
            src_center: Vec2::new(
                common.center_x_pct / 100.0 * f64::from(src_w),
                common.center_y_pct / 100.0 * f64::from(src_h),
            ),
            lattice: Affine::rotate(common.rotation_rad()) * Affine::scale(1.0 / common.zoom),
        }
    }

    #[inline]
    pub fn offset(&self, x: f64, y: f64) -> Vec2 {
        let d = Vec2::new(x, y) - self.out_center;
        (self.lattice * d.to_point()).to_vec2()
    }

    pub fn src_center(&self) -> Vec2 {
        self.src_center
    }
}

/// Full coordinate field for one render: output pixel -> floating source coordinate.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMap {
    frame: SamplingFrame,
    tiling: Tiling,
    fold: FoldFn,
}

impl CoordinateMap {
    pub fn new(params: &EffectParameters, src_w: u32, src_h: u32, out: OutputSpec) -> Self {
        Self {
            frame: SamplingFrame::new(&params.common, src_w, src_h, out),
            tiling: Tiling::new(&params.geometry, src_w, src_h),
            fold: mode_entry(params.mode()).fold,
        }
    }

    /// Folded offset from the source centre for the output position `(x, y)`.
    #[inline]
    pub fn folded_offset(&self, x: f64, y: f64) -> Vec2 {
        (self.fold)(self.frame.offset(x, y), &self.tiling)
    }

    /// Source coordinate sampled for the output position `(x, y)`.
    #[inline]
    pub fn source_coord(&self, x: f64, y: f64) -> Vec2 {
        self.frame.src_center() + self.folded_offset(x, y)
    }

    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/grid.rs"]
mod tests;

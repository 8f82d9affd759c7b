//! kaleido turns a source pixel buffer into kaleidoscopic mirror and tiling patterns.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: [`EffectParameters`] = shared lattice controls (rotation, zoom, centre) plus a
//!    per-mode [`Geometry`].
//! 2. **Map**: every output pixel becomes an offset from the canvas centre, divided by zoom and
//!    rotated, then folded into the fundamental cell of the chosen symmetry ([`CoordinateMap`]).
//! 3. **Sample**: the folded offset is added to the source sampling centre and read with an
//!    edge-clamped bilinear filter.
//!
//! Interactive front ends feed parameter changes into a [`RenderScheduler`], which debounces
//! bursts and keeps at most one render in flight. Exports call [`export_full_resolution`]
//! directly.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO in the engine**: decoding and encoding stay with the caller; [`SourceImage::from_dynamic`]
//!   and [`RenderResult::into_dynamic`] are the only bridges to the `image` crate.
//! - **Channel count is preserved**: RGB in, RGB out; RGBA in, RGBA out.
#![forbid(unsafe_code)]

mod engine;
mod foundation;
mod params;
mod pixels;
mod render;

pub use engine::apply::{apply, apply_effect};
pub use engine::fold::{Tiling, fold_angle, fold_lattice, tri_fold};
pub use engine::grid::{CoordinateMap, SamplingFrame};
pub use engine::registry::{
    ASPECT_RANGE, CENTER_RANGE, MODES, ModeEntry, ParamRange, ROTATION_RANGE, SEGMENTS_RANGE,
    TILE_SIZE_LIMIT, TILE_SIZE_RANGE, ZOOM_RANGE, mode_entry,
};
pub use engine::sampler::{EDGE_EPS, neighbours, sample_bilinear};
pub use foundation::core::{Affine, PixelLayout, Vec2};
pub use foundation::error::{KaleidoError, KaleidoResult};
pub use params::model::{CommonParams, EffectParameters, Geometry, Mode};
pub use pixels::output::{OutputSpec, RenderResult};
pub use pixels::source::{PREVIEW_MAX_DIM, SourceImage, prepare_preview};
pub use render::backend::{RenderBackend, TransformEngine};
pub use render::export::export_full_resolution;
pub use render::job::{CancelToken, JobId, JobOutcome, JobState, RenderJob};
pub use render::scheduler::{
    PresentSink, RenderScheduler, SchedulerOpts, SchedulerState, SchedulerStats,
};

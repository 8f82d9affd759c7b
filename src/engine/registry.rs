//! Static mode table: tag, display name, control ranges and fold function per mode.
//!
//! Built at compile time and never mutated. Entries are stored in [`Mode`] discriminant order so
//! lookup is a direct index.

use crate::engine::fold::{self, FoldFn};
use crate::params::model::Mode;

/// Interactive control range and default for one numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

pub const SEGMENTS_RANGE: ParamRange = ParamRange {
    min: 2.0,
    max: 24.0,
    default: 8.0,
};

/// Slider range for tile size. Any value in `(0, TILE_SIZE_LIMIT]` is accepted.
pub const TILE_SIZE_RANGE: ParamRange = ParamRange {
    min: 5.0,
    max: 200.0,
    default: 50.0,
};

pub const TILE_SIZE_LIMIT: f64 = 200.0;

pub const ASPECT_RANGE: ParamRange = ParamRange {
    min: 0.25,
    max: 4.0,
    default: 1.0,
};

pub const ROTATION_RANGE: ParamRange = ParamRange {
    min: 0.0,
    max: 360.0,
    default: 0.0,
};

pub const ZOOM_RANGE: ParamRange = ParamRange {
    min: 0.1,
    max: 3.0,
    default: 1.0,
};

pub const CENTER_RANGE: ParamRange = ParamRange {
    min: 0.0,
    max: 100.0,
    default: 50.0,
};

#[derive(Clone, Copy, Debug)]
pub struct ModeEntry {
    pub mode: Mode,
    /// Wire tag used in JSON and on the command line.
    pub tag: &'static str,
    pub display_name: &'static str,
    /// Range of the mode's primary control: segment count for radial, tile size otherwise.
    pub primary: ParamRange,
    /// Whether the mode reads `tile_aspect`.
    pub uses_aspect: bool,
    pub(crate) fold: FoldFn,
}

pub static MODES: [ModeEntry; 5] = [
    ModeEntry {
        mode: Mode::Radial,
        tag: "radial",
        display_name: "Radial",
        primary: SEGMENTS_RANGE,
        uses_aspect: false,
        fold: fold::radial,
    },
    ModeEntry {
        mode: Mode::Rectangle,
        tag: "rectangle",
        display_name: "Rectangle",
        primary: TILE_SIZE_RANGE,
        uses_aspect: true,
        fold: fold::rectangle,
    },
    ModeEntry {
        mode: Mode::Triangle45,
        tag: "triangle_45",
        display_name: "Triangle 45-45-90",
        primary: TILE_SIZE_RANGE,
        uses_aspect: false,
        fold: fold::triangle_45,
    },
    ModeEntry {
        mode: Mode::Triangle60,
        tag: "triangle_60",
        display_name: "Triangle 60 (equilateral)",
        primary: TILE_SIZE_RANGE,
        uses_aspect: false,
        fold: fold::triangle_60,
    },
    ModeEntry {
        mode: Mode::Triangle3060,
        tag: "triangle_30_60",
        display_name: "Triangle 30-60-90",
        primary: TILE_SIZE_RANGE,
        uses_aspect: false,
        fold: fold::triangle_30_60,
    },
];

#[inline]
pub fn mode_entry(mode: Mode) -> &'static ModeEntry {
    &MODES[mode as usize]
}

#[cfg(test)]
#[path = "../../tests/unit/engine/registry.rs"]
mod tests;

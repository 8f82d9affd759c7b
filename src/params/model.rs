use std::fmt;
use std::str::FromStr;

use crate::engine::registry::{self, CENTER_RANGE, ParamRange, ZOOM_RANGE};
use crate::foundation::error::{KaleidoError, KaleidoResult};

/// Symmetry family used to fold the sampling lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Radial = 0,
    Rectangle = 1,
    Triangle45 = 2,
    Triangle60 = 3,
    Triangle3060 = 4,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Radial,
        Mode::Rectangle,
        Mode::Triangle45,
        Mode::Triangle60,
        Mode::Triangle3060,
    ];

    /// Parse a wire tag (`"radial"`, `"triangle_30_60"`, ...). Unknown tags are rejected.
    pub fn from_tag(tag: &str) -> KaleidoResult<Self> {
        let wanted = tag.trim().to_ascii_lowercase();
        registry::MODES
            .iter()
            .find(|e| e.tag == wanted)
            .map(|e| e.mode)
            .ok_or_else(|| KaleidoError::invalid_mode(format!("unknown mode '{}'", tag.trim())))
    }

    pub fn tag(self) -> &'static str {
        registry::mode_entry(self).tag
    }

    pub fn display_name(self) -> &'static str {
        registry::mode_entry(self).display_name
    }
}

impl FromStr for Mode {
    type Err = KaleidoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fields shared by every mode.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CommonParams {
    /// Lattice rotation in degrees; any real value, wrapped mod 360.
    pub rotation_deg: f64,
    /// Magnification; larger values sample a smaller source region. Must be > 0.
    pub zoom: f64,
    /// Sampling centre as a percentage of source width.
    pub center_x_pct: f64,
    /// Sampling centre as a percentage of source height.
    pub center_y_pct: f64,
}

impl Default for CommonParams {
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            zoom: ZOOM_RANGE.default,
            center_x_pct: CENTER_RANGE.default,
            center_y_pct: CENTER_RANGE.default,
        }
    }
}

impl CommonParams {
    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.rem_euclid(360.0).to_radians()
    }
}

fn default_segments() -> u32 {
    registry::SEGMENTS_RANGE.default as u32
}

fn default_tile_size() -> f64 {
    registry::TILE_SIZE_RANGE.default
}

fn default_aspect() -> f64 {
    registry::ASPECT_RANGE.default
}

/// Mode tag plus the fields that only that mode reads.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Geometry {
    Radial {
        #[serde(default = "default_segments")]
        num_segments: u32,
    },
    Rectangle {
        #[serde(default = "default_tile_size")]
        tile_size_pct: f64,
        #[serde(default = "default_aspect")]
        tile_aspect: f64,
    },
    #[serde(rename = "triangle_45")]
    Triangle45 {
        #[serde(default = "default_tile_size")]
        tile_size_pct: f64,
    },
    #[serde(rename = "triangle_60")]
    Triangle60 {
        #[serde(default = "default_tile_size")]
        tile_size_pct: f64,
    },
    #[serde(rename = "triangle_30_60")]
    Triangle3060 {
        #[serde(default = "default_tile_size")]
        tile_size_pct: f64,
    },
}

impl Geometry {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Radial { .. } => Mode::Radial,
            Self::Rectangle { .. } => Mode::Rectangle,
            Self::Triangle45 { .. } => Mode::Triangle45,
            Self::Triangle60 { .. } => Mode::Triangle60,
            Self::Triangle3060 { .. } => Mode::Triangle3060,
        }
    }

    /// Default geometry for `mode`.
    pub fn defaults(mode: Mode) -> Self {
        let tile_size_pct = default_tile_size();
        match mode {
            Mode::Radial => Self::Radial {
                num_segments: default_segments(),
            },
            Mode::Rectangle => Self::Rectangle {
                tile_size_pct,
                tile_aspect: default_aspect(),
            },
            Mode::Triangle45 => Self::Triangle45 { tile_size_pct },
            Mode::Triangle60 => Self::Triangle60 { tile_size_pct },
            Mode::Triangle3060 => Self::Triangle3060 { tile_size_pct },
        }
    }

    /// Tile size percentage for tiled modes, `None` for radial.
    pub fn tile_size_pct(&self) -> Option<f64> {
        match *self {
            Self::Radial { .. } => None,
            Self::Rectangle { tile_size_pct, .. }
            | Self::Triangle45 { tile_size_pct }
            | Self::Triangle60 { tile_size_pct }
            | Self::Triangle3060 { tile_size_pct } => Some(tile_size_pct),
        }
    }
}

/// One complete, immutable render request description.
///
/// Serialized as a flat object: `{"mode": "rectangle", "zoom": 1.5, "tile_size_pct": 40, ...}`.
/// Missing fields take the defaults of the interactive controls.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectParameters {
    #[serde(flatten)]
    pub common: CommonParams,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl EffectParameters {
    /// Build and validate.
    pub fn new(common: CommonParams, geometry: Geometry) -> KaleidoResult<Self> {
        let p = Self { common, geometry };
        p.validate()?;
        Ok(p)
    }

    pub fn defaults(mode: Mode) -> Self {
        Self {
            common: CommonParams::default(),
            geometry: Geometry::defaults(mode),
        }
    }

    pub fn mode(&self) -> Mode {
        self.geometry.mode()
    }

    /// Parse from JSON. The mode tag is checked before anything else so an unknown tag is always
    /// reported as [`KaleidoError::InvalidMode`].
    pub fn from_json(json: &str) -> KaleidoResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> KaleidoResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| KaleidoError::serde("effect parameters must be a JSON object"))?;
        let tag = obj
            .get("mode")
            .and_then(|v| v.as_str())
            .ok_or_else(|| KaleidoError::invalid_mode("missing 'mode' tag"))?;
        Mode::from_tag(tag)?;

        let p: Self = serde_json::from_value(value)?;
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> KaleidoResult<()> {
        let c = &self.common;
        if !c.rotation_deg.is_finite() {
            return Err(KaleidoError::invalid_parameter("rotation_deg must be finite"));
        }
        if !c.zoom.is_finite() || c.zoom <= 0.0 {
            return Err(KaleidoError::invalid_parameter("zoom must be > 0"));
        }
        check_closed("center_x_pct", c.center_x_pct, CENTER_RANGE)?;
        check_closed("center_y_pct", c.center_y_pct, CENTER_RANGE)?;

        match self.geometry {
            Geometry::Radial { num_segments } => {
                let r = registry::SEGMENTS_RANGE;
                if !(r.min as u32..=r.max as u32).contains(&num_segments) {
                    return Err(KaleidoError::invalid_parameter(format!(
                        "num_segments must be in [{}, {}], got {num_segments}",
                        r.min, r.max
                    )));
                }
            }
            Geometry::Rectangle {
                tile_size_pct,
                tile_aspect,
            } => {
                check_tile_size(tile_size_pct)?;
                if !tile_aspect.is_finite() || tile_aspect <= 0.0 {
                    return Err(KaleidoError::invalid_parameter("tile_aspect must be > 0"));
                }
            }
            Geometry::Triangle45 { tile_size_pct }
            | Geometry::Triangle60 { tile_size_pct }
            | Geometry::Triangle3060 { tile_size_pct } => check_tile_size(tile_size_pct)?,
        }
        Ok(())
    }
}

fn check_closed(name: &str, v: f64, range: ParamRange) -> KaleidoResult<()> {
    if !v.is_finite() || v < range.min || v > range.max {
        return Err(KaleidoError::invalid_parameter(format!(
            "{name} must be in [{}, {}], got {v}",
            range.min, range.max
        )));
    }
    Ok(())
}

fn check_tile_size(v: f64) -> KaleidoResult<()> {
    let max = registry::TILE_SIZE_LIMIT;
    if !v.is_finite() || v <= 0.0 || v > max {
        return Err(KaleidoError::invalid_parameter(format!(
            "tile_size_pct must be in (0, {max}], got {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/params/model.rs"]
mod tests;

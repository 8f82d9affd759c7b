use rayon::prelude::*;

use crate::engine::grid::CoordinateMap;
use crate::engine::sampler::sample_bilinear;
use crate::foundation::core::buffer_len;
use crate::foundation::error::{KaleidoError, KaleidoResult};
use crate::params::model::{EffectParameters, Mode};
use crate::pixels::output::{OutputSpec, RenderResult};
use crate::pixels::source::SourceImage;

/// Run the transform for `mode`.
///
/// The output is `output` sized (source sized when `None`) with the source's channel layout.
/// `params` are trusted to be in range; only the mode/geometry agreement is checked up front. A
/// non-finite sampling coordinate anywhere (e.g. zero zoom) fails the whole call and no partial
/// buffer is returned.
#[tracing::instrument(
    level = "debug",
    skip(source, params),
    fields(src_w = source.width(), src_h = source.height())
)]
pub fn apply_effect(
    mode: Mode,
    source: &SourceImage,
    params: &EffectParameters,
    output: Option<OutputSpec>,
) -> KaleidoResult<RenderResult> {
    if params.mode() != mode {
        return Err(KaleidoError::invalid_parameter(format!(
            "parameters describe mode '{}' but '{mode}' was requested",
            params.mode()
        )));
    }
    let out = OutputSpec::resolve(output, source);
    if out.width == 0 || out.height == 0 {
        return Err(KaleidoError::invalid_parameter(
            "output width and height must be > 0",
        ));
    }

    let layout = source.layout();
    let c = layout.channels();
    let map = CoordinateMap::new(params, source.width(), source.height(), out);
    let mut data = vec![0u8; buffer_len(out.width, out.height, layout)?];

    data.par_chunks_mut(out.width as usize * c)
        .enumerate()
        .try_for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(c).enumerate() {
                let s = map.source_coord(x as f64, y as f64);
                if !s.x.is_finite() || !s.y.is_finite() {
                    return Err(KaleidoError::compute(format!(
                        "non-finite sampling coordinate at output pixel ({x}, {y})"
                    )));
                }
                sample_bilinear(source, s.x, s.y, px);
            }
            Ok(())
        })?;

    Ok(RenderResult {
        width: out.width,
        height: out.height,
        layout,
        data,
    })
}

/// [`apply_effect`] with the mode taken from `params`.
pub fn apply(
    source: &SourceImage,
    params: &EffectParameters,
    output: Option<OutputSpec>,
) -> KaleidoResult<RenderResult> {
    apply_effect(params.mode(), source, params, output)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/apply.rs"]
mod tests;

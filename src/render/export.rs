use crate::engine::apply::apply;
use crate::foundation::error::KaleidoResult;
use crate::params::model::EffectParameters;
use crate::pixels::output::{OutputSpec, RenderResult};
use crate::pixels::source::SourceImage;

/// Full-resolution render on the caller's thread.
///
/// Blocks for the duration of one engine call. Never debounced and never cancelled; parameters
/// are validated first since this path is driven directly by the application.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(mode = %params.mode(), w = source.width(), h = source.height())
)]
pub fn export_full_resolution(
    source: &SourceImage,
    params: &EffectParameters,
    output: Option<OutputSpec>,
) -> KaleidoResult<RenderResult> {
    params.validate()?;
    let started = std::time::Instant::now();
    let res = apply(source, params, output)?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "export rendered"
    );
    Ok(res)
}

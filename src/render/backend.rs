use crate::engine::apply::apply;
use crate::foundation::error::KaleidoResult;
use crate::params::model::EffectParameters;
use crate::pixels::output::{OutputSpec, RenderResult};
use crate::pixels::source::SourceImage;

/// Compute seam used by the scheduler. Implementations must be pure with respect to their inputs
/// and safe to call from a worker thread.
pub trait RenderBackend: Send + Sync {
    fn render(
        &self,
        source: &SourceImage,
        params: &EffectParameters,
        output: Option<OutputSpec>,
    ) -> KaleidoResult<RenderResult>;
}

/// Default backend: the CPU transform engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformEngine;

impl RenderBackend for TransformEngine {
    fn render(
        &self,
        source: &SourceImage,
        params: &EffectParameters,
        output: Option<OutputSpec>,
    ) -> KaleidoResult<RenderResult> {
        apply(source, params, output)
    }
}

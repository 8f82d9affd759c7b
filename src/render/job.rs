use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::KaleidoError;
use crate::params::model::EffectParameters;
use crate::pixels::output::{OutputSpec, RenderResult};
use crate::pixels::source::SourceImage;
use crate::render::backend::RenderBackend;

/// Monotonically increasing job identifier; later jobs compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

/// Advisory cancellation flag shared between the orchestrator and one job.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Terminal state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed(RenderResult),
    Cancelled,
    Failed(KaleidoError),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Cancelled => JobState::Cancelled,
            Self::Failed(_) => JobState::Failed,
        }
    }
}

/// One render request bound to its inputs and a cancellation token. Never reused.
#[derive(Debug)]
pub struct RenderJob {
    pub id: JobId,
    pub source: Arc<SourceImage>,
    pub params: EffectParameters,
    pub output: Option<OutputSpec>,
    cancel: CancelToken,
}

impl RenderJob {
    pub fn new(
        id: JobId,
        source: Arc<SourceImage>,
        params: EffectParameters,
        output: Option<OutputSpec>,
    ) -> Self {
        Self {
            id,
            source,
            params,
            output,
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Compute to completion on the calling thread.
    ///
    /// Cancellation is read exactly once, after the backend returns: a job cancelled mid-compute
    /// still pays the full cost and then reports [`JobOutcome::Cancelled`], whatever the backend
    /// produced.
    pub fn run(&self, backend: &dyn RenderBackend) -> JobOutcome {
        let res = backend.render(&self.source, &self.params, self.output);
        if self.cancel.is_cancelled() {
            return JobOutcome::Cancelled;
        }
        match res {
            Ok(r) => JobOutcome::Completed(r),
            Err(e) => JobOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/job.rs"]
mod tests;

//! Debounced, single-flight render scheduling for interactive previews.
//!
//! The scheduler lives on the orchestration thread. Parameter changes push the debounce deadline
//! out; once it passes without further changes, [`RenderScheduler::poll`] starts a job on its own
//! worker thread. A job still running at that point is flagged cancelled and left to finish on its
//! own; its result is discarded when it reports back.
//!
//! Every method taking `now` has a plain variant that reads [`Instant::now`]. Tests and event
//! loops with their own clock use the `_at` forms.

use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::KaleidoError;
use crate::params::model::EffectParameters;
use crate::pixels::output::{OutputSpec, RenderResult};
use crate::pixels::source::SourceImage;
use crate::render::backend::{RenderBackend, TransformEngine};
use crate::render::job::{CancelToken, JobId, JobOutcome, RenderJob};

/// Options controlling [`RenderScheduler`] timing.
#[derive(Clone, Debug)]
pub struct SchedulerOpts {
    /// Quiet period after the last change before a render starts.
    pub debounce: Duration,
    /// Upper bound on how long [`RenderScheduler::shutdown`] waits for workers.
    pub shutdown_wait: Duration,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(120),
            shutdown_wait: Duration::from_secs(2),
        }
    }
}

/// Counters over the scheduler's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Parameter changes received (including ones ignored for lack of a source).
    pub changes: u64,
    /// Jobs handed to a worker.
    pub started: u64,
    /// Results delivered to the sink.
    pub completed: u64,
    /// Jobs whose result was discarded.
    pub cancelled: u64,
    /// Errors delivered to the sink.
    pub failed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A debounce deadline is pending.
    Scheduled,
    /// A job is computing and nothing newer is pending.
    Running,
}

/// Presentation collaborator receiving job outcomes.
pub trait PresentSink {
    fn present(&mut self, job: JobId, result: RenderResult);

    /// Called once per failed job.
    fn failed(&mut self, job: JobId, error: &KaleidoError);
}

#[derive(Debug)]
struct Finished {
    id: JobId,
    outcome: JobOutcome,
}

#[derive(Debug)]
struct InFlight {
    id: JobId,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

pub struct RenderScheduler<B: RenderBackend + 'static = TransformEngine> {
    backend: Arc<B>,
    opts: SchedulerOpts,

    source: Option<Arc<SourceImage>>,
    params: Option<EffectParameters>,
    output: Option<OutputSpec>,

    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
    retired: Vec<InFlight>,
    last_delivered: Option<JobId>,
    next_id: u64,

    tx: mpsc::Sender<Finished>,
    rx: mpsc::Receiver<Finished>,
    stats: SchedulerStats,
}

impl Default for RenderScheduler<TransformEngine> {
    fn default() -> Self {
        Self::new(TransformEngine, SchedulerOpts::default())
    }
}

impl<B: RenderBackend + 'static> RenderScheduler<B> {
    pub fn new(backend: B, opts: SchedulerOpts) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend: Arc::new(backend),
            opts,
            source: None,
            params: None,
            output: None,
            deadline: None,
            in_flight: None,
            retired: Vec::new(),
            last_delivered: None,
            next_id: 1,
            tx,
            rx,
            stats: SchedulerStats::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn state(&self) -> SchedulerState {
        if self.deadline.is_some() {
            SchedulerState::Scheduled
        } else if self.in_flight.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Pending debounce deadline, for event loops that sleep until the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Id of the job whose result is currently awaited, if any.
    pub fn current_job(&self) -> Option<JobId> {
        self.in_flight.as_ref().map(|j| j.id)
    }

    pub fn set_source(&mut self, source: Arc<SourceImage>) {
        self.set_source_at(source, Instant::now());
    }

    /// Replace the preview source. Re-renders once parameters are known.
    pub fn set_source_at(&mut self, source: Arc<SourceImage>, now: Instant) {
        tracing::debug!(w = source.width(), h = source.height(), "source set");
        self.source = Some(source);
        if self.params.is_some() {
            self.schedule(now);
        }
    }

    pub fn set_output(&mut self, output: Option<OutputSpec>) {
        self.set_output_at(output, Instant::now());
    }

    /// Change the preview canvas size (e.g. the view was resized).
    pub fn set_output_at(&mut self, output: Option<OutputSpec>, now: Instant) {
        if self.output == output {
            return;
        }
        self.output = output;
        if self.source.is_some() && self.params.is_some() {
            self.schedule(now);
        }
    }

    pub fn params_changed(&mut self, params: EffectParameters) {
        self.params_changed_at(params, Instant::now());
    }

    /// Record new parameters and (re)start the debounce window.
    ///
    /// Ignored for scheduling purposes until a source is set.
    pub fn params_changed_at(&mut self, params: EffectParameters, now: Instant) {
        self.stats.changes += 1;
        self.params = Some(params);
        if self.source.is_none() {
            tracing::debug!("parameters changed without a source; nothing scheduled");
            return;
        }
        self.schedule(now);
    }

    fn schedule(&mut self, now: Instant) {
        let deadline = now + self.opts.debounce;
        tracing::trace!(?deadline, "debounce restarted");
        self.deadline = Some(deadline);
    }

    pub fn poll(&mut self, sink: &mut dyn PresentSink) {
        self.poll_at(Instant::now(), sink);
    }

    /// Deliver finished jobs, then start a new job if the debounce deadline has passed.
    pub fn poll_at(&mut self, now: Instant, sink: &mut dyn PresentSink) {
        while let Ok(msg) = self.rx.try_recv() {
            self.finish(msg, sink);
        }
        if self.deadline.is_some_and(|d| now >= d) {
            self.deadline = None;
            self.start_job(sink);
        }
        self.reap_retired();
    }

    /// Block up to `timeout` for one job to report back and handle it. Does not start new jobs.
    ///
    /// Returns `false` on timeout.
    pub fn wait_for_outcome(&mut self, timeout: Duration, sink: &mut dyn PresentSink) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.finish(msg, sink);
                true
            }
            Err(_) => false,
        }
    }

    fn start_job(&mut self, sink: &mut dyn PresentSink) {
        let (Some(source), Some(params)) = (self.source.clone(), self.params) else {
            return;
        };

        if let Some(prev) = self.in_flight.take() {
            tracing::debug!(job = prev.id.0, "cancelling superseded job");
            prev.cancel.cancel();
            self.retired.push(prev);
        }

        let id = JobId(self.next_id);
        self.next_id += 1;
        let job = RenderJob::new(id, source, params, self.output);
        let cancel = job.cancel_token().clone();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("kaleido-render-{}", id.0))
            .spawn(move || {
                let outcome = job.run(backend.as_ref());
                // The scheduler may already be gone; nothing to report to then.
                let _ = tx.send(Finished { id, outcome });
            });

        match spawned {
            Ok(handle) => {
                self.stats.started += 1;
                tracing::debug!(job = id.0, mode = %params.mode(), "job started");
                self.in_flight = Some(InFlight { id, cancel, handle });
            }
            Err(e) => {
                let err = KaleidoError::Other(
                    anyhow::Error::new(e).context("failed to spawn render worker"),
                );
                tracing::warn!(job = id.0, error = %err, "job failed");
                self.stats.failed += 1;
                sink.failed(id, &err);
            }
        }
    }

    fn finish(&mut self, msg: Finished, sink: &mut dyn PresentSink) {
        let Finished { id, outcome } = msg;

        if self.in_flight.as_ref().is_some_and(|j| j.id == id) {
            if let Some(job) = self.in_flight.take() {
                let _ = job.handle.join();
            }
        } else if let Some(pos) = self.retired.iter().position(|j| j.id == id) {
            let _ = self.retired.swap_remove(pos).handle.join();
        }

        // Results arrive in start order except when a superseded job raced past its cancel
        // flag; anything older than what was already delivered is dropped.
        let stale = self.last_delivered.is_some_and(|last| id <= last);

        match outcome {
            JobOutcome::Completed(result) if !stale => {
                tracing::debug!(job = id.0, w = result.width, h = result.height, "job completed");
                self.stats.completed += 1;
                self.last_delivered = Some(id);
                sink.present(id, result);
            }
            JobOutcome::Failed(err) if !stale => {
                tracing::warn!(job = id.0, error = %err, "job failed");
                self.stats.failed += 1;
                self.last_delivered = Some(id);
                sink.failed(id, &err);
            }
            _ => {
                tracing::debug!(job = id.0, "job cancelled; result discarded");
                self.stats.cancelled += 1;
            }
        }
    }

    fn reap_retired(&mut self) {
        let mut i = 0;
        while i < self.retired.len() {
            if self.retired[i].handle.is_finished() {
                let _ = self.retired.swap_remove(i).handle.join();
            } else {
                i += 1;
            }
        }
    }

    /// Cancel outstanding work and wait up to `shutdown_wait` for worker threads.
    ///
    /// Outcomes still in flight are discarded. Returns `false` if some worker was still running
    /// when the wait expired; it is detached and its result dropped.
    pub fn shutdown(mut self) -> bool {
        self.deadline = None;
        let mut jobs: Vec<InFlight> = self.retired.drain(..).collect();
        jobs.extend(self.in_flight.take());
        for j in &jobs {
            j.cancel.cancel();
        }

        let until = Instant::now() + self.opts.shutdown_wait;
        while jobs.iter().any(|j| !j.handle.is_finished()) && Instant::now() < until {
            std::thread::sleep(Duration::from_millis(2));
        }

        let mut all_joined = true;
        for j in jobs {
            if j.handle.is_finished() {
                let _ = j.handle.join();
            } else {
                tracing::warn!(job = j.id.0, "render worker still running at shutdown");
                all_joined = false;
            }
        }
        all_joined
    }
}

impl<B: RenderBackend + 'static> Drop for RenderScheduler<B> {
    fn drop(&mut self) {
        if let Some(j) = &self.in_flight {
            j.cancel.cancel();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;

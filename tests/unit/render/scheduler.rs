use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

use crate::foundation::error::KaleidoResult;
use crate::params::model::Mode;

const WAIT: Duration = Duration::from_secs(10);

#[derive(Default)]
struct RecordingSink {
    presented: Vec<(JobId, RenderResult)>,
    failures: Vec<JobId>,
}

impl PresentSink for RecordingSink {
    fn present(&mut self, job: JobId, result: RenderResult) {
        self.presented.push((job, result));
    }

    fn failed(&mut self, job: JobId, _error: &KaleidoError) {
        self.failures.push(job);
    }
}

fn tiny(source: &SourceImage) -> RenderResult {
    RenderResult {
        width: 1,
        height: 1,
        layout: source.layout(),
        data: vec![0; source.channels()],
    }
}

#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl RenderBackend for Counting {
    fn render(
        &self,
        source: &SourceImage,
        _params: &EffectParameters,
        _output: Option<OutputSpec>,
    ) -> KaleidoResult<RenderResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(tiny(source))
    }
}

#[derive(Default)]
struct FailFirst {
    calls: AtomicUsize,
}

impl RenderBackend for FailFirst {
    fn render(
        &self,
        source: &SourceImage,
        _params: &EffectParameters,
        _output: Option<OutputSpec>,
    ) -> KaleidoResult<RenderResult> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(KaleidoError::compute("first render fails"));
        }
        Ok(tiny(source))
    }
}

#[derive(Default)]
struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
    entered: AtomicUsize,
    finished: AtomicUsize,
}

impl Gate {
    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn wait_entered(&self, n: usize) {
        let until = Instant::now() + WAIT;
        while self.entered.load(Ordering::SeqCst) < n {
            assert!(Instant::now() < until, "worker never entered the backend");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Blocks every render until the gate is released.
struct Gated(Arc<Gate>);

impl RenderBackend for Gated {
    fn render(
        &self,
        source: &SourceImage,
        _params: &EffectParameters,
        _output: Option<OutputSpec>,
    ) -> KaleidoResult<RenderResult> {
        self.0.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.0.open.lock().unwrap();
        while !*open {
            open = self.0.cv.wait(open).unwrap();
        }
        drop(open);
        self.0.finished.fetch_add(1, Ordering::SeqCst);
        Ok(tiny(source))
    }
}

fn source() -> Arc<SourceImage> {
    Arc::new(SourceImage::new(4, 4, 3, (0..48).collect()).unwrap())
}

fn params(segments: u32) -> EffectParameters {
    let mut p = EffectParameters::defaults(Mode::Radial);
    p.geometry = crate::params::model::Geometry::Radial {
        num_segments: segments,
    };
    p
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn burst_of_changes_coalesces_into_one_render() {
    let t0 = Instant::now();
    let mut s = RenderScheduler::new(Counting::default(), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    s.set_source_at(source(), t0);
    assert_eq!(s.state(), SchedulerState::Idle);

    for i in 0..10u64 {
        let t = t0 + ms(i * 10);
        s.params_changed_at(params(2 + i as u32), t);
        s.poll_at(t, &mut sink);
    }
    let last = t0 + ms(90);

    s.poll_at(last + ms(119), &mut sink);
    assert_eq!(s.state(), SchedulerState::Scheduled);
    assert_eq!(s.stats().started, 0);

    s.poll_at(last + ms(120), &mut sink);
    assert_eq!(s.stats().started, 1);
    assert!(s.wait_for_outcome(WAIT, &mut sink));

    assert_eq!(s.backend().calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.presented.len(), 1);
    assert_eq!(s.state(), SchedulerState::Idle);
    let stats = s.stats();
    assert_eq!(stats.changes, 10);
    assert_eq!(stats.completed, 1);
}

#[test]
fn superseded_job_is_cancelled_without_blocking_the_next() {
    let gate = Arc::new(Gate::default());
    let mut s = RenderScheduler::new(Gated(Arc::clone(&gate)), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();

    s.set_source_at(source(), t0);
    s.params_changed_at(params(4), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    assert_eq!(s.current_job(), Some(JobId(1)));
    gate.wait_entered(1);

    let t1 = t0 + ms(500);
    s.params_changed_at(params(6), t1);
    s.poll_at(t1 + ms(120), &mut sink);
    assert_eq!(s.current_job(), Some(JobId(2)));
    // Job 2 reaches the backend while job 1 is still blocked in it.
    gate.wait_entered(2);
    assert_eq!(gate.finished.load(Ordering::SeqCst), 0);

    gate.release();
    assert!(s.wait_for_outcome(WAIT, &mut sink));
    assert!(s.wait_for_outcome(WAIT, &mut sink));

    let delivered: Vec<JobId> = sink.presented.iter().map(|(id, _)| *id).collect();
    assert_eq!(delivered, vec![JobId(2)]);
    assert_eq!(gate.finished.load(Ordering::SeqCst), 2);
    assert_eq!(s.stats().cancelled, 1);
    assert_eq!(s.stats().completed, 1);
    assert_eq!(s.state(), SchedulerState::Idle);
}

#[test]
fn failure_is_delivered_once_and_scheduler_recovers() {
    let mut s = RenderScheduler::new(FailFirst::default(), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();

    s.set_source_at(source(), t0);
    s.params_changed_at(params(3), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    assert!(s.wait_for_outcome(WAIT, &mut sink));
    assert_eq!(sink.failures, vec![JobId(1)]);
    assert!(sink.presented.is_empty());

    let t1 = t0 + ms(300);
    s.params_changed_at(params(5), t1);
    s.poll_at(t1 + ms(120), &mut sink);
    assert!(s.wait_for_outcome(WAIT, &mut sink));
    assert_eq!(sink.failures, vec![JobId(1)]);
    assert_eq!(sink.presented.len(), 1);
    assert_eq!(sink.presented[0].0, JobId(2));
    assert_eq!(s.stats().failed, 1);
}

#[test]
fn changes_without_source_schedule_nothing() {
    let mut s = RenderScheduler::new(Counting::default(), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.params_changed_at(params(8), t0);
    assert_eq!(s.state(), SchedulerState::Idle);
    s.poll_at(t0 + ms(1000), &mut sink);
    assert_eq!(s.stats().started, 0);

    // The remembered parameters render as soon as a source arrives.
    let t1 = t0 + ms(2000);
    s.set_source_at(source(), t1);
    assert_eq!(s.next_deadline(), Some(t1 + ms(120)));
}

#[test]
fn output_resize_reschedules_only_on_change() {
    let mut s = RenderScheduler::new(Counting::default(), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.set_source_at(source(), t0);
    s.params_changed_at(params(8), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    assert!(s.wait_for_outcome(WAIT, &mut sink));

    let out = OutputSpec::new(9, 7).unwrap();
    let t1 = t0 + ms(400);
    s.set_output_at(Some(out), t1);
    assert_eq!(s.state(), SchedulerState::Scheduled);
    s.poll_at(t1 + ms(120), &mut sink);
    assert!(s.wait_for_outcome(WAIT, &mut sink));
    assert_eq!(s.stats().started, 2);

    s.set_output_at(Some(out), t1 + ms(500));
    assert_eq!(s.state(), SchedulerState::Idle);
}

#[test]
fn debounce_is_configurable() {
    let opts = SchedulerOpts {
        debounce: ms(5),
        ..SchedulerOpts::default()
    };
    let mut s = RenderScheduler::new(Counting::default(), opts);
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.set_source_at(source(), t0);
    s.params_changed_at(params(8), t0);
    s.poll_at(t0 + ms(5), &mut sink);
    assert_eq!(s.stats().started, 1);
    assert!(s.wait_for_outcome(WAIT, &mut sink));
}

#[test]
fn default_scheduler_renders_with_the_engine() {
    let mut s: RenderScheduler = RenderScheduler::default();
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.set_source_at(source(), t0);
    s.set_output_at(Some(OutputSpec::new(16, 12).unwrap()), t0);
    s.params_changed_at(params(6), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    assert!(s.wait_for_outcome(WAIT, &mut sink));
    let (_, r) = &sink.presented[0];
    assert_eq!((r.width, r.height, r.channels()), (16, 12, 3));
}

#[test]
fn shutdown_reports_stuck_workers() {
    let gate = Arc::new(Gate::default());
    let opts = SchedulerOpts {
        shutdown_wait: ms(20),
        ..SchedulerOpts::default()
    };
    let mut s = RenderScheduler::new(Gated(Arc::clone(&gate)), opts);
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.set_source_at(source(), t0);
    s.params_changed_at(params(8), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    gate.wait_entered(1);

    assert!(!s.shutdown());
    gate.release();
}

#[test]
fn shutdown_joins_finished_workers() {
    let mut s = RenderScheduler::new(Counting::default(), SchedulerOpts::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    s.set_source_at(source(), t0);
    s.params_changed_at(params(8), t0);
    s.poll_at(t0 + ms(120), &mut sink);
    assert!(s.shutdown());
}

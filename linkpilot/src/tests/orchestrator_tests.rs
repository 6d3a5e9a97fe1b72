use super::fakes::*;
use super::init_tracing;
use crate::{
    Action, AttemptResult, AutomationError, Clock, DownloadOrchestrator, FailSafe, FailureSink,
    LinkOutcome, ManualClock, MemoryFailureSink, SignalKind, StaticLinkSource,
};
use std::time::Duration;

#[test]
fn success_and_save_on_first_tick() {
    init_tracing();
    let config = test_config(5);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(&clock, &config, vec![success_then_save(0.0, 0.0)]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator
        .process_link("https://tidal.com/browse/track/1")
        .unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Succeeded);
    assert_eq!(task.attempts_used(), 1);
    assert_eq!(task.history(), &[AttemptResult::SuccessSaved]);
    assert_eq!(
        desk.calls(),
        vec![
            Call::Submit("https://tidal.com/browse/track/1".to_string()),
            Call::Invoke(Action::Download),
            Call::Invoke(Action::Save),
        ]
    );
    assert!(sink.records().is_empty());
    // Only the post-save settle delay.
    assert_eq!(clock.total_slept(), config.settle_delay());
}

#[test]
fn retries_after_error_signals_without_retyping() {
    init_tracing();
    let config = test_config(5);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(
        &clock,
        &config,
        vec![error_at(1.0), error_at(1.0), success_then_save(2.0, 3.0)],
    );
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("link-1").unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Succeeded);
    assert_eq!(task.attempts_used(), 3);
    assert_eq!(
        task.history(),
        &[
            AttemptResult::ErrorSignal,
            AttemptResult::ErrorSignal,
            AttemptResult::SuccessSaved
        ]
    );
    assert_eq!(desk.invocations(Action::Download), 3);
    assert_eq!(desk.invocations(Action::Save), 1);
    assert_eq!(desk.submits(), vec!["link-1".to_string()]);
    assert!(sink.records().is_empty());
}

#[test]
fn persistent_timeouts_exhaust_attempts_and_record_once() {
    init_tracing();
    let config = test_config(3);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(&clock, &config, vec![silent(), silent(), silent()]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("lost-link").unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Failed);
    assert_eq!(task.attempts_used(), 3);
    assert!(task.history().iter().all(|r| *r == AttemptResult::TimedOut));
    assert_eq!(sink.records(), vec!["lost-link".to_string()]);
    assert_eq!(desk.invocations(Action::Download), 3);
    assert_eq!(desk.invocations(Action::Save), 0);
    // Three full signal timeouts plus a backoff between attempts, none after the last.
    assert_eq!(
        clock.total_slept(),
        config.signal_timeout() * 3 + config.retry_backoff() * 2
    );
}

#[test]
fn success_without_save_readiness_times_out_and_retries() {
    init_tracing();
    let config = test_config(5);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(
        &clock,
        &config,
        vec![success_at(0.0), success_then_save(0.5, 1.0)],
    );
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("slow-save").unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Succeeded);
    assert_eq!(task.attempts_used(), 2);
    assert_eq!(
        task.history(),
        &[AttemptResult::SuccessUnsaved, AttemptResult::SuccessSaved]
    );
    assert!(task.history()[0].is_timeout());
    assert_eq!(desk.invocations(Action::Download), 2);
    assert_eq!(desk.invocations(Action::Save), 1);
}

#[test]
fn success_without_save_on_last_attempt_fails_without_saving() {
    init_tracing();
    let config = test_config(1);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(&clock, &config, vec![success_at(0.0)]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("never-saved").unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Failed);
    assert_eq!(task.attempts_used(), 1);
    assert_eq!(desk.invocations(Action::Save), 0);
    assert_eq!(sink.records(), vec!["never-saved".to_string()]);
}

#[test]
fn save_wait_only_gets_what_is_left_of_the_attempt_budget() {
    init_tracing();
    let config = test_config(1);
    let clock = ManualClock::new();
    // Success shows up one second before the budget ends, save one second after.
    let desk = FakeDesk::new(&clock, &config, vec![success_then_save(299.0, 301.0)]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("late-save").unwrap();

    assert_eq!(task.history(), &[AttemptResult::SuccessUnsaved]);
    assert_eq!(task.outcome(), LinkOutcome::Failed);
    assert_eq!(desk.invocations(Action::Save), 0);
    assert_eq!(clock.now(), config.signal_timeout());
}

#[test]
fn success_latches_and_later_error_is_ignored() {
    init_tracing();
    let config = test_config(5);
    let clock = ManualClock::new();
    let timeline = vec![
        (secs(1.0), Effect::Light(SignalKind::Success)),
        (secs(2.0), Effect::Dim(SignalKind::Success)),
        (secs(2.0), Effect::Light(SignalKind::Error)),
        (secs(5.0), Effect::Light(SignalKind::SaveReady)),
    ];
    let desk = FakeDesk::new(&clock, &config, vec![timeline]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("flaky-page").unwrap();

    assert_eq!(task.outcome(), LinkOutcome::Succeeded);
    assert_eq!(task.history(), &[AttemptResult::SuccessSaved]);
    assert_eq!(desk.invocations(Action::Download), 1);
    assert_eq!(desk.invocations(Action::Save), 1);
}

#[test]
fn success_wins_a_tick_where_both_signals_match() {
    init_tracing();
    let config = test_config(5);
    let clock = ManualClock::new();
    let timeline = vec![
        (secs(0.0), Effect::Light(SignalKind::Error)),
        (secs(0.0), Effect::Light(SignalKind::Success)),
        (secs(0.0), Effect::Light(SignalKind::SaveReady)),
    ];
    let desk = FakeDesk::new(&clock, &config, vec![timeline]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("both").unwrap();

    assert_eq!(task.history(), &[AttemptResult::SuccessSaved]);
}

#[test]
fn error_seen_before_success_ends_the_attempt() {
    init_tracing();
    let config = test_config(2);
    let clock = ManualClock::new();
    let timeline = vec![
        (secs(0.5), Effect::Light(SignalKind::Error)),
        (secs(1.0), Effect::Light(SignalKind::Success)),
        (secs(1.0), Effect::Light(SignalKind::SaveReady)),
    ];
    let desk = FakeDesk::new(&clock, &config, vec![timeline, success_then_save(0.0, 0.0)]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let task = orchestrator.process_link("error-first").unwrap();

    assert_eq!(
        task.history(),
        &[AttemptResult::ErrorSignal, AttemptResult::SuccessSaved]
    );
    assert_eq!(task.outcome(), LinkOutcome::Succeeded);
}

#[test]
fn run_partitions_links_into_succeeded_and_failed() {
    init_tracing();
    let config = test_config(2);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(
        &clock,
        &config,
        vec![
            success_then_save(0.0, 0.0),
            silent(),
            error_at(3.0),
            success_then_save(1.0, 1.5),
        ],
    );
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);
    let source = StaticLinkSource::new(["a", "b", "c"]);

    let report = orchestrator.run(&source).unwrap();

    let ids = |tasks: &[crate::LinkTask]| {
        tasks
            .iter()
            .map(|t| t.identifier().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(report.total(), 3);
    assert_eq!(ids(&report.succeeded), vec!["a", "c"]);
    assert_eq!(ids(&report.failed), vec!["b"]);
    assert_eq!(report.failed[0].attempts_used(), config.max_attempts);
    assert_eq!(
        report.failed[0].history(),
        &[AttemptResult::TimedOut, AttemptResult::ErrorSignal]
    );
    assert!(report
        .succeeded
        .iter()
        .chain(report.failed.iter())
        .all(|t| t.attempts_used() <= config.max_attempts && t.is_terminal()));
    assert_eq!(sink.records(), vec!["b".to_string()]);
    assert_eq!(desk.submits(), vec!["a", "b", "c"]);
}

#[test]
fn empty_source_aborts_before_touching_the_page() {
    init_tracing();
    let config = test_config(3);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(&clock, &config, vec![]);
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let result = orchestrator.run(&StaticLinkSource::new(["", "   "]));

    assert!(matches!(result, Err(AutomationError::SourceEmpty(_))));
    assert!(desk.calls().is_empty());
    assert!(sink.records().is_empty());
}

#[test]
fn fail_safe_aborts_the_whole_run() {
    init_tracing();
    let config = test_config(3);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(
        &clock,
        &config,
        vec![vec![(secs(2.0), Effect::TripFailSafe)]],
    );
    let sink = MemoryFailureSink::new();
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    let result = orchestrator.run(&StaticLinkSource::new(["a", "b"]));

    assert!(matches!(result, Err(AutomationError::FailSafeTriggered(_))));
    assert_eq!(
        desk.calls(),
        vec![Call::Submit("a".to_string()), Call::Invoke(Action::Download)]
    );
    assert!(sink.records().is_empty());
    assert_eq!(clock.now(), Duration::from_secs(2));
}

/// Trips the fail-safe right after writing, as an operator abort during the
/// last failure-log write would.
struct TrippingSink {
    inner: MemoryFailureSink,
    failsafe: FailSafe,
}

impl FailureSink for TrippingSink {
    fn record(&self, identifier: &str) -> Result<(), AutomationError> {
        self.inner.record(identifier)?;
        self.failsafe.trip();
        Ok(())
    }
}

#[test]
fn abort_after_the_last_link_stays_visible_on_the_fail_safe() {
    init_tracing();
    let config = test_config(1);
    let clock = ManualClock::new();
    let desk = FakeDesk::new(&clock, &config, vec![silent()]);
    let sink = TrippingSink {
        inner: MemoryFailureSink::new(),
        failsafe: desk.failsafe().clone(),
    };
    let orchestrator = DownloadOrchestrator::new(&config, &desk, &desk, &sink, &clock);

    // Nothing samples or clicks after the final write, so the run itself completes.
    let report = orchestrator.run(&StaticLinkSource::new(["a"])).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(sink.inner.records(), vec!["a".to_string()]);

    // The caller has to check the flag once the run returns.
    assert!(matches!(
        desk.failsafe().check(),
        Err(AutomationError::FailSafeTriggered(_))
    ));
}

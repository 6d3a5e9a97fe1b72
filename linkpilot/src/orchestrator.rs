//! Per-link retry state machine.
//!
//! ```text
//! Idle -> Submitted -> AwaitingSignal -> AwaitingSave -> Succeeded
//!                          ^    |              |
//!                          |    | error/timeout| save never ready
//!                          +----+--------------+ (next attempt)
//!                                    \-> Failed once attempts run out
//! ```
//!
//! The link text is entered once; retries only click "download" again.
//! Once the success signal is seen within an attempt it latches: the error
//! signal is no longer consulted and only save-readiness is awaited until the
//! attempt's time budget runs out.

use crate::actuator::UIActuator;
use crate::clock::Clock;
use crate::config::PilotConfig;
use crate::errors::AutomationError;
use crate::signal::{PollOutcome, SignalDetector};
use crate::sink::FailureSink;
use crate::source::LinkSource;
use crate::types::{Action, Attempt, AttemptResult, LinkTask, RunReport, SignalKind, SignalPoint};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Where a link currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Submitted,
    AwaitingSignal,
    AwaitingSave,
    Succeeded,
    Failed,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct DownloadOrchestrator<'a> {
    config: &'a PilotConfig,
    actuator: &'a dyn UIActuator,
    detector: &'a dyn SignalDetector,
    sink: &'a dyn FailureSink,
    clock: &'a dyn Clock,
}

impl<'a> DownloadOrchestrator<'a> {
    pub fn new(
        config: &'a PilotConfig,
        actuator: &'a dyn UIActuator,
        detector: &'a dyn SignalDetector,
        sink: &'a dyn FailureSink,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            actuator,
            detector,
            sink,
            clock,
        }
    }

    /// Processes every link from `source`, strictly one after another.
    ///
    /// Source errors abort before any link is touched. A fail-safe abort or a
    /// failure-log write error aborts mid-run; links already recorded stay
    /// recorded.
    pub fn run(&self, source: &dyn LinkSource) -> Result<RunReport, AutomationError> {
        let links = source.list()?;
        let total = links.len();
        info!(total, "starting downloads");

        let mut report = RunReport::default();
        for (position, link) in links.into_iter().enumerate() {
            info!("link {}/{}: {}", position + 1, total, link);
            let task = self.process_link(&link)?;
            report.push(task);
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "all links processed"
        );
        Ok(report)
    }

    /// Drives one link to `Succeeded` or `Failed`.
    #[instrument(level = "info", skip(self), fields(max_attempts = self.config.max_attempts))]
    pub fn process_link(&self, identifier: &str) -> Result<LinkTask, AutomationError> {
        let mut task = LinkTask::new(identifier);
        let mut state = LinkState::Idle;
        let max_attempts = self.config.max_attempts;

        self.enter(&task, &mut state, LinkState::Submitted);
        self.actuator.submit_input(identifier)?;

        while let Some(index) = task.begin_attempt(max_attempts) {
            info!("attempt {}/{}", index, max_attempts);
            let attempt = self.run_attempt(&task, &mut state, index)?;
            task.record(&attempt);

            match attempt.result {
                AttemptResult::SuccessSaved => {
                    task.mark_succeeded();
                    self.enter(&task, &mut state, LinkState::Succeeded);
                    self.clock.sleep(self.config.settle_delay());
                    return Ok(task);
                }
                AttemptResult::ErrorSignal => {
                    warn!(attempt = index, "error signal");
                }
                AttemptResult::TimedOut | AttemptResult::SuccessUnsaved => {
                    warn!(
                        attempt = index,
                        result = ?attempt.result,
                        "no usable signal before timeout"
                    );
                }
            }

            if index < max_attempts {
                debug!(backoff = ?self.config.retry_backoff(), "retrying");
                self.clock.sleep(self.config.retry_backoff());
            }
        }

        task.mark_failed();
        self.enter(&task, &mut state, LinkState::Failed);
        warn!(
            attempts = task.attempts_used(),
            "attempts exhausted, recording failure"
        );
        self.sink.record(task.identifier())?;
        Ok(task)
    }

    fn run_attempt(
        &self,
        task: &LinkTask,
        state: &mut LinkState,
        index: u32,
    ) -> Result<Attempt, AutomationError> {
        let started_at = self.clock.now();

        self.actuator.invoke(Action::Download)?;
        self.enter(task, state, LinkState::AwaitingSignal);

        let checks = [
            self.check(SignalKind::Success),
            self.check(SignalKind::Error),
        ];
        let first = self.detector.poll_until(
            &checks,
            self.config.signal_timeout(),
            self.config.poll_interval(),
            self.clock,
        )?;

        let result = match first {
            PollOutcome::Matched(SignalKind::Success) => {
                info!(attempt = index, "success signal latched");
                self.enter(task, state, LinkState::AwaitingSave);
                self.await_save(started_at)?
            }
            PollOutcome::Matched(SignalKind::Error) => AttemptResult::ErrorSignal,
            PollOutcome::Matched(SignalKind::SaveReady) | PollOutcome::TimedOut => {
                AttemptResult::TimedOut
            }
        };

        Ok(Attempt {
            index,
            started_at,
            result,
        })
    }

    /// Waits for save-readiness within what is left of the attempt's budget.
    fn await_save(&self, attempt_started: Duration) -> Result<AttemptResult, AutomationError> {
        let remaining = self
            .config
            .signal_timeout()
            .saturating_sub(self.clock.elapsed_since(attempt_started));
        let save = [self.check(SignalKind::SaveReady)];

        match self
            .detector
            .poll_until(&save, remaining, self.config.poll_interval(), self.clock)?
        {
            PollOutcome::Matched(_) => {
                self.actuator.invoke(Action::Save)?;
                info!("save clicked");
                Ok(AttemptResult::SuccessSaved)
            }
            PollOutcome::TimedOut => Ok(AttemptResult::SuccessUnsaved),
        }
    }

    fn check(&self, kind: SignalKind) -> (SignalKind, SignalPoint) {
        (kind, self.config.signal(kind))
    }

    fn enter(&self, task: &LinkTask, state: &mut LinkState, to: LinkState) {
        debug!(link = task.identifier(), from = %state, %to, "state change");
        *state = to;
    }
}

//! Pixel signals: sampling a fixed point and waiting for one of several
//! points to show its expected colour.

use crate::clock::Clock;
use crate::errors::AutomationError;
use crate::types::{Rgb, ScreenPoint, SignalKind, SignalPoint};
use std::time::Duration;
use tracing::trace;

/// What a bounded poll observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The first check, in list order, that matched on some tick
    Matched(SignalKind),
    TimedOut,
}

pub trait SignalDetector {
    /// Colour currently displayed at `location`
    fn color_at(&self, location: ScreenPoint) -> Result<Rgb, AutomationError>;

    /// True if the point currently shows its expected colour within tolerance.
    fn sample(&self, point: &SignalPoint) -> Result<bool, AutomationError> {
        let observed = self.color_at(point.location)?;
        Ok(point.matches(&observed))
    }

    /// Evaluates `checks` in order once per `interval` and returns the first
    /// one that matches. Gives up with [`PollOutcome::TimedOut`] once
    /// `timeout` has elapsed; a zero timeout still gets one tick.
    ///
    /// Check order is the tie-break when several signals match on the same
    /// tick. Errors (including a fail-safe abort) are returned immediately.
    fn poll_until(
        &self,
        checks: &[(SignalKind, SignalPoint)],
        timeout: Duration,
        interval: Duration,
        clock: &dyn Clock,
    ) -> Result<PollOutcome, AutomationError> {
        let started = clock.now();
        let mut tick: u64 = 0;
        loop {
            tick += 1;
            for (kind, point) in checks {
                if self.sample(point)? {
                    trace!(%kind, tick, "signal matched");
                    return Ok(PollOutcome::Matched(*kind));
                }
            }

            let elapsed = clock.elapsed_since(started);
            if elapsed >= timeout {
                trace!(tick, ?elapsed, "poll timed out");
                return Ok(PollOutcome::TimedOut);
            }
            clock.sleep(interval.min(timeout - elapsed));
        }
    }
}

//! Common types shared by the detector, the actuator and the orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// An absolute screen coordinate in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An RGB colour, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel match: every channel differs by at most `tolerance`.
    pub fn matches(&self, other: &Rgb, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A fixed screen location whose colour indicates a UI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub location: ScreenPoint,
    pub expected: Rgb,
    pub tolerance: u8,
}

impl SignalPoint {
    pub fn matches(&self, observed: &Rgb) -> bool {
        self.expected.matches(observed, self.tolerance)
    }
}

/// Names of the signals the orchestrator polls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Success,
    Error,
    SaveReady,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Success => "success",
            SignalKind::Error => "error",
            SignalKind::SaveReady => "save_ready",
        };
        f.write_str(name)
    }
}

/// Discrete click targets on the converter page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Download,
    Save,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Download => f.write_str("download"),
            Action::Save => f.write_str("save"),
        }
    }
}

/// Terminal or pending state of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOutcome {
    Pending,
    Succeeded,
    Failed,
}

/// How a single download attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    /// Success latched and the save action was invoked.
    SuccessSaved,
    /// Success latched but save-readiness never appeared within the budget.
    /// Treated as a timeout for retry purposes.
    SuccessUnsaved,
    ErrorSignal,
    TimedOut,
}

impl AttemptResult {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptResult::TimedOut | AttemptResult::SuccessUnsaved)
    }
}

/// One download click and the wait that follows it
#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    /// 1-based
    pub index: u32,
    /// Clock reading when the download action was invoked
    pub started_at: Duration,
    pub result: AttemptResult,
}

/// A link and everything the orchestrator learned while processing it.
///
/// Outcome transitions are one-way: `Pending` becomes `Succeeded` or `Failed`
/// and never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTask {
    identifier: String,
    attempts_used: u32,
    outcome: LinkOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    history: Vec<AttemptResult>,
}

impl LinkTask {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            attempts_used: 0,
            outcome: LinkOutcome::Pending,
            history: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn outcome(&self) -> LinkOutcome {
        self.outcome
    }

    /// Results of every attempt, oldest first
    pub fn history(&self) -> &[AttemptResult] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome != LinkOutcome::Pending
    }

    /// Claims the next attempt index, or `None` when the budget is spent.
    pub(crate) fn begin_attempt(&mut self, max_attempts: u32) -> Option<u32> {
        if self.is_terminal() || self.attempts_used >= max_attempts {
            return None;
        }
        self.attempts_used += 1;
        Some(self.attempts_used)
    }

    pub(crate) fn record(&mut self, attempt: &Attempt) {
        self.history.push(attempt.result);
    }

    pub(crate) fn mark_succeeded(&mut self) {
        debug_assert_eq!(self.outcome, LinkOutcome::Pending);
        if self.outcome == LinkOutcome::Pending {
            self.outcome = LinkOutcome::Succeeded;
        }
    }

    pub(crate) fn mark_failed(&mut self) {
        debug_assert_eq!(self.outcome, LinkOutcome::Pending);
        if self.outcome == LinkOutcome::Pending {
            self.outcome = LinkOutcome::Failed;
        }
    }
}

/// Result of a whole run: every input link ends up in exactly one list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub succeeded: Vec<LinkTask>,
    pub failed: Vec<LinkTask>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub(crate) fn push(&mut self, task: LinkTask) {
        match task.outcome() {
            LinkOutcome::Succeeded => self.succeeded.push(task),
            LinkOutcome::Failed => self.failed.push(task),
            LinkOutcome::Pending => {
                debug_assert!(false, "pending task {} added to report", task.identifier());
            }
        }
    }
}

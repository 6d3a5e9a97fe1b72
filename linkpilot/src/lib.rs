//! Batch downloads through a web converter that has no API.
//!
//! The converter page is driven like a person would drive it: the link is
//! typed into an input box, a download button is clicked, and the outcome is
//! read back by sampling the colour of a few calibrated screen points. The
//! [`DownloadOrchestrator`] owns the retry logic; everything it touches sits
//! behind a small trait so it can run against the real [`desktop::Desktop`]
//! or against scripted fakes.

pub mod actuator;
pub mod clock;
pub mod config;
pub mod desktop;
pub mod errors;
pub mod failsafe;
pub mod keymap;
pub mod orchestrator;
pub mod probe;
pub mod signal;
pub mod sink;
pub mod source;
#[cfg(test)]
mod tests;
pub mod types;

pub use actuator::UIActuator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PilotConfig, SignalSpec, SignalSpecs};
pub use errors::AutomationError;
pub use failsafe::{FailSafe, KillSwitch};
pub use orchestrator::{DownloadOrchestrator, LinkState};
pub use probe::{probe, ProbeReading};
pub use signal::{PollOutcome, SignalDetector};
pub use sink::{FailureSink, FileFailureSink, MemoryFailureSink};
pub use source::{CsvLinkSource, LinkSource, StaticLinkSource};
pub use types::{
    Action, Attempt, AttemptResult, LinkOutcome, LinkTask, Rgb, RunReport, ScreenPoint,
    SignalKind, SignalPoint,
};

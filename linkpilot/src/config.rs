//! Calibration and timing configuration.
//!
//! The values come from a one-time calibration step and stay fixed for the
//! whole run. They are loaded from a JSON file and passed explicitly to the
//! orchestrator and the desktop backends.

use crate::errors::AutomationError;
use crate::types::{Rgb, ScreenPoint, SignalKind, SignalPoint};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_COLOR_TOLERANCE: u8 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_SIGNAL_TIMEOUT_SECS: f64 = 300.0;
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.5;

/// A calibrated signal location as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
    /// Falls back to the global `color_tolerance` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSpecs {
    pub success: SignalSpec,
    pub error: SignalSpec,
    /// The save-ready indicator; its location is also where "save" is clicked
    pub save: SignalSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotConfig {
    pub input_box: ScreenPoint,
    pub download_button: ScreenPoint,
    pub signals: SignalSpecs,

    #[serde(default = "default_color_tolerance")]
    pub color_tolerance: u8,

    /// Download clicks allowed per link before it is marked failed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Time budget of one attempt, covering both the signal wait and the save wait
    #[serde(default = "default_signal_timeout_secs")]
    pub signal_timeout_secs: f64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,

    /// Pause between a failed attempt and the next download click
    #[serde(default = "default_one_second")]
    pub retry_backoff_secs: f64,

    /// Pause after a successful save so the browser can finish writing the file
    #[serde(default = "default_one_second")]
    pub settle_delay_secs: f64,

    /// Delay between typed characters
    #[serde(default = "default_typing_interval_secs")]
    pub typing_interval_secs: f64,

    /// Pause after every synthetic input action
    #[serde(default = "default_action_pause_secs")]
    pub action_pause_secs: f64,

    /// Paste the link from the clipboard instead of typing it
    #[serde(default)]
    pub paste_input: bool,

    /// Distance in pixels from a screen corner that trips the fail-safe
    #[serde(default)]
    pub failsafe_margin: u32,
}

fn default_color_tolerance() -> u8 {
    DEFAULT_COLOR_TOLERANCE
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_signal_timeout_secs() -> f64 {
    DEFAULT_SIGNAL_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> f64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_one_second() -> f64 {
    1.0
}

fn default_typing_interval_secs() -> f64 {
    0.05
}

fn default_action_pause_secs() -> f64 {
    0.5
}

impl PilotConfig {
    /// Builds a config with default timings around the given calibration.
    pub fn new(input_box: ScreenPoint, download_button: ScreenPoint, signals: SignalSpecs) -> Self {
        Self {
            input_box,
            download_button,
            signals,
            color_tolerance: DEFAULT_COLOR_TOLERANCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            signal_timeout_secs: DEFAULT_SIGNAL_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            retry_backoff_secs: default_one_second(),
            settle_delay_secs: default_one_second(),
            typing_interval_secs: default_typing_interval_secs(),
            action_pause_secs: default_action_pause_secs(),
            paste_input: false,
            failsafe_margin: 0,
        }
    }

    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AutomationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AutomationError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AutomationError> {
        let config: PilotConfig = serde_json::from_str(raw)
            .map_err(|e| AutomationError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AutomationError> {
        if self.max_attempts == 0 {
            return Err(AutomationError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("signal_timeout_secs", self.signal_timeout_secs),
            ("poll_interval_secs", self.poll_interval_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AutomationError::InvalidConfig(format!(
                    "{name} must be a positive number of seconds, got {value}"
                )));
            }
            check_representable(name, value)?;
        }
        for (name, value) in [
            ("retry_backoff_secs", self.retry_backoff_secs),
            ("settle_delay_secs", self.settle_delay_secs),
            ("typing_interval_secs", self.typing_interval_secs),
            ("action_pause_secs", self.action_pause_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AutomationError::InvalidConfig(format!(
                    "{name} must be zero or a positive number of seconds, got {value}"
                )));
            }
            check_representable(name, value)?;
        }

        let success = self.signal(SignalKind::Success);
        let error = self.signal(SignalKind::Error);
        if success.location == error.location && colour_windows_overlap(&success, &error) {
            return Err(AutomationError::InvalidConfig(format!(
                "success ({}) and error ({}) signals share {} with overlapping tolerances; \
                 a single sample could match both",
                success.expected, error.expected, success.location
            )));
        }
        Ok(())
    }

    /// Resolved signal point, with the global tolerance applied where needed
    pub fn signal(&self, kind: SignalKind) -> SignalPoint {
        let spec = match kind {
            SignalKind::Success => &self.signals.success,
            SignalKind::Error => &self.signals.error,
            SignalKind::SaveReady => &self.signals.save,
        };
        SignalPoint {
            location: ScreenPoint::new(spec.x, spec.y),
            expected: spec.color,
            tolerance: spec.tolerance.unwrap_or(self.color_tolerance),
        }
    }

    pub fn save_button(&self) -> ScreenPoint {
        ScreenPoint::new(self.signals.save.x, self.signals.save.y)
    }

    pub fn signal_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.signal_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_delay_secs)
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_secs_f64(self.typing_interval_secs)
    }

    pub fn action_pause(&self) -> Duration {
        Duration::from_secs_f64(self.action_pause_secs)
    }
}

/// The duration accessors convert with `Duration::from_secs_f64`, which panics
/// on values that do not fit.
fn check_representable(name: &str, value: f64) -> Result<(), AutomationError> {
    Duration::try_from_secs_f64(value).map_err(|e| {
        AutomationError::InvalidConfig(format!("{name} is out of range ({value}): {e}"))
    })?;
    Ok(())
}

/// Whether some colour lies within both points' tolerance windows.
fn colour_windows_overlap(a: &SignalPoint, b: &SignalPoint) -> bool {
    let reach = u16::from(a.tolerance) + u16::from(b.tolerance);
    let close = |x: u8, y: u8| u16::from(x.abs_diff(y)) <= reach;
    close(a.expected.r, b.expected.r)
        && close(a.expected.g, b.expected.g)
        && close(a.expected.b, b.expected.b)
}

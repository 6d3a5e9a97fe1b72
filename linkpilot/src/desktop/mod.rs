//! Real desktop backends: screen capture for signals, synthetic input for
//! actions, and the corner fail-safe shared by both.

mod input;
mod screen;

pub use input::DesktopActuator;
pub use screen::ScreenDetector;

use crate::config::PilotConfig;
use crate::errors::AutomationError;
use crate::failsafe::{FailSafe, KillSwitch};
use tracing::instrument;

/// The live desktop, wired to one calibration
pub struct Desktop {
    failsafe: FailSafe,
    detector: ScreenDetector,
    actuator: DesktopActuator,
    kill_switch: Option<KillSwitch>,
}

impl Desktop {
    /// With `arm_failsafe`, starts the pointer listener that aborts the run
    /// when the pointer reaches a screen corner.
    #[instrument(skip(config))]
    pub fn new(config: &PilotConfig, arm_failsafe: bool) -> Result<Self, AutomationError> {
        let failsafe = FailSafe::new();
        let kill_switch = if arm_failsafe {
            Some(KillSwitch::arm(failsafe.clone(), config.failsafe_margin)?)
        } else {
            None
        };
        Ok(Self {
            detector: ScreenDetector::new(failsafe.clone()),
            actuator: DesktopActuator::new(config, failsafe.clone()),
            failsafe,
            kill_switch,
        })
    }

    pub fn detector(&self) -> &ScreenDetector {
        &self.detector
    }

    pub fn actuator(&self) -> &DesktopActuator {
        &self.actuator
    }

    pub fn failsafe(&self) -> &FailSafe {
        &self.failsafe
    }

    pub fn is_armed(&self) -> bool {
        self.kill_switch.is_some()
    }
}

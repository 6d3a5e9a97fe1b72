//! Operator abort: throw the pointer into a screen corner to stop the run.

use crate::errors::AutomationError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Shared abort flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct FailSafe {
    tripped: Arc<AtomicBool>,
}

impl FailSafe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            warn!("fail-safe tripped, aborting at the next input or sample");
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Call before every synthetic input or screen sample.
    pub fn check(&self) -> Result<(), AutomationError> {
        if self.is_tripped() {
            return Err(AutomationError::FailSafeTriggered(
                "pointer moved to a screen corner".to_string(),
            ));
        }
        Ok(())
    }
}

/// True when `(x, y)` lies within `margin` pixels of a corner of a
/// `width` x `height` screen.
pub fn in_corner(x: f64, y: f64, width: f64, height: f64, margin: f64) -> bool {
    let near_left = x <= margin;
    let near_top = y <= margin;
    let near_right = x >= width - 1.0 - margin;
    let near_bottom = y >= height - 1.0 - margin;
    (near_left || near_right) && (near_top || near_bottom)
}

/// Background pointer listener that trips a [`FailSafe`].
///
/// The listener thread lives for the rest of the process; `disarm` only
/// makes it ignore further events.
pub struct KillSwitch {
    armed: Arc<AtomicBool>,
}

impl KillSwitch {
    pub fn arm(failsafe: FailSafe, margin: u32) -> Result<Self, AutomationError> {
        let (width, height) = rdev::display_size().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to read display size: {e:?}"))
        })?;
        let (width, height) = (width as f64, height as f64);
        let margin = f64::from(margin);

        let armed = Arc::new(AtomicBool::new(true));
        let armed_thread = Arc::clone(&armed);
        thread::Builder::new()
            .name("linkpilot-killswitch".to_string())
            .spawn(move || {
                let callback = move |event: rdev::Event| {
                    if !armed_thread.load(Ordering::SeqCst) {
                        return;
                    }
                    if let rdev::EventType::MouseMove { x, y } = event.event_type {
                        if in_corner(x, y, width, height, margin) {
                            failsafe.trip();
                        }
                    }
                };
                // On macOS this needs the Accessibility permission.
                if let Err(e) = rdev::listen(callback) {
                    error!("fail-safe listener stopped: {:?}", e);
                }
            })?;

        info!(width, height, margin, "kill switch armed; move the pointer to a corner to abort");
        Ok(Self { armed })
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl Drop for KillSwitch {
    fn drop(&mut self) {
        self.disarm();
    }
}

use crate::errors::AutomationError;
use crate::types::Action;

/// Drives the converter page.
///
/// Both operations are fire-and-forget: their effect is only visible later
/// through a [`crate::signal::SignalDetector`]. A missing or unfocused target
/// window is not detected here. The only error an implementation is
/// expected to raise mid-run is a fail-safe abort.
pub trait UIActuator {
    /// Clears the input field and enters `text`, paced so the page keeps up.
    fn submit_input(&self, text: &str) -> Result<(), AutomationError>;

    /// Activates one named control once.
    fn invoke(&self, action: Action) -> Result<(), AutomationError>;
}

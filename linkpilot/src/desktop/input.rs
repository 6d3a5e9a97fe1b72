use crate::actuator::UIActuator;
use crate::config::PilotConfig;
use crate::errors::AutomationError;
use crate::failsafe::FailSafe;
use crate::keymap::{self, Keystroke};
use crate::types::{Action, ScreenPoint};
use rdev::{Button, EventType, Key};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Gap between low-level events so the OS registers each of them
const EVENT_GAP: Duration = Duration::from_millis(20);

#[cfg(target_os = "macos")]
const SHORTCUT_MODIFIER: Key = Key::MetaLeft;
#[cfg(not(target_os = "macos"))]
const SHORTCUT_MODIFIER: Key = Key::ControlLeft;

/// Clicks and types through OS-level synthetic input events.
#[derive(Debug, Clone)]
pub struct DesktopActuator {
    input_box: ScreenPoint,
    download_button: ScreenPoint,
    save_button: ScreenPoint,
    typing_interval: Duration,
    action_pause: Duration,
    paste_input: bool,
    failsafe: FailSafe,
}

impl DesktopActuator {
    pub fn new(config: &PilotConfig, failsafe: FailSafe) -> Self {
        Self {
            input_box: config.input_box,
            download_button: config.download_button,
            save_button: config.save_button(),
            typing_interval: config.typing_interval(),
            action_pause: config.action_pause(),
            paste_input: config.paste_input,
            failsafe,
        }
    }

    fn send(&self, event: &EventType) -> Result<(), AutomationError> {
        self.failsafe.check()?;
        self.send_unchecked(event)
    }

    fn send_unchecked(&self, event: &EventType) -> Result<(), AutomationError> {
        rdev::simulate(event).map_err(|_| {
            AutomationError::PlatformError(format!("Failed to simulate {event:?}"))
        })?;
        thread::sleep(EVENT_GAP);
        Ok(())
    }

    fn click(&self, at: ScreenPoint) -> Result<(), AutomationError> {
        self.send(&EventType::MouseMove {
            x: f64::from(at.x),
            y: f64::from(at.y),
        })?;
        self.send(&EventType::ButtonPress(Button::Left))?;
        self.send(&EventType::ButtonRelease(Button::Left))
    }

    fn tap(&self, key: Key) -> Result<(), AutomationError> {
        self.send(&EventType::KeyPress(key))?;
        self.send(&EventType::KeyRelease(key))
    }

    fn chord(&self, modifier: Key, key: Key) -> Result<(), AutomationError> {
        self.send(&EventType::KeyPress(modifier))?;
        let pressed = self.tap(key);
        // Modifier release ignores the fail-safe.
        let released = self.send_unchecked(&EventType::KeyRelease(modifier));
        pressed.and(released)
    }

    fn type_stroke(&self, stroke: Keystroke) -> Result<(), AutomationError> {
        if stroke.shift {
            self.chord(Key::ShiftLeft, stroke.key)
        } else {
            self.tap(stroke.key)
        }
    }

    fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        for c in text.chars() {
            let stroke = keymap::keystroke_for(c).ok_or_else(|| {
                AutomationError::InvalidArgument(format!("no key for character {c:?}"))
            })?;
            self.type_stroke(stroke)?;
            thread::sleep(self.typing_interval);
        }
        Ok(())
    }

    fn paste_text(&self, text: &str) -> Result<(), AutomationError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to open clipboard: {e}"))
        })?;
        clipboard.set_text(text).map_err(|e| {
            AutomationError::PlatformError(format!("Failed to set clipboard text: {e}"))
        })?;
        self.chord(SHORTCUT_MODIFIER, Key::KeyV)
    }
}

impl UIActuator for DesktopActuator {
    fn submit_input(&self, text: &str) -> Result<(), AutomationError> {
        self.click(self.input_box)?;
        self.chord(SHORTCUT_MODIFIER, Key::KeyA)?;
        self.tap(Key::Backspace)?;

        if self.paste_input || !keymap::is_typeable(text) {
            debug!(chars = text.chars().count(), "pasting link");
            self.paste_text(text)?;
        } else {
            debug!(chars = text.chars().count(), "typing link");
            self.type_text(text)?;
        }
        thread::sleep(self.action_pause);
        Ok(())
    }

    fn invoke(&self, action: Action) -> Result<(), AutomationError> {
        let target = match action {
            Action::Download => self.download_button,
            Action::Save => self.save_button,
        };
        info!(%action, %target, "click");
        self.click(target)?;
        thread::sleep(self.action_pause);
        Ok(())
    }
}

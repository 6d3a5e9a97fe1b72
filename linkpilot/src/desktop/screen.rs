use crate::errors::AutomationError;
use crate::failsafe::FailSafe;
use crate::signal::SignalDetector;
use crate::types::{Rgb, ScreenPoint};
use tracing::trace;

/// Samples pixels from a live capture of the monitor under the point.
#[derive(Debug, Clone)]
pub struct ScreenDetector {
    failsafe: FailSafe,
}

impl ScreenDetector {
    pub fn new(failsafe: FailSafe) -> Self {
        Self { failsafe }
    }
}

impl SignalDetector for ScreenDetector {
    fn color_at(&self, location: ScreenPoint) -> Result<Rgb, AutomationError> {
        self.failsafe.check()?;

        let monitor = xcap::Monitor::from_point(location.x, location.y).map_err(|e| {
            AutomationError::PlatformError(format!("No monitor contains {location}: {e}"))
        })?;
        let mon_x = monitor.x().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to get monitor x: {e}"))
        })?;
        let mon_y = monitor.y().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to get monitor y: {e}"))
        })?;
        let mon_w = monitor.width().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to get monitor width: {e}"))
        })?;

        let image = monitor.capture_image().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to capture screen: {e}"))
        })?;

        // Captures are in physical pixels; coordinates are logical.
        let scale = if mon_w == 0 {
            1.0
        } else {
            f64::from(image.width()) / f64::from(mon_w)
        };
        let px = (f64::from(location.x - mon_x) * scale).round();
        let py = (f64::from(location.y - mon_y) * scale).round();

        let observed = pixel_at(&image, px, py).ok_or_else(|| {
            AutomationError::PlatformError(format!(
                "{location} maps outside the {}x{} capture",
                image.width(),
                image.height()
            ))
        })?;
        trace!(%location, %observed, "sampled pixel");
        Ok(observed)
    }
}

fn pixel_at(image: &image::RgbaImage, x: f64, y: f64) -> Option<Rgb> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let [r, g, b, _] = image.get_pixel_checked(x as u32, y as u32)?.0;
    Some(Rgb::new(r, g, b))
}

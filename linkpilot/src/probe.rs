//! One-shot check of an existing calibration against the live screen.

use crate::config::PilotConfig;
use crate::errors::AutomationError;
use crate::signal::SignalDetector;
use crate::types::{Rgb, ScreenPoint, SignalKind};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReading {
    pub signal: SignalKind,
    pub location: ScreenPoint,
    pub expected: Rgb,
    pub tolerance: u8,
    pub observed: Rgb,
    pub matches: bool,
}

/// Samples every configured signal point once.
pub fn probe(
    detector: &dyn SignalDetector,
    config: &PilotConfig,
) -> Result<Vec<ProbeReading>, AutomationError> {
    let mut readings = Vec::with_capacity(3);
    for kind in [SignalKind::Success, SignalKind::Error, SignalKind::SaveReady] {
        let point = config.signal(kind);
        let observed = detector.color_at(point.location)?;
        let reading = ProbeReading {
            signal: kind,
            location: point.location,
            expected: point.expected,
            tolerance: point.tolerance,
            observed,
            matches: point.matches(&observed),
        };
        info!(
            signal = %kind,
            location = %reading.location,
            expected = %reading.expected,
            observed = %reading.observed,
            matches = reading.matches,
            "probe"
        );
        readings.push(reading);
    }

    let lit = |kind: SignalKind| readings.iter().any(|r| r.signal == kind && r.matches);
    if lit(SignalKind::Success) && lit(SignalKind::Error) {
        warn!("success and error signals both match right now; the calibration is ambiguous");
    }
    Ok(readings)
}

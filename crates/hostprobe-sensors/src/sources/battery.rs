//! Battery charge level.

use starship_battery::units::ratio::percent;
use tracing::debug;

use super::SensorSource;
use crate::error::{Error, Result};
use crate::reading::Value;

/// Supplies the battery charge percentage.
pub trait BatteryProvider {
    /// Returns the charge in percent, or `None` when the host has no battery.
    fn percentage(&self) -> Result<Option<f32>>;
}

/// Battery provider backed by the OS battery API.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBattery;

impl BatteryProvider for SystemBattery {
    fn percentage(&self) -> Result<Option<f32>> {
        let manager =
            starship_battery::Manager::new().map_err(|e| Error::Battery(e.to_string()))?;
        let mut batteries = manager
            .batteries()
            .map_err(|e| Error::Battery(e.to_string()))?;

        match batteries.next() {
            Some(battery) => {
                let battery = battery.map_err(|e| Error::Battery(e.to_string()))?;
                Ok(Some(battery.state_of_charge().get::<percent>()))
            }
            None => Ok(None),
        }
    }
}

/// Battery level source.
///
/// The percentage is rounded to a whole number, so a provider reporting
/// `72.6` reads as `73`.
pub struct BatterySource {
    provider: Box<dyn BatteryProvider>,
}

impl BatterySource {
    /// Creates a source reading the system battery.
    pub fn new() -> Self {
        Self::with_provider(SystemBattery)
    }

    /// Creates a source reading from a custom provider.
    pub fn with_provider(provider: impl BatteryProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }
}

impl Default for BatterySource {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for BatterySource {
    fn measurement(&self) -> &str {
        "battery level"
    }

    fn measure(&self) -> Result<Value> {
        let level = self
            .provider
            .percentage()?
            .ok_or_else(|| Error::Unavailable("battery information not available".to_string()))?;
        debug!("Battery level: {}%", level);
        Ok(Value::Integer(level.round() as i64))
    }
}

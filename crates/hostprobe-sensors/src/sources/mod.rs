//! Measurement sources.
//!
//! Each source wraps one external provider: a temperature utility, the battery
//! API, CPU counters or the microphone.

mod battery;
mod cpu;
mod microphone;
mod temperature;

use std::io::Write;

use tracing::warn;

use crate::error::Result;
use crate::reading::{SensorReading, Value};

pub use battery::{BatteryProvider, BatterySource, SystemBattery};
pub use cpu::{CpuSample, CpuSampler, CpuUsageSource, SystemCpu};
pub use microphone::{AudioCapture, CpalCapture, MicrophoneNoiseSource, SpectrumSink};
pub use temperature::TemperatureSource;

/// Trait for all measurement sources.
pub trait SensorSource {
    /// Returns the name of the measurement, used in diagnostics.
    fn measurement(&self) -> &str;

    /// Performs a fresh measurement against the provider.
    fn measure(&self) -> Result<Value>;

    /// Measures and absorbs any failure.
    ///
    /// A failure writes one `Error retrieving <measurement>: <detail>` line to
    /// `diagnostics` and yields an absent reading.
    fn query(&self, diagnostics: &mut dyn Write) -> SensorReading {
        match self.measure() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(measurement = self.measurement(), error = %e, "Measurement failed");
                let line = format!("Error retrieving {}: {}", self.measurement(), e);
                if let Err(io) = writeln!(diagnostics, "{}", line) {
                    warn!("Failed to write diagnostic: {}", io);
                }
                None
            }
        }
    }
}

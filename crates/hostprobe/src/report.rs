//! One-shot sensor report.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use hostprobe_sensors::{
    BatterySource, CpuUsageSource, MicrophoneNoiseSource, Sensor, SpectrumSink, TemperatureSource,
};
use tracing::debug;

use crate::config::Config;

/// Builds the report's sensors in display order.
///
/// Disabled sensors are left out; the rest keep their relative order.
pub fn build_sensors(
    config: &Config,
    spectrum_sink: Option<Box<dyn SpectrumSink>>,
) -> Vec<Sensor> {
    let mut sensors = Vec::with_capacity(4);

    if config.temperature.enable {
        let source = TemperatureSource::with_command(
            config.temperature.command.clone(),
            config.temperature.args.clone(),
        );
        sensors.push(Sensor::new(source, "CPU Temperature"));
    }

    if config.battery.enable {
        sensors.push(Sensor::new(BatterySource::new(), "Battery Level"));
    }

    if config.cpu.enable {
        let source = CpuUsageSource::with_interval(Duration::from_millis(config.cpu.interval));
        sensors.push(Sensor::new(source, "CPU Usage"));
    }

    if config.microphone.enable {
        let mut source = MicrophoneNoiseSource::new()
            .duration(Duration::from_millis(config.microphone.duration))
            .sample_rate(config.microphone.sample_rate)
            .nfft(config.spectrum.nfft);
        if let Some(sink) = spectrum_sink {
            source = source.with_spectrum_sink(sink);
        }
        sensors.push(Sensor::new(source, "Microphone Noise Level"));
    }

    sensors
}

/// Writes `<label>: <value>` for every sensor that produced a reading.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Queries every sensor once, in order. Returns the number of lines reported.
    pub fn run(&mut self, sensors: &[Sensor]) -> Result<usize> {
        let mut reported = 0;

        for sensor in sensors {
            let started = Instant::now();
            let reading = sensor.query(&mut self.out);
            debug!("{} queried in {:?}", sensor.label(), started.elapsed());

            if let Some(value) = reading {
                writeln!(self.out, "{}: {}", sensor.label(), value)?;
                reported += 1;
            }
        }

        self.out.flush()?;
        Ok(reported)
    }

    /// Returns the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

//! Host Sensors Library
//!
//! Uniform access to a handful of host telemetry providers: an external CPU
//! temperature utility, the OS battery API, CPU usage counters and the default
//! microphone. Every provider is wrapped in a [`SensorSource`] so a report loop
//! can query them interchangeably.

pub mod analysis;
pub mod error;
pub mod reading;
pub mod sensor;
pub mod sources;

pub use analysis::{power_spectral_density, rms, round2, Spectrum};
pub use error::{Error, Result};
pub use reading::{SensorReading, Value};
pub use sensor::Sensor;
pub use sources::{
    AudioCapture, BatteryProvider, BatterySource, CpalCapture, CpuSample, CpuSampler,
    CpuUsageSource, MicrophoneNoiseSource, SensorSource, SpectrumSink, SystemBattery, SystemCpu,
    TemperatureSource,
};

/// Default temperature utility.
pub const DEFAULT_TEMPERATURE_COMMAND: &str = "osx-cpu-temp";

/// Default microphone sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default FFT segment length for the noise spectrum.
pub const DEFAULT_NFFT: usize = 256;

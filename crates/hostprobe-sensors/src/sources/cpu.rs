//! CPU usage sensor.

use std::time::{Duration, Instant};

use sysinfo::System;
use tracing::debug;

use super::SensorSource;
use crate::error::{Error, Result};
use crate::reading::Value;

/// One CPU utilization sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuSample {
    /// Number of logical CPUs reported
    pub cpu_count: usize,
    /// Global usage in percent
    pub usage: f32,
}

/// Samples global CPU utilization.
pub trait CpuSampler {
    /// Blocks for `interval` and returns the usage over that window.
    fn sample(&self, interval: Duration) -> Result<CpuSample>;
}

/// CPU sampler backed by the OS counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCpu;

impl CpuSampler for SystemCpu {
    fn sample(&self, interval: Duration) -> Result<CpuSample> {
        // Usage is a delta between two refreshes, so a fresh System is sampled twice
        let mut system = System::new();
        system.refresh_cpu();
        std::thread::sleep(interval);
        system.refresh_cpu();

        Ok(CpuSample {
            cpu_count: system.cpus().len(),
            usage: system.global_cpu_info().cpu_usage(),
        })
    }
}

/// CPU usage sampled over a blocking interval.
///
/// The reading is text, e.g. `"12.5"`, not a number.
pub struct CpuUsageSource {
    sampler: Box<dyn CpuSampler>,
    interval: Duration,
}

impl CpuUsageSource {
    /// Creates a source sampling over one second.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    /// Creates a source sampling over `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        Self::with_sampler(SystemCpu, interval)
    }

    /// Creates a source reading from a custom sampler.
    pub fn with_sampler(sampler: impl CpuSampler + 'static, interval: Duration) -> Self {
        Self {
            sampler: Box::new(sampler),
            interval: interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    /// Returns the sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn format_usage(usage: f32) -> String {
        format!("{:.1}", usage.clamp(0.0, 100.0))
    }
}

impl Default for CpuUsageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for CpuUsageSource {
    fn measurement(&self) -> &str {
        "CPU usage"
    }

    fn measure(&self) -> Result<Value> {
        let started = Instant::now();
        let sample = self.sampler.sample(self.interval)?;

        if sample.cpu_count == 0 {
            return Err(Error::Cpu("cpu list empty".to_string()));
        }
        if !sample.usage.is_finite() {
            return Err(Error::Cpu(format!("invalid usage value {}", sample.usage)));
        }

        debug!("CPU usage {}% sampled in {:?}", sample.usage, started.elapsed());
        Ok(Value::Text(Self::format_usage(sample.usage)))
    }
}

//! CPU temperature from an external utility.

use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::SensorSource;
use crate::error::{Error, Result};
use crate::reading::Value;
use crate::DEFAULT_TEMPERATURE_COMMAND;

/// ASCII digits only: `\d` would also match other scripts' digits, which `f64`
/// parsing rejects.
fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+\.[0-9]+").expect("valid decimal pattern"))
}

/// Temperature source that runs a utility and parses its output.
#[derive(Debug, Clone)]
pub struct TemperatureSource {
    command: String,
    args: Vec<String>,
}

impl TemperatureSource {
    /// Creates a source running the default utility with no arguments.
    pub fn new() -> Self {
        Self::with_command(DEFAULT_TEMPERATURE_COMMAND, Vec::<String>::new())
    }

    /// Creates a source running `command` with `args`.
    pub fn with_command<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the command that will be run.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Extracts the first ASCII decimal numeral (`[0-9]+\.[0-9]+`) from utility output.
    pub fn parse_output(output: &str) -> Result<f64> {
        let found = decimal_pattern()
            .find(output)
            .ok_or_else(|| Error::Parse(format!("no temperature in output {:?}", output)))?;
        found
            .as_str()
            .parse()
            .map_err(|e| Error::Parse(format!("invalid temperature {:?}: {}", found.as_str(), e)))
    }
}

impl Default for TemperatureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for TemperatureSource {
    fn measurement(&self) -> &str {
        "temperature"
    }

    fn measure(&self) -> Result<Value> {
        debug!("Running {} {:?}", self.command, self.args);
        // Exit status is not checked; only stdout matters
        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .map_err(|source| Error::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let celsius = Self::parse_output(stdout.trim())?;
        debug!("Temperature: {}", celsius);
        Ok(Value::Number(celsius))
    }
}

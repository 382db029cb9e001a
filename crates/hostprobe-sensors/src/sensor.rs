//! Labelled sensor.

use std::io::Write;

use crate::reading::SensorReading;
use crate::sources::SensorSource;

/// A measurement source paired with its display label.
pub struct Sensor {
    source: Box<dyn SensorSource>,
    label: String,
}

impl Sensor {
    /// Creates a new sensor.
    pub fn new(source: impl SensorSource + 'static, label: impl Into<String>) -> Self {
        Self {
            source: Box::new(source),
            label: label.into(),
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Queries the underlying source.
    pub fn query(&self, diagnostics: &mut dyn Write) -> SensorReading {
        self.source.query(diagnostics)
    }
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("label", &self.label)
            .field("measurement", &self.source.measurement())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result, Value};

    struct Fixed(Option<f64>);

    impl SensorSource for Fixed {
        fn measurement(&self) -> &str {
            "fixed value"
        }

        fn measure(&self) -> Result<Value> {
            self.0
                .map(Value::Number)
                .ok_or_else(|| Error::Unavailable("nothing here".to_string()))
        }
    }

    #[test]
    fn test_query_forwards_value() {
        let sensor = Sensor::new(Fixed(Some(2.5)), "Fixed");
        let mut diagnostics = Vec::new();

        assert_eq!(sensor.label(), "Fixed");
        assert_eq!(sensor.query(&mut diagnostics), Some(Value::Number(2.5)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_query_forwards_absence() {
        let sensor = Sensor::new(Fixed(None), "Fixed");
        let mut diagnostics = Vec::new();

        assert_eq!(sensor.query(&mut diagnostics), None);
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Error retrieving fixed value: nothing here\n"
        );
    }
}

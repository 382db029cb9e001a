//! Sensor readings.

use std::fmt;

/// A measured value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Floating point measurement (temperature, RMS amplitude).
    Number(f64),
    /// Whole number measurement (battery percent).
    Integer(i64),
    /// Preformatted measurement (CPU usage).
    Text(String),
}

/// Outcome of one measurement attempt: a value, or `None` when it failed.
pub type SensorReading = Option<Value>;

impl Value {
    /// Returns the text of a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole floats keep a trailing ".0" so 45.0 never reads as an integer
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(45.3).to_string(), "45.3");
        assert_eq!(Value::Number(45.0).to_string(), "45.0");
        assert_eq!(Value::Number(0.0).to_string(), "0.0");
        assert_eq!(Value::Number(123.46).to_string(), "123.46");
        assert_eq!(Value::Integer(73).to_string(), "73");
        assert_eq!(Value::Text("12.5".to_string()).to_string(), "12.5");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Text("4.0".to_string()).as_text(), Some("4.0"));
        assert_eq!(Value::Number(4.0).as_text(), None);
    }
}

use serde::{Deserialize, Serialize};

/// Linear unit conversion `y * factor / divisor`, applied to chart values
/// after aggregation. Since the mean is linear, applying it before or after
/// averaging gives the same result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    #[serde(default = "one")]
    pub factor: f64,
    #[serde(default = "one")]
    pub divisor: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self::identity()
    }
}

impl UnitConversion {
    pub const fn new(factor: f64, divisor: f64) -> Self {
        Self { factor, divisor }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    pub const fn divide_by(divisor: f64) -> Self {
        Self::new(1.0, divisor)
    }

    /// Raw run time units to the charted unit (the runs log a 3600x scale).
    pub const fn per_hour() -> Self {
        Self::divide_by(3600.0)
    }

    /// NIC load logged in bytes per millisecond to Mb/s.
    pub const fn bytes_per_ms_to_mbps() -> Self {
        Self::new(8.0 * 1000.0, 1024.0 * 1024.0)
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.factor / self.divisor
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: UnitConversion) -> Self {
        Self::new(self.factor * next.factor, self.divisor * next.divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_hour_divides() {
        assert_eq!(UnitConversion::per_hour().apply(37800.0), 10.5);
    }

    #[test]
    fn saturation_conversion() {
        let mbps = UnitConversion::bytes_per_ms_to_mbps().apply(1024.0 * 1024.0 / 8000.0);
        assert!((mbps - 1.0).abs() < 1e-12);
    }

    #[test]
    fn composition_matches_sequential_application() {
        let a = UnitConversion::new(8.0, 3.0);
        let b = UnitConversion::divide_by(4.0);
        let value = 123.0;
        assert!((a.then(b).apply(value) - b.apply(a.apply(value))).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_default_to_one() {
        let conv: UnitConversion = serde_json::from_str(r#"{"divisor": 3600.0}"#).unwrap();
        assert_eq!(conv, UnitConversion::per_hour());
    }
}

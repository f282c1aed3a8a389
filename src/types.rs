use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::LoadError;

/// Degree of every calibration polynomial.
pub const DEGREE: usize = 5;

/// Coefficients per curve (constant term included).
pub const COEFFICIENTS: usize = DEGREE + 1;

pub const VOLTAGE_SHEET: &str = "Voltage";
pub const RF_FORWARD_SHEET: &str = "RF Forward";
pub const RF_REVERSE_SHEET: &str = "RF Reverse";

/// One raw-reading -> physical-unit mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    VoltageMain,
    VoltageAmp,
    PowerForward,
    PowerReverse,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::VoltageMain,
        Channel::VoltageAmp,
        Channel::PowerForward,
        Channel::PowerReverse,
    ];

    /// Key under `[calibration]` in the config file.
    pub fn key(&self) -> &'static str {
        match self {
            Channel::VoltageMain => "voltage_main",
            Channel::VoltageAmp => "voltage_amp",
            Channel::PowerForward => "power_forward",
            Channel::PowerReverse => "power_reverse",
        }
    }

    pub fn sheet(&self) -> &'static str {
        match self {
            Channel::VoltageMain | Channel::VoltageAmp => VOLTAGE_SHEET,
            Channel::PowerForward => RF_FORWARD_SHEET,
            Channel::PowerReverse => RF_REVERSE_SHEET,
        }
    }

    /// Column holding the raw sensor reading (x).
    pub fn raw_column(&self) -> &'static str {
        match self {
            Channel::VoltageMain => "Main",
            Channel::VoltageAmp => "Amplifier",
            Channel::PowerForward | Channel::PowerReverse => "Counts (ADC)",
        }
    }

    /// Column holding the reference measurement (y).
    pub fn truth_column(&self) -> &'static str {
        match self {
            Channel::VoltageMain | Channel::VoltageAmp => "Ground Truth",
            Channel::PowerForward | Channel::PowerReverse => "Ground Truth (W)",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Columns of one worksheet, keyed by header text. Empty cells are `None`.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    pub name: String,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl MeasurementTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: HashMap::new(),
        }
    }

    pub fn insert_column(&mut self, header: &str, values: Vec<Option<f64>>) {
        self.columns.insert(header.to_string(), values);
    }

    pub fn column(&self, header: &str) -> Option<&[Option<f64>]> {
        self.columns.get(header).map(Vec::as_slice)
    }

    /// Number of data rows (longest column).
    pub fn rows(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Aligned (x, y) samples for rows where both cells are filled.
    pub fn pairs(&self, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>), LoadError> {
        let missing = |column: &str| LoadError::MissingColumn {
            sheet: self.name.clone(),
            column: column.to_string(),
        };
        let xs = self.column(x).ok_or_else(|| missing(x))?;
        let ys = self.column(y).ok_or_else(|| missing(y))?;

        let mut skipped = 0;
        let (mut out_x, mut out_y) = (Vec::new(), Vec::new());
        for i in 0..xs.len().max(ys.len()) {
            match (xs.get(i).copied().flatten(), ys.get(i).copied().flatten()) {
                (Some(a), Some(b)) => {
                    out_x.push(a);
                    out_y.push(b);
                }
                (None, None) => {}
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!(
                "{}: skipped {} row(s) with only one of '{}' / '{}' filled",
                self.name,
                skipped,
                x,
                y
            );
        }
        Ok((out_x, out_y))
    }
}

/// Degree-5 calibration polynomial, constant term first.
///
/// `coefficients()[i]` multiplies `x^i`. This is the order the sensor service
/// evaluates in, and the reverse of what a least-squares fit hands back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CalibrationCurve([f64; COEFFICIENTS]);

impl CalibrationCurve {
    pub fn from_lowest_first(coefficients: [f64; COEFFICIENTS]) -> Self {
        Self(coefficients)
    }

    pub fn coefficients(&self) -> &[f64; COEFFICIENTS] {
        &self.0
    }

    /// `sum(c[i] * x^i)`, Horner form.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.0.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

impl TryFrom<Vec<f64>> for CalibrationCurve {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let n = values.len();
        let coefficients: [f64; COEFFICIENTS] = values
            .try_into()
            .map_err(|_| format!("expected {} coefficients, found {}", COEFFICIENTS, n))?;
        Ok(Self(coefficients))
    }
}

impl From<CalibrationCurve> for Vec<f64> {
    fn from(curve: CalibrationCurve) -> Self {
        curve.0.to_vec()
    }
}

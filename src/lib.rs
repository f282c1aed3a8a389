pub mod args;
pub mod config;
pub mod error;
pub mod fit;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod workbook;

#[cfg(test)]
mod fit_tests;

pub use config::{ConfigRecord, StaticSettings};
pub use error::{CalError, FitError, LoadError};
pub use pipeline::{calibrate, run, Calibration, RunOptions};
pub use types::{CalibrationCurve, Channel};

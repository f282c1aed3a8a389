use std::path::PathBuf;
use thiserror::Error;

use crate::types::Channel;

/// Failure reading a measurement table out of a workbook.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open workbook {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("failed to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },

    #[error("sheet '{sheet}' not found (available: {available:?})")]
    MissingSheet { sheet: String, available: Vec<String> },

    #[error("sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}', column '{column}', row {row}: '{value}' is not a number")]
    NotNumeric {
        sheet: String,
        column: String,
        row: usize,
        value: String,
    },
}

/// Failure fitting a polynomial to a set of samples.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("x has {x} samples but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("sample {index} is not finite")]
    NonFinite { index: usize },

    #[error("degree {degree} fit needs {required} distinct x values, got {distinct}")]
    Underdetermined {
        degree: usize,
        distinct: usize,
        required: usize,
    },

    #[error("degree {degree} fit is numerically singular")]
    Singular { degree: usize },
}

/// Anything that stops a calibration run.
#[derive(Debug, Error)]
pub enum CalError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("fitting {channel} failed")]
    Fit {
        channel: Channel,
        #[source]
        source: FitError,
    },

    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config")]
    TomlSer(#[from] toml::ser::Error),

    #[error("failed to parse config")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
}

impl CalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CalError::Io {
            path: path.into(),
            source,
        }
    }
}

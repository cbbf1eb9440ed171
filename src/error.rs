//! Error types shared by every stage of the pipeline.
//!
//! Each failure belongs to one [`ErrorKind`] so a caller can pick a remedy:
//! re-collect data for [`ErrorKind::Input`], lower the learning rate for
//! [`ErrorKind::Divergence`], and so on.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    NumericDegeneracy,
    Divergence,
    Persistence,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("length mismatch: expected {expected} values, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Degenerate(#[from] DegenerateError),

    #[error("training diverged at epoch {epoch}: {quantity} became {value}")]
    Divergence {
        epoch: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} not fitted, call fit() first")]
    NotFitted(&'static str),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input(_) | Error::LengthMismatch { .. } => ErrorKind::Input,
            Error::Degenerate(_) => ErrorKind::NumericDegeneracy,
            Error::Divergence { .. } => ErrorKind::Divergence,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::InvalidConfig(_) | Error::NotFitted(_) => ErrorKind::Config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected 2 fields (mileage, price), found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: invalid {column} value {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("dataset contains no samples")]
    EmptyDataset,

    #[error("sample {index}: mileage and price must be finite, got ({mileage}, {price})")]
    NonFiniteSample {
        index: usize,
        mileage: f64,
        price: f64,
    },

    #[error("mileage cannot be negative, got {0}")]
    NegativeMileage(f64),

    #[error("mileage must be a finite number, got {0}")]
    NonFiniteMileage(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum DegenerateError {
    #[error("all mileages are equal to {mean}, standard deviation is zero")]
    ConstantFeature { mean: f64 },

    #[error("all prices are equal to {mean}, R² is undefined")]
    ConstantTarget { mean: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("model file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

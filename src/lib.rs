//! Predicts a car's price from its mileage with a straight line fitted by
//! batch gradient descent.
//!
//! The pipeline is `Dataset` → `StandardScaler` → `GradientDescent` →
//! `StandardScaler::unscale` → `Model`, wrapped up by `LinearRegression`.
//! Loading, persistence, metrics and plotting sit around it and never feed
//! back into training.

pub use ndarray::Array1;

pub mod dataset;
pub mod error;
pub mod linear_model;
pub mod metrics;
pub mod model;
pub mod persist;
pub mod plot;
pub mod preprocessing;

pub use dataset::{Dataset, Sample};
pub use error::{Error, ErrorKind, Result};
pub use linear_model::{
    EpochObserver, GradientDescent, GradientDescentConfig, LinearRegression, LogProgress,
    LossMetric, TrainingReport, TrainingStatus,
};
pub use metrics::{FitQuality, Metrics};
pub use model::{Model, PriceEstimate, StandardizedModel};
pub use preprocessing::{StandardScaler, StandardizedSample};

pub type Vector = Array1<f64>;

//! Single-feature linear regression trained by batch gradient descent.
//!
//! - `LinearRegression`: standardizes mileage, fits, and unscales the
//!   coefficients back to raw units
//! - `GradientDescent`: the epoch loop with its convergence and divergence
//!   checks
//! - `EpochObserver`: read-only hook for per-epoch progress
//!
//! # Examples
//!
//! ```rust
//! use price_regression::{Dataset, GradientDescentConfig, LinearRegression};
//!
//! let data = Dataset::from_pairs(&[(1.0, 8.0), (2.0, 11.0), (3.0, 14.0)]).unwrap();
//!
//! let config = GradientDescentConfig::default().learning_rate(0.1);
//! let mut model = LinearRegression::with_config(config);
//! model.fit(&data).unwrap();
//! let price = model.predict(4.0).unwrap();
//! assert!((price - 17.0).abs() < 1e-3);
//! ```

pub mod callback;
mod gradient_descent;
mod linear_regression;

pub use callback::{EpochObserver, LogProgress, NoopObserver};
pub use gradient_descent::{
    GradientDescent, GradientDescentConfig, LossMetric, TrainingOutcome, TrainingState,
    TrainingStatus,
};
pub use linear_regression::{LinearRegression, TrainingReport};

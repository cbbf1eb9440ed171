use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};

/// Intercept and slope valid against raw mileage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub theta0: f64,
    pub theta1: f64,
}

/// Intercept and slope valid only against standardized mileage.
///
/// Kept as a separate type so it cannot be fed raw mileage by accident; the
/// only way to a [`Model`] is `StandardScaler::unscale`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandardizedModel {
    pub theta0: f64,
    pub theta1: f64,
}

impl StandardizedModel {
    pub fn new(theta0: f64, theta1: f64) -> Self {
        Self { theta0, theta1 }
    }

    pub fn predict(&self, z: f64) -> f64 {
        self.theta0 + self.theta1 * z
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PriceEstimate {
    Valid(f64),
    /// The line crossed zero: the mileage lies past anything the data covers.
    OutOfRange { raw: f64 },
}

impl PriceEstimate {
    /// Price floored at zero.
    pub fn clamped(&self) -> f64 {
        match *self {
            PriceEstimate::Valid(price) => price,
            PriceEstimate::OutOfRange { .. } => 0.0,
        }
    }

    pub fn raw(&self) -> f64 {
        match *self {
            PriceEstimate::Valid(price) => price,
            PriceEstimate::OutOfRange { raw } => raw,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, PriceEstimate::OutOfRange { .. })
    }
}

impl Model {
    pub fn new(theta0: f64, theta1: f64) -> Self {
        Self { theta0, theta1 }
    }

    pub fn predict(&self, mileage: f64) -> f64 {
        self.theta0 + self.theta1 * mileage
    }

    pub fn estimate_price(&self, mileage: f64) -> Result<PriceEstimate> {
        if !mileage.is_finite() {
            return Err(InputError::NonFiniteMileage(mileage).into());
        }
        if mileage < 0.0 {
            return Err(InputError::NegativeMileage(mileage).into());
        }

        let price = self.predict(mileage);
        if price < 0.0 {
            log::warn!("predicted price {price:.2} for {mileage} km is negative");
            Ok(PriceEstimate::OutOfRange { raw: price })
        } else {
            Ok(PriceEstimate::Valid(price))
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "θ0={:.6}, θ1={:.6}", self.theta0, self.theta1)
    }
}

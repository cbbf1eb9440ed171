use std::fmt;

use serde::Serialize;

use crate::Vector;
use crate::dataset::Dataset;
use crate::error::{DegenerateError, Error, InputError, Result};
use crate::model::Model;

fn check_lengths(y_true: &Vector, y_pred: &Vector) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::LengthMismatch {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(InputError::EmptyDataset.into());
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    let mse = diff.mapv(|x| x * x).sum() / diff.len() as f64;
    Ok(mse)
}

pub fn root_mean_squared_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    Ok(mean_squared_error(y_true, y_pred)?.sqrt())
}

pub fn mean_absolute_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    let mae = diff.mapv(|x| x.abs()).sum() / diff.len() as f64;
    Ok(mae)
}

/// Coefficient of determination. Undefined when every `y_true` is equal.
pub fn r2_score(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let first = y_true[0];
    if y_true.iter().all(|&y| y == first) {
        return Err(DegenerateError::ConstantTarget { mean: first }.into());
    }

    let y_mean = y_true.sum() / y_true.len() as f64;
    let ss_res = (y_true - y_pred).mapv(|x| x * x).sum();
    let ss_tot = y_true.mapv(|x| (x - y_mean) * (x - y_mean)).sum();

    Ok(1.0 - ss_res / ss_tot)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl FitQuality {
    pub fn from_r2(r2: f64) -> Self {
        if r2 > 0.9 {
            FitQuality::Excellent
        } else if r2 > 0.7 {
            FitQuality::Good
        } else if r2 > 0.5 {
            FitQuality::Moderate
        } else {
            FitQuality::Poor
        }
    }
}

impl fmt::Display for FitQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FitQuality::Excellent => "excellent fit",
            FitQuality::Good => "good fit",
            FitQuality::Moderate => "moderate fit",
            FitQuality::Poor => "poor fit, consider different features",
        };
        f.write_str(text)
    }
}

/// Goodness of fit of a raw-space model against raw samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub r2: f64,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mean_price: f64,
}

impl Metrics {
    pub fn evaluate(data: &Dataset, model: &Model) -> Result<Self> {
        let y_true = data.prices();
        let y_pred = data.mileages().mapv(|x| model.predict(x));

        let mse = mean_squared_error(&y_true, &y_pred)?;
        let metrics = Self {
            r2: r2_score(&y_true, &y_pred)?,
            mae: mean_absolute_error(&y_true, &y_pred)?,
            mse,
            rmse: mse.sqrt(),
            mean_price: y_true.sum() / y_true.len() as f64,
        };

        if metrics.quality() == FitQuality::Poor {
            log::warn!("R² = {:.4}: {}", metrics.r2, metrics.quality());
        }
        Ok(metrics)
    }

    pub fn quality(&self) -> FitQuality {
        FitQuality::from_r2(self.r2)
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R² score: {:.4}", self.r2)?;
        writeln!(f, "  explains {:.2}% of the variance", self.r2 * 100.0)?;
        writeln!(f, "Mean absolute error: {:.2}", self.mae)?;
        writeln!(f, "Root mean squared error: {:.2}", self.rmse)?;
        writeln!(f, "Mean price: {:.2}", self.mean_price)?;
        write!(f, "{}", self.quality())
    }
}

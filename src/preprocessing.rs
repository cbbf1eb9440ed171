use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::{DegenerateError, Error, Result};
use crate::model::{Model, StandardizedModel};

/// A sample whose mileage has been mapped to `(mileage - mean) / std`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardizedSample {
    pub z: f64,
    pub price: f64,
}

/// Fitted mean and population standard deviation of the mileages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScalerParams {
    pub mean: f64,
    pub std: f64,
}

#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    params: Option<ScalerParams>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self { params: None }
    }

    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        // Rounding leaves a tiny nonzero std when identical values are not
        // exactly representable, so equality is checked on the raw values.
        let first = data.samples()[0].mileage;
        if data.iter().all(|s| s.mileage == first) {
            return Err(DegenerateError::ConstantFeature { mean: first }.into());
        }

        let n = data.len() as f64;
        let mean = data.iter().fold(0.0, |acc, s| acc + s.mileage) / n;
        let variance = data.iter().fold(0.0, |acc, s| {
            let diff = s.mileage - mean;
            acc + diff * diff
        }) / n;
        let std = variance.sqrt();

        if !(std.is_finite() && std > 0.0) {
            return Err(DegenerateError::ConstantFeature { mean }.into());
        }

        log::debug!("mileage mean {mean}, std {std}");
        self.params = Some(ScalerParams { mean, std });
        Ok(())
    }

    pub fn transform(&self, data: &Dataset) -> Result<Vec<StandardizedSample>> {
        let params = self.params()?;
        Ok(data
            .iter()
            .map(|s| StandardizedSample {
                z: (s.mileage - params.mean) / params.std,
                price: s.price,
            })
            .collect())
    }

    pub fn fit_transform(&mut self, data: &Dataset) -> Result<Vec<StandardizedSample>> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn standardize(&self, mileage: f64) -> Result<f64> {
        let params = self.params()?;
        Ok((mileage - params.mean) / params.std)
    }

    /// Rewrites `price = s0 + s1 * z` with `z = (x - mean) / std` as
    /// `price = theta0 + theta1 * x`.
    pub fn unscale(&self, model: StandardizedModel) -> Result<Model> {
        let params = self.params()?;
        let theta1 = model.theta1 / params.std;
        let theta0 = model.theta0 - theta1 * params.mean;
        Ok(Model::new(theta0, theta1))
    }

    pub fn params(&self) -> Result<ScalerParams> {
        self.params.ok_or(Error::NotFitted("StandardScaler"))
    }

    pub fn mean(&self) -> Result<f64> {
        Ok(self.params()?.mean)
    }

    pub fn std(&self) -> Result<f64> {
        Ok(self.params()?.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_scaler() {
        let data = Dataset::from_pairs(&[(1.0, 10.0), (3.0, 20.0), (5.0, 30.0)]).unwrap();
        let mut scaler = StandardScaler::new();

        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled.len(), data.len());
        assert_abs_diff_eq!(scaler.mean().unwrap(), 3.0, epsilon = 1e-12);
        // population std of {1, 3, 5}
        let expected_std = (8.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(scaler.std().unwrap(), expected_std, epsilon = 1e-12);

        for (z, s) in scaled.iter().zip(data.iter()) {
            assert_eq!(z.price, s.price);
        }
    }

    #[test]
    fn test_standardized_moments() {
        let data =
            Dataset::synthetic(200, (1_000.0, 250_000.0), 9_000.0, -0.02, 300.0, 42).unwrap();
        let scaled = StandardScaler::new().fit_transform(&data).unwrap();

        let n = scaled.len() as f64;
        let mean = scaled.iter().map(|s| s.z).sum::<f64>() / n;
        let var = scaled.iter().map(|s| (s.z - mean).powi(2)).sum::<f64>() / n;

        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(var.sqrt(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_constant_mileage_is_degenerate() {
        let data = Dataset::from_pairs(&[(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)]).unwrap();
        let err = StandardScaler::new().fit(&data).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NumericDegeneracy);
        assert!(matches!(
            err,
            Error::Degenerate(DegenerateError::ConstantFeature { .. })
        ));
    }

    #[test]
    fn test_constant_fractional_mileage_is_degenerate() {
        let data = Dataset::from_pairs(&[(0.1, 1.0), (0.1, 2.0), (0.1, 3.0)]).unwrap();
        let mut scaler = StandardScaler::new();
        let err = scaler.fit(&data).unwrap_err();

        assert!(matches!(
            err,
            Error::Degenerate(DegenerateError::ConstantFeature { mean }) if mean == 0.1
        ));
        assert!(scaler.params().is_err());
    }

    #[test]
    fn test_single_sample_is_degenerate() {
        let data = Dataset::from_pairs(&[(42_000.0, 7_000.0)]).unwrap();
        let err = StandardScaler::new().fit(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericDegeneracy);
    }

    #[test]
    fn test_unscale_preserves_predictions() {
        let data = Dataset::from_pairs(&[(10.0, 0.0), (20.0, 0.0), (40.0, 0.0)]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&data).unwrap();

        let standardized = StandardizedModel::new(1.5, -2.25);
        let raw = scaler.unscale(standardized).unwrap();

        for x in [0.0, 10.0, 25.0, 1_000.0] {
            let z = scaler.standardize(x).unwrap();
            assert_abs_diff_eq!(raw.predict(x), standardized.predict(z), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_transform_without_fit() {
        let data = Dataset::from_pairs(&[(1.0, 2.0)]).unwrap();
        let scaler = StandardScaler::new();

        assert!(scaler.transform(&data).is_err());
        assert!(scaler.unscale(StandardizedModel::default()).is_err());
    }
}

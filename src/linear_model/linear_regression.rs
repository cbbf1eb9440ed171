use serde::Serialize;

use super::callback::{EpochObserver, NoopObserver};
use super::gradient_descent::{GradientDescent, GradientDescentConfig, TrainingStatus};
use crate::Vector;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::model::Model;
use crate::preprocessing::{ScalerParams, StandardScaler};

/// Summary of one training run, serializable for diagnostics output.
#[derive(Clone, Debug, Serialize)]
pub struct TrainingReport {
    pub status: TrainingStatus,
    pub epochs: usize,
    pub final_loss: f64,
    pub config: GradientDescentConfig,
    pub scaler: ScalerParams,
    pub model: Model,
    pub loss_history: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl TrainingReport {
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Single-feature least squares fitted by batch gradient descent on
/// standardized mileage.
#[derive(Clone, Debug)]
pub struct LinearRegression {
    pub model: Option<Model>,
    scaler: StandardScaler,
    config: GradientDescentConfig,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::with_config(GradientDescentConfig::default())
    }

    pub fn with_config(config: GradientDescentConfig) -> Self {
        Self {
            model: None,
            scaler: StandardScaler::new(),
            config,
        }
    }

    pub fn config(&self) -> &GradientDescentConfig {
        &self.config
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn fit(&mut self, data: &Dataset) -> Result<TrainingReport> {
        self.fit_with_observer(data, &mut NoopObserver)
    }

    /// Standardizes, runs gradient descent, then unscales exactly once. On
    /// error the previously fitted model, if any, is left untouched.
    pub fn fit_with_observer(
        &mut self,
        data: &Dataset,
        observer: &mut dyn EpochObserver,
    ) -> Result<TrainingReport> {
        let optimizer = GradientDescent::new(self.config)?;

        let mut scaler = StandardScaler::new();
        let standardized = scaler.fit_transform(data)?;
        let outcome = optimizer.run(&standardized, observer)?;
        let model = scaler.unscale(outcome.model)?;
        log::info!("trained model: {model}");

        let report = TrainingReport {
            status: outcome.status,
            epochs: outcome.epochs(),
            final_loss: outcome.final_loss().unwrap_or(f64::NAN),
            config: self.config,
            scaler: scaler.params()?,
            model,
            loss_history: outcome.loss_history,
            metrics: None,
        };

        self.scaler = scaler;
        self.model = Some(model);
        Ok(report)
    }

    pub fn model(&self) -> Result<Model> {
        self.model.ok_or(Error::NotFitted("LinearRegression"))
    }

    pub fn predict(&self, mileage: f64) -> Result<f64> {
        Ok(self.model()?.predict(mileage))
    }

    pub fn predict_dataset(&self, data: &Dataset) -> Result<Vector> {
        let model = self.model()?;
        Ok(data.mileages().mapv(|x| model.predict(x)))
    }

    pub fn score(&self, data: &Dataset) -> Result<f64> {
        let y_pred = self.predict_dataset(data)?;
        crate::metrics::r2_score(&data.prices(), &y_pred)
    }

    pub fn evaluate(&self, data: &Dataset) -> Result<Metrics> {
        Metrics::evaluate(data, &self.model()?)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

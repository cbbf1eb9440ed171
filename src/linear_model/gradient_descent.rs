use serde::Serialize;

use super::callback::EpochObserver;
use crate::error::{Error, InputError, Result};
use crate::model::StandardizedModel;
use crate::preprocessing::StandardizedSample;

/// Loss value recorded each epoch and used for the convergence test.
///
/// The update itself always follows the gradient of the summed squared
/// residuals (`Σr`, `Σr·z`, without the `2/n` factor) whichever metric is
/// monitored. `MeanAbsolute` is therefore not the objective being minimized;
/// `MeanSquared` makes the monitored value and the objective agree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossMetric {
    #[default]
    MeanAbsolute,
    MeanSquared,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientDescentConfig {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub tolerance: f64,
    pub loss: LossMetric,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            max_epochs: 1000,
            tolerance: 1e-7,
            loss: LossMetric::MeanAbsolute,
        }
    }
}

impl GradientDescentConfig {
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn loss(mut self, loss: LossMetric) -> Self {
        self.loss = loss;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig(
                "max epochs must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be non-negative and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Running,
    /// Two consecutive losses differed by less than the tolerance.
    Converged,
    MaxEpochReached,
}

impl TrainingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrainingStatus::Running)
    }
}

/// Coefficients in standardized space plus the append-only loss history.
#[derive(Clone, Debug)]
pub struct TrainingState {
    model: StandardizedModel,
    loss_history: Vec<f64>,
    status: TrainingStatus,
}

impl Default for TrainingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingState {
    pub fn new() -> Self {
        Self {
            model: StandardizedModel::default(),
            loss_history: Vec::new(),
            status: TrainingStatus::Running,
        }
    }

    pub fn model(&self) -> StandardizedModel {
        self.model
    }

    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    pub fn status(&self) -> TrainingStatus {
        self.status
    }

    pub fn epochs(&self) -> usize {
        self.loss_history.len()
    }

    /// Runs one epoch. Does nothing once a terminal state is reached.
    pub fn step(
        &mut self,
        samples: &[StandardizedSample],
        config: &GradientDescentConfig,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Ok(());
        }

        let epoch = self.epochs();
        let (grad0, grad1, loss) = accumulate(samples, &self.model, config.loss);
        ensure_finite(epoch, "gradient of theta0", grad0)?;
        ensure_finite(epoch, "gradient of theta1", grad1)?;
        ensure_finite(epoch, "loss", loss)?;

        let theta0 = self.model.theta0 - config.learning_rate * grad0;
        let theta1 = self.model.theta1 - config.learning_rate * grad1;
        ensure_finite(epoch, "theta0", theta0)?;
        ensure_finite(epoch, "theta1", theta1)?;
        self.model = StandardizedModel::new(theta0, theta1);

        self.loss_history.push(loss);

        if let &[.., prev, curr] = self.loss_history.as_slice() {
            if (curr - prev).abs() < config.tolerance {
                self.status = TrainingStatus::Converged;
                return Ok(());
            }
        }

        if self.epochs() >= config.max_epochs {
            self.status = TrainingStatus::MaxEpochReached;
        }
        Ok(())
    }
}

/// Sums residuals left to right; returns `(Σr, Σr·z, loss)`.
fn accumulate(
    samples: &[StandardizedSample],
    model: &StandardizedModel,
    metric: LossMetric,
) -> (f64, f64, f64) {
    let mut grad0 = 0.0;
    let mut grad1 = 0.0;
    let mut total = 0.0;

    for sample in samples {
        let residual = model.predict(sample.z) - sample.price;
        grad0 += residual;
        grad1 += residual * sample.z;
        total += match metric {
            LossMetric::MeanAbsolute => residual.abs(),
            LossMetric::MeanSquared => residual * residual,
        };
    }

    (grad0, grad1, total / samples.len() as f64)
}

fn ensure_finite(epoch: usize, quantity: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Divergence {
            epoch,
            quantity,
            value,
        })
    }
}

#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub model: StandardizedModel,
    pub status: TrainingStatus,
    pub loss_history: Vec<f64>,
}

impl TrainingOutcome {
    pub fn epochs(&self) -> usize {
        self.loss_history.len()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

#[derive(Clone, Debug)]
pub struct GradientDescent {
    config: GradientDescentConfig,
}

impl GradientDescent {
    pub fn new(config: GradientDescentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GradientDescentConfig {
        &self.config
    }

    /// Trains from `(0, 0)` until convergence or the epoch cap.
    pub fn run(
        &self,
        samples: &[StandardizedSample],
        observer: &mut dyn EpochObserver,
    ) -> Result<TrainingOutcome> {
        if samples.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }

        let mut state = TrainingState::new();
        while !state.status().is_terminal() {
            state.step(samples, &self.config)?;
            let epoch = state.epochs() - 1;
            observer.on_epoch(epoch, state.loss_history()[epoch]);
        }

        let epoch = state.epochs() - 1;
        let loss = state.loss_history()[epoch];
        match state.status() {
            TrainingStatus::Converged => {
                log::info!("converged at epoch {epoch} (loss: {loss:.6})");
            }
            _ => {
                log::info!(
                    "stopped after {} epochs without converging (loss: {loss:.6})",
                    self.config.max_epochs
                );
            }
        }

        Ok(TrainingOutcome {
            model: state.model(),
            status: state.status(),
            loss_history: state.loss_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::linear_model::callback::NoopObserver;
    use approx::assert_abs_diff_eq;

    // z-scores of 10k, 20k, 30k, 40k km
    fn scenario() -> Vec<StandardizedSample> {
        let s = 5f64.sqrt();
        [
            (-3.0 / s, 20000.0),
            (-1.0 / s, 18000.0),
            (1.0 / s, 16000.0),
            (3.0 / s, 14000.0),
        ]
        .into_iter()
        .map(|(z, price)| StandardizedSample { z, price })
        .collect()
    }

    #[test]
    fn test_first_epoch_update() {
        let samples = scenario();
        let config = GradientDescentConfig::default();
        let mut state = TrainingState::new();

        state.step(&samples, &config).unwrap();

        // residuals are -price, so grad0 = -68000 and loss = mean price
        assert_abs_diff_eq!(state.model().theta0, 68.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.loss_history()[0], 17000.0, epsilon = 1e-9);
        assert_eq!(state.status(), TrainingStatus::Running);
    }

    #[test]
    fn test_mean_squared_loss_metric() {
        let samples = scenario();
        let config = GradientDescentConfig::default().loss(LossMetric::MeanSquared);
        let mut state = TrainingState::new();

        state.step(&samples, &config).unwrap();

        let expected = [20000f64, 18000.0, 16000.0, 14000.0]
            .iter()
            .map(|p| p * p)
            .sum::<f64>()
            / 4.0;
        assert_abs_diff_eq!(state.loss_history()[0], expected, epsilon = 1e-3);
        // the update is the same whichever metric is monitored
        assert_abs_diff_eq!(state.model().theta0, 68.0, epsilon = 1e-9);
    }

    #[test]
    fn test_converges_to_least_squares() {
        let samples = scenario();
        let config = GradientDescentConfig::default().learning_rate(0.1);
        let outcome = GradientDescent::new(config)
            .unwrap()
            .run(&samples, &mut NoopObserver)
            .unwrap();

        assert_eq!(outcome.status, TrainingStatus::Converged);
        assert!(outcome.epochs() < config.max_epochs);
        assert_abs_diff_eq!(outcome.model.theta0, 17000.0, epsilon = 1e-4);
        assert_abs_diff_eq!(outcome.model.theta1, -1000.0 * 5f64.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_epoch_cap() {
        let samples = scenario();
        let config = GradientDescentConfig::default().max_epochs(3);
        let outcome = GradientDescent::new(config)
            .unwrap()
            .run(&samples, &mut NoopObserver)
            .unwrap();

        assert_eq!(outcome.status, TrainingStatus::MaxEpochReached);
        assert_eq!(outcome.epochs(), 3);
    }

    #[test]
    fn test_large_tolerance_stops_after_two_epochs() {
        let samples = scenario();
        let config = GradientDescentConfig::default().tolerance(1e12);
        let outcome = GradientDescent::new(config)
            .unwrap()
            .run(&samples, &mut NoopObserver)
            .unwrap();

        assert_eq!(outcome.status, TrainingStatus::Converged);
        assert_eq!(outcome.epochs(), 2);
    }

    #[test]
    fn test_step_after_terminal_is_noop() {
        let samples = scenario();
        let config = GradientDescentConfig::default().max_epochs(1);
        let mut state = TrainingState::new();

        state.step(&samples, &config).unwrap();
        assert_eq!(state.status(), TrainingStatus::MaxEpochReached);

        let before = state.model();
        state.step(&samples, &config).unwrap();
        assert_eq!(state.model(), before);
        assert_eq!(state.epochs(), 1);
    }

    #[test]
    fn test_divergence_is_reported() {
        let samples = scenario();
        let config = GradientDescentConfig::default().learning_rate(10.0);
        let err = GradientDescent::new(config)
            .unwrap()
            .run(&samples, &mut NoopObserver)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Divergence);
    }

    #[test]
    fn test_observer_sees_every_epoch() {
        let samples = scenario();
        let config = GradientDescentConfig::default().max_epochs(5);
        let mut epochs = Vec::new();
        let mut observer = |epoch: usize, _loss: f64| epochs.push(epoch);

        let outcome = GradientDescent::new(config)
            .unwrap()
            .run(&samples, &mut observer)
            .unwrap();

        assert_eq!(outcome.epochs(), 5);
        assert_eq!(epochs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_invalid_config() {
        for config in [
            GradientDescentConfig::default().learning_rate(0.0),
            GradientDescentConfig::default().learning_rate(f64::NAN),
            GradientDescentConfig::default().max_epochs(0),
            GradientDescentConfig::default().tolerance(-1.0),
        ] {
            let err = GradientDescent::new(config).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    #[test]
    fn test_empty_samples() {
        let gd = GradientDescent::new(GradientDescentConfig::default()).unwrap();
        let err = gd.run(&[], &mut NoopObserver).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }
}

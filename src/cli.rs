use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use price_regression::persist::DEFAULT_MODEL_PATH;
use price_regression::{GradientDescentConfig, LossMetric};

#[derive(Debug, Parser)]
#[command(
    name = "price-regression",
    about = "Fit and query a linear model of car price against mileage",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the model on a CSV dataset and save the coefficients
    Train(TrainArgs),

    /// Estimate a price from a saved model
    Predict(PredictArgs),

    /// Report goodness of fit of a saved model on a dataset
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LossArg {
    /// Mean absolute error
    Mae,
    /// Mean squared error
    Mse,
}

impl From<LossArg> for LossMetric {
    fn from(arg: LossArg) -> Self {
        match arg {
            LossArg::Mae => LossMetric::MeanAbsolute,
            LossArg::Mse => LossMetric::MeanSquared,
        }
    }
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// CSV file with a header row and `mileage,price` rows
    #[arg(long, value_name = "PATH", default_value = "data.csv", value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// Where to write the fitted coefficients
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_MODEL_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub model: PathBuf,

    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 1000)]
    pub max_epochs: usize,

    /// Stop once consecutive losses differ by less than this
    #[arg(long, default_value_t = 1e-7)]
    pub tolerance: f64,

    /// Loss monitored for convergence
    #[arg(long, value_enum, default_value_t = LossArg::Mae)]
    pub loss: LossArg,

    /// Write a JSON training report
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,

    /// Directory for the data and regression SVG plots
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub plot_dir: Option<PathBuf>,
}

impl TrainArgs {
    pub fn config(&self) -> GradientDescentConfig {
        GradientDescentConfig::default()
            .learning_rate(self.learning_rate)
            .max_epochs(self.max_epochs)
            .tolerance(self.tolerance)
            .loss(self.loss.into())
    }
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_MODEL_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub model: PathBuf,

    /// Mileage in km; prompted for on stdin when omitted
    #[arg(long)]
    pub mileage: Option<f64>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    #[arg(long, value_name = "PATH", default_value = "data.csv", value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_MODEL_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub model: PathBuf,
}

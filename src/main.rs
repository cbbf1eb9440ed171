use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};

use price_regression::error::{InputError, PersistenceError};
use price_regression::persist::{load_model, save_model};
use price_regression::{
    Dataset, Error, LinearRegression, LogProgress, Metrics, PriceEstimate, Result, TrainingReport,
    plot,
};

mod cli;

use cli::{Cli, Commands, EvaluateArgs, PredictArgs, TrainArgs};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Train(args) => train(args),
        Commands::Predict(args) => predict(args),
        Commands::Evaluate(args) => evaluate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error ({:?}): {e}", e.kind());
            ExitCode::FAILURE
        }
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let data = Dataset::from_csv_path(&args.data)?;
    info!("training on {} samples from {}", data.len(), args.data.display());

    let config = args.config();
    let mut regression = LinearRegression::with_config(config);
    let mut progress = LogProgress::new(config.max_epochs);
    let mut report = regression.fit_with_observer(&data, &mut progress)?;
    let model = report.model;

    save_model(&model, &args.model)?;
    println!("Model saved to {}: {model}", args.model.display());

    // constant prices leave R² undefined; the model itself is still usable
    match Metrics::evaluate(&data, &model) {
        Ok(metrics) => {
            println!("\n{metrics}");
            report = report.with_metrics(metrics);
        }
        Err(e) => warn!("skipping metrics: {e}"),
    }

    if let Some(path) = &args.report {
        write_report(&report, path)?;
        info!("training report written to {}", path.display());
    }

    if let Some(dir) = &args.plot_dir {
        draw_plots(&data, &report, dir);
    }
    Ok(())
}

fn write_report(report: &TrainingReport, path: &Path) -> Result<()> {
    let io_err = |source: io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| io_err(io::Error::other(e)))?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

// Plot failures are reported but never fail a finished training run.
fn draw_plots(data: &Dataset, report: &TrainingReport, dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("cannot create plot directory {}: {e}", dir.display());
        return;
    }
    if let Err(e) = plot::plot_data(data, dir.join("data_distribution.svg")) {
        warn!("data plot failed: {e}");
    }
    let line_path = dir.join("regression_with_line.svg");
    if let Err(e) = plot::plot_regression(data, &report.model, line_path) {
        warn!("regression plot failed: {e}");
    }
}

fn predict(args: PredictArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    println!("Model loaded: {model}\n");

    let mileage = match args.mileage {
        Some(mileage) => mileage,
        None => prompt_mileage()?,
    };

    match model.estimate_price(mileage)? {
        PriceEstimate::Valid(price) => {
            println!("Estimated price for {mileage:.0} km: {price:.2}");
        }
        PriceEstimate::OutOfRange { raw } => {
            println!("Estimated price: 0 (model predicts negative value: {raw:.2})");
            println!("This mileage lies beyond the range of the training data.");
        }
    }
    Ok(())
}

fn prompt_mileage() -> Result<f64> {
    print!("Enter the mileage of the car: ");
    io::stdout().flush().map_err(stdin_error)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(stdin_error)?;

    let raw = line.trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber {
            line: 1,
            column: "mileage",
            value: raw.to_string(),
        }
        .into()),
    }
}

fn stdin_error(source: io::Error) -> Error {
    InputError::Io {
        path: "<stdin>".into(),
        source,
    }
    .into()
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let data = Dataset::from_csv_path(&args.data)?;
    let model = load_model(&args.model)?;

    let metrics = Metrics::evaluate(&data, &model)?;
    println!("Model: {model}\n\n{metrics}");
    Ok(())
}

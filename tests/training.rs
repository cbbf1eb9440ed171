use std::fs;

use approx::assert_abs_diff_eq;
use price_regression::persist::{load_model, save_model};
use price_regression::{
    Dataset, ErrorKind, GradientDescentConfig, LinearRegression, LossMetric, Metrics,
    TrainingStatus,
};

const LINEAR_CSV: &str = "km,price\n10000,20000\n20000,18000\n30000,16000\n40000,14000\n";

#[test]
fn csv_to_model_file_to_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.csv");
    let model_path = dir.path().join("thetas");
    fs::write(&data_path, LINEAR_CSV).unwrap();

    let data = Dataset::from_csv_path(&data_path).unwrap();
    let mut regression =
        LinearRegression::with_config(GradientDescentConfig::default().learning_rate(0.1));
    let report = regression.fit(&data).unwrap();
    save_model(&report.model, &model_path).unwrap();

    let model = load_model(&model_path).unwrap();
    assert_eq!(model, report.model);
    assert_abs_diff_eq!(model.theta0, 22_000.0, epsilon = 1.0);
    assert_abs_diff_eq!(model.theta1, -0.2, epsilon = 0.01);

    let estimate = model.estimate_price(25_000.0).unwrap();
    assert_abs_diff_eq!(estimate.clamped(), 17_000.0, epsilon = 1.0);

    // past 110 000 km the line goes below zero
    let far = model.estimate_price(200_000.0).unwrap();
    assert!(far.is_out_of_range());
    assert_eq!(far.clamped(), 0.0);

    let metrics = Metrics::evaluate(&data, &model).unwrap();
    assert_abs_diff_eq!(metrics.r2, 1.0, epsilon = 1e-9);
}

#[test]
fn default_settings_stop_at_epoch_cap_on_small_data() {
    let data = Dataset::from_reader(LINEAR_CSV.as_bytes()).unwrap();
    let mut regression = LinearRegression::new();

    let report = regression.fit(&data).unwrap();

    assert_eq!(report.status, TrainingStatus::MaxEpochReached);
    assert_eq!(report.epochs, 1000);
    assert!(report.loss_history.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn both_loss_metrics_reach_the_same_line() {
    let data = Dataset::synthetic(40, (0.0, 10.0), 5.0, 3.0, 0.0, 99).unwrap();

    for loss in [LossMetric::MeanAbsolute, LossMetric::MeanSquared] {
        let config = GradientDescentConfig::default()
            .learning_rate(0.01)
            .loss(loss);
        let mut regression = LinearRegression::with_config(config);
        let report = regression.fit(&data).unwrap();

        assert_abs_diff_eq!(report.model.theta0, 5.0, epsilon = 1e-2);
        assert_abs_diff_eq!(report.model.theta1, 3.0, epsilon = 1e-2);
    }
}

#[test]
fn error_kinds_are_distinguishable() {
    let constant = Dataset::from_pairs(&[(5.0, 1.0), (5.0, 2.0)]).unwrap();
    let err = LinearRegression::new().fit(&constant).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericDegeneracy);

    let single = Dataset::from_pairs(&[(5.0, 1.0)]).unwrap();
    let err = LinearRegression::new().fit(&single).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericDegeneracy);

    let err = Dataset::from_reader("km,price\n".as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);

    let data = Dataset::from_reader(LINEAR_CSV.as_bytes()).unwrap();
    let err = LinearRegression::with_config(GradientDescentConfig::default().learning_rate(5.0))
        .fit(&data)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Divergence);

    let dir = tempfile::tempdir().unwrap();
    let err = load_model(dir.path().join("missing")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn report_serializes_to_json() {
    let data = Dataset::from_reader(LINEAR_CSV.as_bytes()).unwrap();
    let mut regression =
        LinearRegression::with_config(GradientDescentConfig::default().max_epochs(10));
    let report = regression.fit(&data).unwrap();
    let metrics = regression.evaluate(&data).unwrap();

    let json = serde_json::to_value(report.with_metrics(metrics)).unwrap();

    assert_eq!(json["status"], "max_epoch_reached");
    assert_eq!(json["epochs"], 10);
    assert_eq!(json["config"]["loss"], "mean_absolute");
    assert_eq!(json["loss_history"].as_array().unwrap().len(), 10);
    assert!(json["metrics"]["r2"].is_number());
}

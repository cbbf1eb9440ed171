use price_regression::{Dataset, GradientDescentConfig, LinearRegression, Metrics};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Price vs Mileage Example ===\n");

    // price = 9000 - 0.025 * km, plus up to 400 of noise
    let data = Dataset::synthetic(24, (20_000.0, 240_000.0), 9_000.0, -0.025, 400.0, 2024)?;

    println!("Training data:");
    for s in data.iter().take(5) {
        println!("  {:>9.0} km -> {:>8.2}", s.mileage, s.price);
    }
    println!("  ... {} samples", data.len());

    let config = GradientDescentConfig::default().learning_rate(0.01);
    let mut model = LinearRegression::with_config(config);
    let report = model.fit(&data)?;

    println!("\nResults:");
    println!("Status: {:?} after {} epochs", report.status, report.epochs);
    println!("Model: {}", report.model);
    println!("\n{}", Metrics::evaluate(&data, &report.model)?);

    println!("\nPredictions on new mileages:");
    for km in [50_000.0, 150_000.0, 400_000.0] {
        let estimate = report.model.estimate_price(km)?;
        if estimate.is_out_of_range() {
            println!("{km:>9.0} km: 0 (line predicts {:.2})", estimate.raw());
        } else {
            println!("{km:>9.0} km: {:.2}", estimate.clamped());
        }
    }

    Ok(())
}

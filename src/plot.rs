//! SVG charts of the samples and the fitted line.

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::dataset::Dataset;
use crate::model::Model;

const SIZE: (u32, u32) = (800, 600);
const POINT_COLOR: RGBColor = RGBColor(255, 0, 128);

/// Pads a range by 5% on each side; widens a zero-width range to one unit.
fn padded(lo: f64, hi: f64) -> Range<f64> {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * 0.05)..(hi + span * 0.05)
    } else {
        (lo - 0.5)..(hi + 0.5)
    }
}

pub fn plot_data<P: AsRef<Path>>(data: &Dataset, path: P) -> Result<(), Box<dyn Error>> {
    draw(data, None, path.as_ref(), "Car price vs mileage")
}

pub fn plot_regression<P: AsRef<Path>>(
    data: &Dataset,
    model: &Model,
    path: P,
) -> Result<(), Box<dyn Error>> {
    draw(data, Some(model), path.as_ref(), "Linear regression: price vs mileage")
}

fn draw(
    data: &Dataset,
    model: Option<&Model>,
    path: &Path,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    let (xmin, xmax) = data.mileage_range();
    let (mut ymin, mut ymax) = data.price_range();
    if let Some(model) = model {
        for x in [xmin, xmax] {
            ymin = ymin.min(model.predict(x));
            ymax = ymax.max(model.predict(x));
        }
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(padded(xmin, xmax), padded(ymin, ymax))?;

    ctx.configure_mesh()
        .x_desc("Mileage (km)")
        .y_desc("Price")
        .draw()?;

    ctx.draw_series(
        data.iter()
            .map(|s| Circle::new((s.mileage, s.price), 4, POINT_COLOR.filled())),
    )?
    .label("Data points")
    .legend(|(x, y)| Circle::new((x, y), 4, POINT_COLOR.filled()));

    if let Some(model) = model {
        let line = [(xmin, model.predict(xmin)), (xmax, model.predict(xmax))];
        ctx.draw_series(LineSeries::new(line, RED.stroke_width(2)))?
            .label("Regression line")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2))
            });
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("plot saved to {}", path.display());
    Ok(())
}

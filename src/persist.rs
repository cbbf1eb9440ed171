//! Reading and writing the fitted coefficients.
//!
//! The model file holds a single line, `theta0,theta1`, in raw mileage units.

use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::model::Model;

pub const DEFAULT_MODEL_PATH: &str = "thetas";

pub fn save_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|source| PersistenceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    wtr.serialize(model).map_err(|source| PersistenceError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    wtr.flush().map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("saved {model} to {}", path.display());
    Ok(())
}

pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    let malformed = |reason: String| PersistenceError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| PersistenceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let record = match rdr.records().next() {
        Some(record) => record.map_err(|source| PersistenceError::Csv {
            path: path.to_path_buf(),
            source,
        })?,
        None => return Err(malformed("file is empty".to_string()).into()),
    };

    if record.len() != 2 {
        let reason = format!("expected theta0,theta1, found {} fields", record.len());
        return Err(malformed(reason).into());
    }

    let mut thetas = [0.0; 2];
    let fields = ["theta0", "theta1"].iter().zip(record.iter());
    for (slot, (name, raw)) in thetas.iter_mut().zip(fields) {
        *slot = match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return Err(malformed(format!("invalid {name} {raw:?}")).into()),
        };
    }

    Ok(Model::new(thetas[0], thetas[1]))
}

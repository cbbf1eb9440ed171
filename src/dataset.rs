use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::Vector;
use crate::error::{Error, InputError, Result};

/// One raw observation: a car's mileage and the price it sold for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub mileage: f64,
    pub price: f64,
}

impl Sample {
    pub fn new(mileage: f64, price: f64) -> Self {
        Self { mileage, price }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((mileage, price): (f64, f64)) -> Self {
        Self { mileage, price }
    }
}

/// An ordered, non-empty collection of samples. Never mutated after loading.
#[derive(Clone, Debug)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// Rejects an empty list and any sample with a NaN or infinite field.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }
        if let Some((index, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.mileage.is_finite() && s.price.is_finite()))
        {
            return Err(InputError::NonFiniteSample {
                index,
                mileage: s.mileage,
                price: s.price,
            }
            .into());
        }
        Ok(Self { samples })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().copied().map(Sample::from).collect())
    }

    /// Loads a `mileage,price` table with a header row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        log::debug!("loaded {} samples from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(InputError::Csv)?;
            let line = record.position().map_or(0, |pos| pos.line());

            if record.len() != 2 {
                return Err(InputError::FieldCount {
                    line,
                    found: record.len(),
                }
                .into());
            }

            let mileage = parse_field(&record[0], line, "mileage")?;
            let price = parse_field(&record[1], line, "price")?;
            samples.push(Sample { mileage, price });
        }

        Self::new(samples)
    }

    /// Draws `n` mileages uniformly from `mileage_range` and prices from
    /// `intercept + slope * mileage` plus uniform noise in `[-noise, noise)`.
    /// Deterministic for a given `seed`.
    pub fn synthetic(
        n: usize,
        mileage_range: (f64, f64),
        intercept: f64,
        slope: f64,
        noise: f64,
        seed: u64,
    ) -> Result<Self> {
        let (low, high) = mileage_range;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::InvalidConfig(format!(
                "mileage range must be finite and increasing, got {low}..{high}"
            )));
        }
        if !(noise.is_finite() && noise >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "noise must be finite and non-negative, got {noise}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mileages = Vector::random_using(n, Uniform::new(low, high), &mut rng);
        let jitter = if noise > 0.0 {
            Vector::random_using(n, Uniform::new(-noise, noise), &mut rng)
        } else {
            Vector::zeros(n)
        };

        let samples = mileages
            .iter()
            .zip(jitter.iter())
            .map(|(&mileage, &eps)| Sample {
                mileage,
                price: intercept + slope * mileage + eps,
            })
            .collect();

        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mileages(&self) -> Vector {
        self.samples.iter().map(|s| s.mileage).collect()
    }

    pub fn prices(&self) -> Vector {
        self.samples.iter().map(|s| s.price).collect()
    }

    /// Smallest and largest mileage, in that order.
    pub fn mileage_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.mileage), hi.max(s.mileage))
            })
    }

    pub fn price_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.price), hi.max(s.price))
            })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

fn parse_field(raw: &str, line: u64, column: &'static str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber {
            line,
            column,
            value: raw.to_string(),
        }
        .into()),
    }
}

use clap::ValueEnum;

/// Reduces a batch of readings to a single value.
///
/// Only ever called with at least one reading.
pub trait Reducer {
    fn reduce(&self, readings: &[f64]) -> f64;
}

impl<F> Reducer for F
where
    F: Fn(&[f64]) -> f64,
{
    fn reduce(&self, readings: &[f64]) -> f64 {
        self(readings)
    }
}

/// Built-in measures of central tendency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Measure {
    /// Middle value, robust against single outliers
    #[default]
    Median,

    /// Arithmetic mean
    Mean,
}

impl Reducer for Measure {
    fn reduce(&self, readings: &[f64]) -> f64 {
        match self {
            Measure::Median => median(readings),
            Measure::Mean => mean(readings),
        }
    }
}

pub fn median(readings: &[f64]) -> f64 {
    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn mean(readings: &[f64]) -> f64 {
    readings.iter().sum::<f64>() / readings.len() as f64
}

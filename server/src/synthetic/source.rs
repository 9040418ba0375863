//! Random value sources for synthetic metrics

use rand::Rng;

/// Draws a value from the closed interval `[low, high]`
pub trait ValueSource: Send + Sync {
    fn sample(&self, low: f64, high: f64) -> f64;
}

/// Uniform draws from the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl ValueSource for ThreadRngSource {
    fn sample(&self, low: f64, high: f64) -> f64 {
        rand::rng().random_range(low..=high)
    }
}

/// Always the lower bound
#[derive(Debug, Clone, Copy, Default)]
pub struct MinSource;

impl ValueSource for MinSource {
    fn sample(&self, low: f64, _high: f64) -> f64 {
        low
    }
}

/// Always the upper bound
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxSource;

impl ValueSource for MaxSource {
    fn sample(&self, _low: f64, high: f64) -> f64 {
        high
    }
}

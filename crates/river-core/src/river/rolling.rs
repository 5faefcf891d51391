use std::collections::VecDeque;
use std::num::NonZeroUsize;

use serde::Serialize;

use super::RiverParams;

/// Sample statistics of one trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingStat {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); undefined below two samples.
    pub std: Option<f64>,
}

/// Fixed-capacity trailing buffer of the most recent values.
///
/// Moments are recomputed from the buffered values on every read, so a
/// window's statistics depend only on the values it currently holds and
/// never on values that have already left it.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: NonZeroUsize,
    buffer: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity.get()),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.buffer.len() == self.capacity.get() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        self.moments().map(|(mean, _)| mean)
    }

    pub fn variance(&self) -> Option<f64> {
        let n = self.buffer.len();
        if n < 2 {
            return None;
        }
        self.moments()
            .map(|(_, m2)| (m2 / (n - 1) as f64).max(0.0))
    }

    pub fn std(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Current statistics, or `None` while fewer than `min_periods` samples are held.
    pub fn stat(&self, min_periods: usize) -> Option<RollingStat> {
        if self.buffer.len() < min_periods {
            return None;
        }
        let (mean, _) = self.moments()?;
        Some(RollingStat {
            count: self.buffer.len(),
            mean,
            std: self.std(),
        })
    }

    /// Mean and sum of squared deviations of the buffered values.
    ///
    /// The first-pass mean is corrected by the mean residual, which makes a
    /// window of identical values return that value with zero spread.
    fn moments(&self) -> Option<(f64, f64)> {
        if self.buffer.is_empty() {
            return None;
        }
        let n = self.buffer.len() as f64;
        let rough = self.buffer.iter().sum::<f64>() / n;
        let mean = rough + self.buffer.iter().map(|v| v - rough).sum::<f64>() / n;
        let m2 = self.buffer.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some((mean, m2))
    }
}

/// Trailing mean/std of `values` at every position, gated by `min_periods`.
///
/// The output has the same length as the input.
pub fn rolling_mean_std(values: &[f64], params: RiverParams) -> Vec<Option<RollingStat>> {
    let mut window = RollingWindow::new(params.window_size());
    values
        .iter()
        .map(|&value| {
            window.push(value);
            window.stat(params.min_periods())
        })
        .collect()
}

//! Sample series accumulation and summary statistics
//!
//! A [`SampleSeries`] holds the scaled values of one selected counter in
//! frame-arrival order, capped at a target frame count. Statistics are only
//! ever computed over a series that reached its target; a renderer that died
//! early contributes no statistics rather than misleading ones.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::counter::{CounterSet, Selection};
use crate::record::FrameRecord;

/// Errors produced by [`SampleSeries`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Input ended before the target number of valid frames was captured.
    /// Non-retryable; the caller omits this source from its output.
    #[error("incomplete series: {got} of {target} frames")]
    IncompleteSeries {
        /// Valid frames captured before the input was exhausted.
        got: usize,
        /// Frames required for statistics to be meaningful.
        target: usize,
    },
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
/// Summary statistics over a complete [`SampleSeries`]. Computed once,
/// never mutated.
pub struct Stats {
    /// Arithmetic mean of the scaled samples.
    pub average: f64,
    /// Population standard deviation: squared deviations divided by N, not
    /// N-1. These are full runs, not samples of a larger population.
    pub stddev: f64,
    /// Smallest scaled sample.
    pub min: f64,
    /// Largest scaled sample.
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// Ordered, scaled samples for one selected counter.
pub struct SampleSeries {
    target: NonZeroUsize,
    samples: Vec<f64>,
}

impl SampleSeries {
    /// Create an empty series that is complete at `target` samples.
    #[must_use]
    pub fn new(target: NonZeroUsize) -> Self {
        Self {
            target,
            samples: Vec::with_capacity(target.get()),
        }
    }

    /// Append the selected counter's field from `record`, scaled to display
    /// units. Arrival order is preserved; there is no deduplication or
    /// reordering. Once the series is complete further records are ignored.
    pub fn accumulate(&mut self, record: &FrameRecord, counter: &Selection<'_>) {
        if self.is_complete() {
            return;
        }
        if let Some(raw) = record.get(counter.index) {
            self.samples.push(raw as f64 * counter.spec.scale);
        }
    }

    /// Number of samples captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples have been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True once the target number of samples has been captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.samples.len() == self.target.get()
    }

    /// The scaled samples in arrival order.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Compute [`Stats`] over a complete series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSeries`] if fewer than the target number of
    /// samples were captured. No partial statistics are ever returned.
    pub fn finalize(&self) -> Result<Stats, Error> {
        if !self.is_complete() {
            return Err(Error::IncompleteSeries {
                got: self.samples.len(),
                target: self.target.get(),
            });
        }

        let n = self.samples.len() as f64;
        let sum: f64 = self.samples.iter().sum();
        let average = sum / n;
        let variance = self
            .samples
            .iter()
            .map(|x| (x - average) * (x - average))
            .sum::<f64>()
            / n;
        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .samples
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(Stats {
            average,
            stddev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Run the full pipeline over already-captured text: parse each line against
/// `counters`, skip malformed lines, and accumulate the selected counter
/// until the series is complete or the input is exhausted.
///
/// The returned series may be incomplete; [`SampleSeries::finalize`] is the
/// gate that decides whether statistics exist.
pub fn collect<'a, I>(
    lines: I,
    counters: &CounterSet,
    counter: &Selection<'_>,
    target: NonZeroUsize,
) -> SampleSeries
where
    I: IntoIterator<Item = &'a str>,
{
    let mut series = SampleSeries::new(target);
    for line in lines {
        if series.is_complete() {
            break;
        }
        if let Some(record) = FrameRecord::parse(line, counters) {
            series.accumulate(&record, counter);
        }
    }
    series
}

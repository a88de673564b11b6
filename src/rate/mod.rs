use std::collections::{btree_map::Entry, BTreeMap};

use crate::{CdTime, CounterValue, LabelSet, Metric, MetricError, Result, Value};


#[derive(Debug, Clone, Copy)]
struct RateEntry {
    time: CdTime,
    counter: CounterValue,
}

/// Turns successive counter samples into per second rates.
/// Series are told apart by family name and label set.
#[derive(Debug, Default)]
pub struct RateTracker {
    series: BTreeMap<(String, LabelSet), RateEntry>,
}

fn uint64_diff(old: u64, new: u64) -> u64 {
    if old <= new {
        return new - old;
    }

    // wrapped; counters that never left 32 bits are assumed to be 32 bit counters
    if old <= u32::MAX as u64 {
        (u32::MAX as u64 - old) + new + 1
    } else {
        (u64::MAX - old).wrapping_add(new).wrapping_add(1)
    }
}

fn float64_diff(old: f64, new: f64) -> f64 {
    if old > new {
        new
    } else {
        new - old
    }
}

impl RateTracker {
    pub fn new() -> RateTracker {
        RateTracker::default()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Records `metric` and returns its rate since the previous sample of the same series.
    /// The first sample of a series only primes the tracker and yields `None`.
    pub fn rate(&mut self, name: &str, metric: &Metric) -> Result<Option<f64>> {
        let counter = match &metric.value {
            Value::Counter(counter) => *counter,
            other => {
                return Err(MetricError::invalid(format!(
                    "rates can only be computed for counters (got: {:?})",
                    other
                )))
            }
        };

        let key = (name.to_owned(), metric.labels.clone());
        let entry = match self.series.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(RateEntry {
                    time: metric.time,
                    counter,
                });
                return Ok(None);
            }
        };

        if metric.time <= entry.time {
            return Err(MetricError::invalid(format!(
                "sample for {} is not newer than the last one (time: {}, last update: {})",
                name, metric.time, entry.time
            )));
        }

        let time_diff = (metric.time - entry.time).as_secs_f64();
        let rate = match (entry.counter, counter) {
            (CounterValue::UInt64(old), CounterValue::UInt64(new)) => uint64_diff(old, new) as f64 / time_diff,
            (CounterValue::Float64(old), CounterValue::Float64(new)) => float64_diff(old, new) / time_diff,
            _ => return Err(MetricError::invalid(format!("counter kind of {} changed", name))),
        };

        entry.time = metric.time;
        entry.counter = counter;
        Ok(Some(rate))
    }

    /// Forgets every series.
    pub fn clear(&mut self) {
        self.series.clear();
    }
}

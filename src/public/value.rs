use std::{convert::TryFrom, fmt};

use serde::Deserialize;

use crate::{LabelSet, MetricError, Result};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Unknown SHOULD NOT be used. Unknown MAY be used when it is impossible to determine the types of individual metrics from 3rd party systems.
    /// A point in a metric with the unknown type MUST have a single value.
    Unknown,

    /// A Gauge that can go up or down
    /// Gauges are current measurements, such as bytes of memory currently used or the number of items in a queue.
    /// For gauges the absolute value is what is of interest to a user.
    Gauge,

    /// A Counter that only goes up
    /// Counters measure discrete events. Common examples are the number of HTTP requests received,
    /// CPU seconds spent, or bytes sent. For counters how quickly they are increasing over time is what is of interest to a user.
    /// The value is kept either as an unsigned integer or as a float, whichever the producer reported.
    Counter,

    /// StateSets represent a series of related boolean values, also called a bitset.
    /// A point of a StateSet metric MAY contain multiple states and MUST contain one boolean per State.
    /// A StateSet Metric's LabelSet MUST NOT have a label name which is the same as the name of its MetricFamily.
    StateSet,

    /// Info metrics are used to expose textual information which SHOULD NOT change during process lifetime.
    /// Common examples are an application's version, revision control commit, and the version of a compiler.
    /// A MetricPoint of an Info Metric contains a LabelSet.
    Info,

    /// Summaries also measure distributions of discrete events and MAY be used when Histograms are too expensive and/or an average event size is sufficient.
    /// A Summary MetricPoint MAY consist of a Count, Sum, and a set of quantiles.
    /// Quantiles MUST be between 0 and 1 inclusive.
    Summary,

    /// A Histogram that has a number of buckets that count events, and a _sum and _count
    /// Histograms measure distributions of discrete events. Common examples are the latency of HTTP requests, function runtimes, or I/O request sizes.
    /// Histogram MetricPoints MUST have at least a bucket with an +Inf threshold. Buckets MUST be cumulative.
    /// The +Inf bucket counts all requests.
    Histogram,

    /// GaugeHistograms measure current distributions. Common examples are how long items have been waiting in a queue, or size of the requests in a queue.
    /// The buckets for a GaugeHistogram follow all the same rules as for a Histogram, and are rendered with _gcount and _gsum.
    GaugeHistogram,

    /// Exponentially bucketed latency distribution kept by the daemon itself. It has no exposition rendering.
    Distribution,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Unknown => "unknown",
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
            MetricType::StateSet => "stateset",
            MetricType::Info => "info",
            MetricType::Summary => "summary",
            MetricType::Histogram => "histogram",
            MetricType::GaugeHistogram => "gaugehistogram",
            MetricType::Distribution => "distribution",
        }
    }
}

impl TryFrom<&str> for MetricType {
    type Error = MetricError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "histogram" => Ok(MetricType::Histogram),
            "gaugehistogram" => Ok(MetricType::GaugeHistogram),
            "stateset" => Ok(MetricType::StateSet),
            "summary" => Ok(MetricType::Summary),
            "info" => Ok(MetricType::Info),
            "unknown" | "untyped" => Ok(MetricType::Unknown),
            _ => Err(MetricError::syntax(format!("invalid metric type: {}", value))),
        }
    }
}

impl Default for MetricType {
    fn default() -> Self {
        MetricType::Unknown
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterValue {
    UInt64(u64),
    Float64(f64),
}

impl CounterValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            CounterValue::UInt64(u) => *u as f64,
            CounterValue::Float64(f) => *f,
        }
    }
}

impl Default for CounterValue {
    fn default() -> Self {
        CounterValue::UInt64(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: String,
    pub enabled: bool,
}

/// States in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSet {
    states: Vec<State>,
}

impl StateSet {
    pub fn new() -> StateSet {
        StateSet::default()
    }

    pub fn from_states(states: &[(&str, bool)]) -> Result<StateSet> {
        let mut set = StateSet::new();
        for (name, enabled) in states {
            set.set(name, *enabled)?;
        }

        Ok(set)
    }

    pub fn set(&mut self, name: &str, enabled: bool) -> Result<()> {
        if name.is_empty() {
            return Err(MetricError::invalid("state name cannot be empty"));
        }

        match self.states.iter_mut().find(|s| s.name == name) {
            Some(state) => state.enabled = enabled,
            None => {
                self.states.try_reserve(1)?;
                self.states.push(State {
                    name: name.to_owned(),
                    enabled,
                });
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.states.iter().find(|s| s.name == name).map(|s| s.enabled)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    pub upper_bound: f64,
    pub count: f64,
}

/// Cumulative buckets sorted by upper bound. The last bucket is always +Inf and holds the total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    buckets: Vec<HistogramBucket>,
    pub sum: f64,
}

impl Default for Histogram {
    fn default() -> Self {
        Histogram::new()
    }
}

impl Histogram {
    pub fn new() -> Histogram {
        Histogram {
            buckets: vec![HistogramBucket {
                upper_bound: f64::INFINITY,
                count: 0.0,
            }],
            sum: 0.0,
        }
    }

    fn with_bounds<I>(bounds: I) -> Result<Histogram>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut histogram = Histogram::new();
        for bound in bounds {
            histogram.bucket_append(bound, 0.0)?;
        }

        Ok(histogram)
    }

    /// `num_buckets` buckets of `width` each, plus +Inf.
    pub fn linear(num_buckets: usize, width: f64) -> Result<Histogram> {
        if num_buckets == 0 || !(width > 0.0) {
            return Err(MetricError::invalid(format!(
                "linear histograms need at least one bucket and a positive width (got: {}, {})",
                num_buckets, width
            )));
        }

        Histogram::with_bounds((1..=num_buckets).map(|i| i as f64 * width))
    }

    /// Bounds `factor * base^k` for k in 1..=num_buckets, plus +Inf.
    pub fn exponential(num_buckets: usize, base: f64, factor: f64) -> Result<Histogram> {
        if num_buckets == 0 || !(base > 1.0) || !(factor > 0.0) {
            return Err(MetricError::invalid(format!(
                "exponential histograms need at least one bucket, a base above 1 and a positive factor (got: {}, {}, {})",
                num_buckets, base, factor
            )));
        }

        Histogram::with_bounds((1..=num_buckets).map(|k| factor * base.powi(k as i32)))
    }

    /// Bounds must be strictly increasing, above zero and finite. +Inf is added implicitly.
    pub fn custom(bounds: &[f64]) -> Result<Histogram> {
        let mut previous = 0.0;
        for bound in bounds {
            if !(*bound > previous) || bound.is_infinite() {
                return Err(MetricError::invalid(format!(
                    "custom histogram bounds must be finite, positive and strictly increasing (got: {:?})",
                    bounds
                )));
            }
            previous = *bound;
        }

        Histogram::with_bounds(bounds.iter().copied())
    }

    /// Sets the count of the bucket bounded by `upper_bound`, creating it in sorted position if needed.
    pub fn bucket_append(&mut self, upper_bound: f64, count: f64) -> Result<()> {
        if upper_bound.is_nan() {
            return Err(MetricError::invalid("histogram bucket bounds cannot be NaN"));
        }

        match self
            .buckets
            .binary_search_by(|b| b.upper_bound.total_cmp(&upper_bound))
        {
            Ok(i) => self.buckets[i].count = count,
            Err(i) => {
                self.buckets.try_reserve(1)?;
                self.buckets.insert(i, HistogramBucket { upper_bound, count });
            }
        }

        Ok(())
    }

    /// Records one observation.
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !(value >= 0.0) {
            return Err(MetricError::invalid(format!(
                "histogram observations cannot be negative (got: {})",
                value
            )));
        }

        for bucket in self.buckets.iter_mut().filter(|b| b.upper_bound >= value) {
            bucket.count += 1.0;
        }
        self.sum += value;

        Ok(())
    }

    pub fn reset(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.count = 0.0;
        }
        self.sum = 0.0;
    }

    pub fn buckets(&self) -> &[HistogramBucket] {
        &self.buckets
    }

    /// The +Inf bucket.
    pub fn count(&self) -> f64 {
        self.buckets.last().map(|b| b.count).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    quantiles: Vec<Quantile>,
    pub sum: f64,
    pub count: u64,
}

impl Summary {
    pub fn new() -> Summary {
        Summary::default()
    }

    /// Sets the value for `quantile`, keeping quantiles in ascending order.
    pub fn quantile_append(&mut self, quantile: f64, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(MetricError::invalid(format!(
                "quantiles must be between 0 and 1 (got: {})",
                quantile
            )));
        }

        match self
            .quantiles
            .binary_search_by(|q| q.quantile.total_cmp(&quantile))
        {
            Ok(i) => self.quantiles[i].value = value,
            Err(i) => {
                self.quantiles.try_reserve(1)?;
                self.quantiles.insert(i, Quantile { quantile, value });
            }
        }

        Ok(())
    }

    pub fn quantiles(&self) -> &[Quantile] {
        &self.quantiles
    }
}

/// Exponentially bucketed distribution. Bucket `i` counts observations up to `factor * base^(i+1)`,
/// with a final overflow bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    base: f64,
    factor: f64,
    buckets: Vec<u64>,
    sum: f64,
}

impl Distribution {
    pub fn exponential(num_buckets: usize, base: f64, factor: f64) -> Result<Distribution> {
        if num_buckets == 0 || !(base > 1.0) || !(factor > 0.0) {
            return Err(MetricError::invalid(format!(
                "invalid distribution parameters (got: {}, {}, {})",
                num_buckets, base, factor
            )));
        }

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(num_buckets + 1)?;
        buckets.resize(num_buckets + 1, 0);

        Ok(Distribution {
            base,
            factor,
            buckets,
            sum: 0.0,
        })
    }

    pub fn update(&mut self, value: f64) -> Result<()> {
        if !(value >= 0.0) {
            return Err(MetricError::invalid(format!(
                "distribution observations cannot be negative (got: {})",
                value
            )));
        }

        let last = self.buckets.len() - 1;
        let index = (0..last)
            .find(|i| value <= self.factor * self.base.powi(*i as i32 + 1))
            .unwrap_or(last);
        self.buckets[index] += 1;
        self.sum += value;

        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.buckets.iter().sum()
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// The payload of a single metric. Histogram families of both kinds share the histogram payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unknown(f64),
    Gauge(f64),
    Counter(CounterValue),
    StateSet(StateSet),
    Info(LabelSet),
    Summary(Summary),
    Histogram(Histogram),
    Distribution(Distribution),
}

impl Value {
    /// An empty value of the shape a metric of type `metric_type` carries.
    pub fn empty(metric_type: MetricType) -> Value {
        match metric_type {
            MetricType::Unknown => Value::Unknown(0.0),
            MetricType::Gauge => Value::Gauge(0.0),
            MetricType::Counter => Value::Counter(CounterValue::default()),
            MetricType::StateSet => Value::StateSet(StateSet::new()),
            MetricType::Info => Value::Info(LabelSet::new()),
            MetricType::Summary => Value::Summary(Summary::new()),
            MetricType::Histogram | MetricType::GaugeHistogram => Value::Histogram(Histogram::new()),
            MetricType::Distribution => Value::Distribution(Distribution {
                base: 2.0,
                factor: 1.0,
                buckets: vec![0],
                sum: 0.0,
            }),
        }
    }

    pub fn conforms_to(&self, metric_type: MetricType) -> bool {
        matches!(
            (self, metric_type),
            (Value::Unknown(_), MetricType::Unknown)
                | (Value::Gauge(_), MetricType::Gauge)
                | (Value::Counter(_), MetricType::Counter)
                | (Value::StateSet(_), MetricType::StateSet)
                | (Value::Info(_), MetricType::Info)
                | (Value::Summary(_), MetricType::Summary)
                | (Value::Histogram(_), MetricType::Histogram)
                | (Value::Histogram(_), MetricType::GaugeHistogram)
                | (Value::Distribution(_), MetricType::Distribution)
        )
    }

    pub fn has_payload(&self) -> bool {
        !matches!(self, Value::Unknown(_) | Value::Gauge(_) | Value::Counter(_))
    }

    /// Drops any owned payload, leaving an empty value of the same kind.
    pub fn release(&mut self) {
        *self = match self {
            Value::Unknown(_) => Value::Unknown(0.0),
            Value::Gauge(_) => Value::Gauge(0.0),
            Value::Counter(_) => Value::Counter(CounterValue::default()),
            Value::StateSet(_) => Value::StateSet(StateSet::new()),
            Value::Info(_) => Value::Info(LabelSet::new()),
            Value::Summary(_) => Value::Summary(Summary::new()),
            Value::Histogram(_) => Value::Histogram(Histogram::new()),
            Value::Distribution(_) => Value::empty(MetricType::Distribution),
        };
    }
}

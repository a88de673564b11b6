use crate::exposition::ParserConfig;
use crate::{numeric, CdTime, CounterValue, LabelSet, Metric, MetricError, MetricFamily, MetricType, Result, Value};

/// What a sample line contributes to the metric it lands in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleKind {
    Value,
    Created,
    Count,
    Sum,
    Bucket,
    Quantile,
    State,
}

impl SampleKind {
    /// Kinds that fill in a part of a composite value rather than making a new metric
    fn folds(&self) -> bool {
        !matches!(self, SampleKind::Value | SampleKind::Created)
    }
}

fn suffix_handlers(family_type: MetricType) -> &'static [(&'static str, SampleKind)] {
    match family_type {
        MetricType::Counter => &[
            ("_total", SampleKind::Value),
            ("_created", SampleKind::Created),
            ("", SampleKind::Value),
        ],
        MetricType::Info => &[("_info", SampleKind::Value), ("", SampleKind::Value)],
        MetricType::Summary => &[
            ("_count", SampleKind::Count),
            ("_sum", SampleKind::Sum),
            ("_created", SampleKind::Created),
            ("", SampleKind::Quantile),
        ],
        MetricType::Histogram => &[
            ("_bucket", SampleKind::Bucket),
            ("_count", SampleKind::Count),
            ("_sum", SampleKind::Sum),
            ("_created", SampleKind::Created),
        ],
        MetricType::GaugeHistogram => &[
            ("_bucket", SampleKind::Bucket),
            ("_gcount", SampleKind::Count),
            ("_gsum", SampleKind::Sum),
            ("_created", SampleKind::Created),
        ],
        MetricType::StateSet => &[("", SampleKind::State)],
        MetricType::Unknown | MetricType::Gauge | MetricType::Distribution => &[("", SampleKind::Value)],
    }
}

/// A family being assembled from exposition lines
#[derive(Debug)]
pub struct MetricFamilyMarshal {
    /// The family name as it appears in the input, before any configured prefix
    pub raw_name: String,
    pub family: MetricFamily,
}

impl MetricFamilyMarshal {
    pub fn new(raw_name: &str, config: &ParserConfig) -> Result<MetricFamilyMarshal> {
        let name = match &config.prefix {
            Some(prefix) => format!("{}{}", prefix, raw_name),
            None => raw_name.to_owned(),
        };

        Ok(MetricFamilyMarshal {
            raw_name: raw_name.to_owned(),
            family: MetricFamily::new(name, MetricType::Unknown)?,
        })
    }

    pub fn try_add_help(&mut self, help: &str) {
        self.family.help = Some(help.to_owned());
    }

    pub fn try_add_unit(&mut self, unit: &str) {
        self.family.unit = Some(unit.to_owned());
    }

    pub fn try_add_type(&mut self, family_type: MetricType) -> Result<()> {
        if !self.family.is_empty() {
            return Err(MetricError::syntax(format!(
                "TYPE for {} found after its samples",
                self.raw_name
            )));
        }

        self.family.family_type = family_type;
        Ok(())
    }

    /// Works out whether a sample called `sample_name` belongs to this family, and what it carries.
    pub fn match_sample(&self, sample_name: &str) -> Option<SampleKind> {
        suffix_handlers(self.family.family_type)
            .iter()
            .find(|(suffix, _)| sample_name.strip_suffix(suffix) == Some(self.raw_name.as_str()))
            .map(|(_, kind)| *kind)
    }

    pub fn process_new_metric(
        &mut self,
        kind: SampleKind,
        mut labels: LabelSet,
        value: &str,
        timestamp: Option<CdTime>,
        config: &ParserConfig,
    ) -> Result<()> {
        if kind == SampleKind::Created {
            return Ok(());
        }

        let special_label = match kind {
            SampleKind::Bucket => Some("le"),
            SampleKind::Quantile => Some("quantile"),
            SampleKind::State => Some(self.raw_name.as_str()),
            _ => None,
        };

        let special_value = match special_label {
            Some(name) => Some(labels.remove(name).ok_or_else(|| {
                MetricError::syntax(format!("sample for {} is missing its `{}` label", self.raw_name, name))
            })?),
            None => None,
        };

        labels.add_set(&config.labels, true)?;
        let time = config.timestamp.or(timestamp).unwrap_or(CdTime::ZERO);
        let family_type = self.family.family_type;

        let folds_into_last = kind.folds()
            && self
                .family
                .metrics()
                .last()
                .map_or(false, |m| m.labels == labels);

        if !folds_into_last {
            let mut metric = Metric::new(Value::empty(family_type)).with_labels(labels).with_time(time);
            metric.interval = config.interval.unwrap_or(CdTime::ZERO);
            self.family.push(metric)?;
        }

        let metric = match self.family.metrics_mut().last_mut() {
            Some(metric) => metric,
            None => return Err(MetricError::invalid("metric family lost its last metric")),
        };

        if !time.is_zero() {
            metric.time = time;
        }

        let special_value = special_value.unwrap_or_default();
        match (&mut metric.value, kind) {
            (Value::Unknown(v), SampleKind::Value) | (Value::Gauge(v), SampleKind::Value) => {
                *v = numeric::parse(value)?;
            }
            (Value::Counter(v), SampleKind::Value) => {
                *v = match value.parse::<u64>() {
                    Ok(u) => CounterValue::UInt64(u),
                    Err(_) => CounterValue::Float64(numeric::parse(value)?),
                };
            }
            (Value::Info(_), SampleKind::Value) => {}
            (Value::StateSet(states), SampleKind::State) => {
                states.set(&special_value, numeric::parse(value)? != 0.0)?;
            }
            (Value::Summary(summary), SampleKind::Quantile) => {
                summary.quantile_append(numeric::parse(&special_value)?, numeric::parse(value)?)?;
            }
            (Value::Summary(summary), SampleKind::Count) => {
                summary.count = parse_count(value)?;
            }
            (Value::Summary(summary), SampleKind::Sum) => {
                summary.sum = numeric::parse(value)?;
            }
            (Value::Histogram(histogram), SampleKind::Bucket) => {
                histogram.bucket_append(numeric::parse(&special_value)?, numeric::parse(value)?)?;
            }
            (Value::Histogram(histogram), SampleKind::Count) => {
                histogram.bucket_append(f64::INFINITY, numeric::parse(value)?)?;
            }
            (Value::Histogram(histogram), SampleKind::Sum) => {
                histogram.sum = numeric::parse(value)?;
            }
            (current, kind) => {
                return Err(MetricError::syntax(format!(
                    "a {:?} sample cannot update {:?}",
                    kind, current
                )))
            }
        }

        Ok(())
    }
}

fn parse_count(value: &str) -> Result<u64> {
    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }

    let count = numeric::parse(value)?;
    if count.is_finite() && count >= 0.0 && count.fract() == 0.0 {
        Ok(count as u64)
    } else {
        Err(MetricError::syntax(format!("counts must be non-negative integers (got: {})", value)))
    }
}

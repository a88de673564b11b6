use crate::{numeric, CounterValue, LabelPair, MetricError, MetricFamily, MetricType, Result, Value};

use super::{RenderableSample, SampleValue};

fn label(name: &str, value: String) -> [LabelPair; 1] {
    [LabelPair {
        name: name.to_owned(),
        value,
    }]
}

/// Expands every metric of `family` into flat samples, the way line oriented formats need them.
/// Histogram bucket samples get `bucket_suffix` appended to the family name.
pub fn render_samples<R>(family: &MetricFamily, bucket_suffix: &str, out: &mut R) -> Result<()>
where
    R: RenderableSample,
{
    let name = family.name.as_str();
    let (count_suffix, sum_suffix) = match family.family_type {
        MetricType::GaugeHistogram => ("_gcount", "_gsum"),
        _ => ("_count", "_sum"),
    };

    for metric in family.metrics() {
        let labels = metric.labels.as_slice();
        let time = metric.time;

        match &metric.value {
            Value::Unknown(v) | Value::Gauge(v) => {
                out.render_sample(name, "", labels, &[], SampleValue::Float(*v), time);
            }
            Value::Counter(counter) => {
                let value = match counter {
                    CounterValue::UInt64(u) => SampleValue::UInt(*u),
                    CounterValue::Float64(f) => SampleValue::Float(*f),
                };
                out.render_sample(name, "_total", labels, &[], value, time);
            }
            Value::StateSet(states) => {
                for state in states.iter() {
                    let extra = label(name, state.name.clone());
                    let value = SampleValue::UInt(state.enabled as u64);
                    out.render_sample(name, "", labels, &extra, value, time);
                }
            }
            Value::Info(info) => {
                out.render_sample(name, "_info", labels, info.as_slice(), SampleValue::UInt(1), time);
            }
            Value::Summary(summary) => {
                for quantile in summary.quantiles().iter().rev() {
                    let extra = label("quantile", numeric::format(quantile.quantile));
                    out.render_sample(name, "", labels, &extra, SampleValue::Float(quantile.value), time);
                }
                out.render_sample(name, "_count", labels, &[], SampleValue::UInt(summary.count), time);
                // truncated to an integer, unlike the histogram sum
                out.render_sample(name, "_sum", labels, &[], SampleValue::UInt(summary.sum as u64), time);
            }
            Value::Histogram(histogram) => {
                for bucket in histogram.buckets() {
                    let extra = label("le", numeric::format(bucket.upper_bound));
                    out.render_sample(name, bucket_suffix, labels, &extra, SampleValue::Float(bucket.count), time);
                }
                out.render_sample(name, count_suffix, labels, &[], SampleValue::Float(histogram.count()), time);
                out.render_sample(name, sum_suffix, labels, &[], SampleValue::Float(histogram.sum), time);
            }
            Value::Distribution(_) => {
                return Err(MetricError::UnsupportedValue(MetricType::Distribution));
            }
        }
    }

    Ok(())
}

use crate::{CounterValue, LabelSet, Metric, MetricError, MetricFamily, MetricType, Result, Value};

use super::render::JsonRender;

fn render_label_map(r: &mut JsonRender<'_>, labels: &LabelSet) -> Result<()> {
    r.map_open();
    for pair in labels {
        r.key_string(&pair.name, &pair.value)?;
    }
    r.map_close();
    Ok(())
}

fn render_metric(r: &mut JsonRender<'_>, family_type: MetricType, metric: &Metric) -> Result<()> {
    r.map_open();
    r.key("labels")?;
    render_label_map(r, &metric.labels)?;
    r.key("timestamp")?;
    r.uint(metric.time.as_ms());
    r.key("interval")?;
    r.uint(metric.interval.as_ms());

    match &metric.value {
        Value::Unknown(v) | Value::Gauge(v) => {
            r.key("value")?;
            r.double(*v);
        }
        Value::Counter(CounterValue::UInt64(u)) => {
            r.key("value")?;
            r.uint(*u);
        }
        Value::Counter(CounterValue::Float64(f)) => {
            r.key("value")?;
            r.double(*f);
        }
        Value::Info(info) => {
            r.key("info")?;
            render_label_map(r, info)?;
        }
        Value::StateSet(states) => {
            r.key("stateset")?;
            r.map_open();
            for state in states.iter() {
                r.key(&state.name)?;
                r.boolean(state.enabled);
            }
            r.map_close();
        }
        Value::Summary(summary) => {
            r.key("quantiles")?;
            r.array_open();
            for quantile in summary.quantiles().iter().rev() {
                r.array_open();
                r.double(quantile.quantile);
                r.double(quantile.value);
                r.array_close();
            }
            r.array_close();
            r.key("count")?;
            r.uint(summary.count);
            r.key("sum")?;
            r.uint(summary.sum as u64);
        }
        Value::Histogram(histogram) => {
            r.key("buckets")?;
            r.array_open();
            for bucket in histogram.buckets() {
                r.array_open();
                r.double(bucket.upper_bound);
                r.double(bucket.count);
                r.array_close();
            }
            r.array_close();

            let (count, sum) = match family_type {
                MetricType::GaugeHistogram => ("gcount", "gsum"),
                _ => ("count", "sum"),
            };
            r.key(count)?;
            r.double(histogram.count());
            r.key(sum)?;
            r.double(histogram.sum);
        }
        Value::Distribution(_) => return Err(MetricError::UnsupportedValue(MetricType::Distribution)),
    }

    r.map_close();
    Ok(())
}

/// Appends `family` as a single JSON object: its name, type, optional help and unit, and the
/// metrics with their payload nested by type.
pub fn write_json(buf: &mut String, family: &MetricFamily) -> Result<()> {
    if family.is_empty() {
        return Ok(());
    }

    let start = buf.len();
    let result = render_family(&mut JsonRender::new(buf), family);
    if result.is_err() {
        buf.truncate(start);
    }

    result
}

fn render_family(r: &mut JsonRender<'_>, family: &MetricFamily) -> Result<()> {
    r.map_open();
    r.key_string("metric", &family.name)?;
    r.key_string("type", family.family_type.as_str())?;
    if let Some(help) = &family.help {
        r.key_string("help", help)?;
    }
    if let Some(unit) = &family.unit {
        r.key_string("unit", unit)?;
    }

    r.key("metrics")?;
    r.array_open();
    for metric in family.metrics() {
        render_metric(r, family.family_type, metric)?;
    }
    r.array_close();

    r.map_close();
    Ok(())
}

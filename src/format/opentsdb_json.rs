use crate::internal::{merge_labels, render_samples, RenderableSample, SampleValue};
use crate::{CdTime, LabelPair, MetricError, MetricFamily, Result};

use super::render::JsonRender;

struct OpenTsdbRender<'a> {
    r: JsonRender<'a>,
    ttl: u32,
    error: Option<MetricError>,
}

impl OpenTsdbRender<'_> {
    fn try_render(
        &mut self,
        metric_name: &str,
        suffix: &str,
        labels: &[LabelPair],
        extra: &[LabelPair],
        value: SampleValue,
        time: CdTime,
    ) -> Result<()> {
        let r = &mut self.r;
        r.map_open();

        r.key("metric")?;
        r.string(&format!("{}{}", metric_name, suffix))?;

        if !labels.is_empty() || !extra.is_empty() {
            r.key("tags")?;
            r.map_open();
            for pair in merge_labels(labels, extra) {
                r.key_string(&pair.name, &pair.value)?;
            }
            r.map_close();
        }

        r.key("timestamp")?;
        r.uint(time.as_ms());

        if self.ttl != 0 {
            r.key("ttl")?;
            r.uint(self.ttl as u64);
        }

        r.key("value")?;
        match value {
            SampleValue::Float(f) => r.double(f),
            SampleValue::UInt(u) => r.uint(u),
        }

        r.map_close();
        Ok(())
    }
}

impl RenderableSample for OpenTsdbRender<'_> {
    fn render_sample(
        &mut self,
        metric_name: &str,
        suffix: &str,
        labels: &[LabelPair],
        extra: &[LabelPair],
        value: SampleValue,
        time: CdTime,
    ) {
        if self.error.is_some() {
            return;
        }

        if let Err(e) = self.try_render(metric_name, suffix, labels, extra, value, time) {
            self.error = Some(e);
        }
    }
}

/// Appends `family` as an OpenTSDB JSON array with one data point per sample.
/// Histogram buckets keep the family name and carry an `le` tag. A zero `ttl` is left out.
pub fn write_opentsdb_json(buf: &mut String, family: &MetricFamily, ttl: u32) -> Result<()> {
    if family.is_empty() {
        return Ok(());
    }

    let start = buf.len();
    let result = {
        let mut out = OpenTsdbRender {
            r: JsonRender::new(&mut *buf),
            ttl,
            error: None,
        };

        out.r.array_open();
        let rendered = render_samples(family, "", &mut out);
        out.r.array_close();

        match (rendered, out.error) {
            (Err(e), _) | (Ok(()), Some(e)) => Err(e),
            (Ok(()), None) => Ok(()),
        }
    };

    if result.is_err() {
        buf.truncate(start);
    }

    result
}

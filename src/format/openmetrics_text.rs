use std::fmt::Write;

use crate::internal::{merge_labels, render_label_values, render_samples, RenderableSample, SampleValue};
use crate::{numeric, CdTime, LabelPair, MetricFamily, Result};

struct OpenMetricsTextRender<'a> {
    buf: &'a mut String,
}

impl RenderableSample for OpenMetricsTextRender<'_> {
    fn render_sample(
        &mut self,
        metric_name: &str,
        suffix: &str,
        labels: &[LabelPair],
        extra: &[LabelPair],
        value: SampleValue,
        time: CdTime,
    ) {
        self.buf.push_str(metric_name);
        self.buf.push_str(suffix);
        render_label_values(self.buf, merge_labels(labels, extra));
        self.buf.push(' ');
        match value {
            SampleValue::Float(f) => numeric::write(self.buf, f),
            SampleValue::UInt(u) => {
                let _ = write!(self.buf, "{}", u);
            }
        }
        let _ = writeln!(self.buf, " {}", time.as_ms());
    }
}

/// Appends `family` in OpenMetrics text exposition: the `# TYPE`, `# HELP` and `# UNIT` descriptors
/// followed by one line per sample.
pub fn write_openmetrics_text(buf: &mut String, family: &MetricFamily) -> Result<()> {
    if family.is_empty() {
        return Ok(());
    }

    let start = buf.len();
    let _ = writeln!(buf, "# TYPE {} {}", family.name, family.family_type);
    if let Some(help) = &family.help {
        let _ = writeln!(buf, "# HELP {} {}", family.name, help);
    }
    if let Some(unit) = &family.unit {
        let _ = writeln!(buf, "# UNIT {} {}", family.name, unit);
    }

    let result = render_samples(family, "_bucket", &mut OpenMetricsTextRender { buf: &mut *buf });
    if result.is_err() {
        buf.truncate(start);
    }

    result
}

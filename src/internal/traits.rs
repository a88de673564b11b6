use crate::{CdTime, LabelPair};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Float(f64),
    UInt(u64),
}

/// Receives the flat samples a family expands to, in output order.
pub trait RenderableSample {
    /// `labels` are the metric's own labels, `extra` the labels the sample adds on top of them
    /// (info payload, `le`, `quantile`, state name). Both are sorted by name.
    fn render_sample(
        &mut self,
        metric_name: &str,
        suffix: &str,
        labels: &[LabelPair],
        extra: &[LabelPair],
        value: SampleValue,
        time: CdTime,
    );
}

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use pest::Parser;

use crate::exposition::{ExpositionGrammar, Rule};
use crate::internal::is_valid_metric_name;
use crate::{CdTime, LabelSet, MetricError, MetricType, Result, Value};

static NEXT_FAMILY_ID: AtomicU64 = AtomicU64::new(1);

/// Handle linking a Metric back to the MetricFamily that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FamilyId(u64);

impl FamilyId {
    /// Metrics that aren't owned by any family (templates).
    pub const DETACHED: FamilyId = FamilyId(0);

    fn next() -> FamilyId {
        FamilyId(NEXT_FAMILY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    String(String),
    Int(i64),
    UInt(u64),
    Double(f64),
    Bool(bool),
}

pub type MetaData = BTreeMap<String, MetaValue>;

/// One sample (a time series point) within a MetricFamily.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    family: FamilyId,
    pub labels: LabelSet,
    pub value: Value,
    pub time: CdTime,
    pub interval: CdTime,
    pub meta: Option<MetaData>,
}

impl Metric {
    pub fn new(value: Value) -> Metric {
        Metric {
            family: FamilyId::DETACHED,
            labels: LabelSet::new(),
            value,
            time: CdTime::ZERO,
            interval: CdTime::ZERO,
            meta: None,
        }
    }

    pub fn with_labels(mut self, labels: LabelSet) -> Metric {
        self.labels = labels;
        self
    }

    pub fn with_time(mut self, time: CdTime) -> Metric {
        self.time = time;
        self
    }

    pub fn family(&self) -> FamilyId {
        self.family
    }

    /// Drops labels, metadata and payload and zeroes the record. The value keeps its kind.
    pub fn reset(&mut self) {
        self.labels.clear();
        self.meta = None;
        self.value.release();
        self.time = CdTime::ZERO;
        self.interval = CdTime::ZERO;
    }
}

/// A MetricFamily is a collection of metrics with the same type and name
#[derive(Debug)]
pub struct MetricFamily {
    id: FamilyId,
    pub name: String,
    pub help: Option<String>,
    pub unit: Option<String>,
    pub family_type: MetricType,
    metrics: Vec<Metric>,
}

impl Default for MetricFamily {
    fn default() -> Self {
        MetricFamily {
            id: FamilyId::next(),
            name: String::new(),
            help: None,
            unit: None,
            family_type: MetricType::default(),
            metrics: Vec::new(),
        }
    }
}

impl MetricFamily {
    pub fn new<S: Into<String>>(name: S, family_type: MetricType) -> Result<MetricFamily> {
        let name = name.into();
        if !is_valid_metric_name(&name) {
            return Err(MetricError::InvalidName(name));
        }

        Ok(MetricFamily {
            id: FamilyId::next(),
            name,
            help: None,
            unit: None,
            family_type,
            metrics: Vec::new(),
        })
    }

    pub fn id(&self) -> FamilyId {
        self.id
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut [Metric] {
        &mut self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn check_value(&self, value: &Value) -> Result<()> {
        if self.name.is_empty() {
            return Err(MetricError::invalid("metric family has no name"));
        }

        if !value.conforms_to(self.family_type) {
            return Err(MetricError::invalid(format!(
                "value {:?} doesn't belong in a {} family",
                value, self.family_type
            )));
        }

        Ok(())
    }

    /// Appends a fully built metric, taking ownership of it.
    pub fn push(&mut self, mut metric: Metric) -> Result<()> {
        self.check_value(&metric.value)?;
        self.metrics.try_reserve(1)?;
        metric.family = self.id;
        self.metrics.push(metric);
        Ok(())
    }

    /// Builds a metric from `template` (labels, time, interval and metadata are copied), `value` and an
    /// optional extra label, then appends it. The family is left untouched on error.
    pub fn append(
        &mut self,
        template: Option<&Metric>,
        value: Value,
        label_name: Option<&str>,
        label_value: Option<&str>,
    ) -> Result<()> {
        self.check_value(&value)?;

        let mut metric = match template {
            Some(template) => Metric {
                family: FamilyId::DETACHED,
                labels: template.labels.clone(),
                value,
                time: template.time,
                interval: template.interval,
                meta: template.meta.clone(),
            },
            None => Metric::new(value),
        };

        match (label_name, label_value) {
            (Some(name), Some(value)) => metric.labels.add(name, value)?,
            (None, None) => {}
            _ => {
                return Err(MetricError::invalid(
                    "extra label needs both a name and a value",
                ))
            }
        }

        self.push(metric)
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Metric) -> bool,
    {
        self.metrics.retain(f);
    }

    /// Drops every metric, keeping the family itself reusable.
    pub fn reset_metrics(&mut self) {
        self.metrics.clear();
    }

    /// Deep copy with a fresh id. Fails instead of aborting when memory runs out.
    pub fn try_clone(&self) -> Result<MetricFamily> {
        let id = FamilyId::next();
        let mut metrics = Vec::new();
        metrics.try_reserve_exact(self.metrics.len())?;
        for metric in self.metrics.iter() {
            let mut metric = metric.clone();
            metric.family = id;
            metrics.push(metric);
        }

        Ok(MetricFamily {
            id,
            name: self.name.clone(),
            help: self.help.clone(),
            unit: self.unit.clone(),
            family_type: self.family_type,
            metrics,
        })
    }

    /// `name{labels}` for one of this family's metrics.
    pub fn metric_identity(&self, metric: &Metric) -> String {
        metric.labels.marshal(&self.name)
    }

    /// Rebuilds a single metric UNKNOWN family from an identity string produced by `metric_identity`.
    pub fn parse_identity(identity: &str) -> Result<MetricFamily> {
        let pair = ExpositionGrammar::parse(Rule::identity, identity)?
            .next()
            .ok_or_else(|| MetricError::syntax("expected a metric identity"))?;

        if pair.as_span().end() != identity.len() {
            return Err(MetricError::syntax(format!(
                "unexpected text after metric identity: {:?}",
                &identity[pair.as_span().end()..]
            )));
        }

        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| MetricError::syntax("expected a metric name"))?
            .as_str();
        let labels = match inner.next() {
            Some(labels) => LabelSet::from_rule(labels)?,
            None => LabelSet::new(),
        };

        let mut family = MetricFamily::new(name, MetricType::Unknown)?;
        family.push(Metric::new(Value::Unknown(0.0)).with_labels(labels))?;
        Ok(family)
    }
}

impl Clone for MetricFamily {
    fn clone(&self) -> Self {
        let id = FamilyId::next();
        MetricFamily {
            id,
            name: self.name.clone(),
            help: self.help.clone(),
            unit: self.unit.clone(),
            family_type: self.family_type,
            metrics: self
                .metrics
                .iter()
                .map(|m| Metric {
                    family: id,
                    ..m.clone()
                })
                .collect(),
        }
    }
}

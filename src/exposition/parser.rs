use std::{convert::TryFrom, mem};

use pest::{iterators::Pair, Parser};
use serde::Deserialize;

use crate::internal::{MetricFamilyMarshal, SampleKind};
use crate::matcher::MetricMatch;
use crate::{CdTime, LabelSet, MetricError, MetricFamily, MetricType, Result};

#[derive(Parser)]
#[grammar = "exposition/exposition.pest"]
pub struct ExpositionGrammar;

/// Adjustments applied to everything a parser reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Prepended to every family name
    pub prefix: Option<String>,
    /// Added to every metric, replacing labels of the same name
    pub labels: LabelSet,
    pub interval: Option<CdTime>,
    /// Used instead of any timestamp found in the input
    pub timestamp: Option<CdTime>,
}

/// Receives the families a parser completed.
pub trait FamilySink {
    fn dispatch(&mut self, family: MetricFamily) -> Result<()>;
}

impl<F> FamilySink for F
where
    F: FnMut(MetricFamily) -> Result<()>,
{
    fn dispatch(&mut self, family: MetricFamily) -> Result<()> {
        self(family)
    }
}

/// Incremental exposition parser. Bytes are fed in arbitrary chunks; completed families queue up
/// until they are handed over with [`ExpositionParser::dispatch`].
#[derive(Debug)]
pub struct ExpositionParser {
    config: ParserConfig,
    pending: Vec<u8>,
    line: usize,
    current: Option<MetricFamilyMarshal>,
    completed: Vec<MetricFamily>,
    failed: bool,
}

impl ExpositionParser {
    pub fn new(config: ParserConfig) -> ExpositionParser {
        ExpositionParser {
            config,
            pending: Vec::new(),
            line: 0,
            current: None,
            completed: Vec::new(),
            failed: false,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Drops all buffered state so the parser can start over, including after a syntax error.
    pub fn reset(&mut self) {
        tracing::trace!(line = self.line, "resetting exposition parser");
        self.pending.clear();
        self.line = 0;
        self.current = None;
        self.completed.clear();
        self.failed = false;
    }

    /// Parses every complete line in `bytes`, keeping a trailing partial line for the next call.
    /// An empty chunk marks the end of the input.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return self.finish();
        }

        self.check_usable()?;
        self.pending.try_reserve(bytes.len())?;
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        let mut result = Ok(());
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let line = self.pending[start..end].to_vec();
            start = end + 1;

            result = self.process_line(&line);
            if result.is_err() {
                break;
            }
        }

        self.pending.drain(..start);
        self.poison_on_error(result)
    }

    /// Parses whatever partial line is left and completes the family being built.
    pub fn finish(&mut self) -> Result<()> {
        self.check_usable()?;

        let result = if self.pending.is_empty() {
            Ok(())
        } else {
            let line = mem::take(&mut self.pending);
            self.process_line(&line)
        };
        self.poison_on_error(result)?;

        self.flush();
        Ok(())
    }

    /// Hands every completed family to `sink`. Metrics rejected by `filter` are dropped, and families
    /// left without metrics are skipped. Metrics without a timestamp get `time`.
    pub fn dispatch<S>(&mut self, sink: &mut S, filter: Option<&MetricMatch>, time: CdTime) -> Result<usize>
    where
        S: FamilySink + ?Sized,
    {
        let mut dispatched = 0;
        for mut family in mem::take(&mut self.completed) {
            if let Some(filter) = filter {
                let name = family.name.clone();
                family.retain(|m| filter.matches(&name, &m.labels));
            }

            if family.is_empty() {
                continue;
            }

            for metric in family.metrics_mut() {
                if metric.time.is_zero() {
                    metric.time = time;
                }
            }

            sink.dispatch(family)?;
            dispatched += 1;
        }

        tracing::debug!(dispatched, "dispatched metric families");
        Ok(dispatched)
    }

    /// Takes the completed families without going through a sink.
    pub fn take_families(&mut self) -> Vec<MetricFamily> {
        mem::take(&mut self.completed)
    }

    fn check_usable(&self) -> Result<()> {
        if self.failed {
            return Err(MetricError::SyntaxError {
                line: self.line,
                message: "parser must be reset after a syntax error".to_owned(),
            });
        }

        Ok(())
    }

    fn poison_on_error(&mut self, result: Result<()>) -> Result<()> {
        if result.is_err() {
            self.failed = true;
            self.current = None;
        }

        result
    }

    fn flush(&mut self) {
        if let Some(marshal) = self.current.take() {
            if marshal.family.is_empty() {
                tracing::trace!(family = %marshal.family.name, "dropping metric family without samples");
                return;
            }

            tracing::trace!(
                family = %marshal.family.name,
                metrics = marshal.family.len(),
                "metric family complete"
            );
            self.completed.push(marshal.family);
        }
    }

    /// Makes `raw_name` the family being built, completing the previous one if it differs.
    fn switch_family(&mut self, raw_name: &str) -> Result<&mut MetricFamilyMarshal> {
        let same = matches!(&self.current, Some(marshal) if marshal.raw_name == raw_name);
        if !same {
            self.flush();
            self.current = Some(MetricFamilyMarshal::new(raw_name, &self.config)?);
        }

        match self.current.as_mut() {
            Some(marshal) => Ok(marshal),
            None => Err(MetricError::invalid("no metric family to add to")),
        }
    }

    fn process_line(&mut self, bytes: &[u8]) -> Result<()> {
        self.line += 1;
        let line_no = self.line;

        let text = std::str::from_utf8(bytes)
            .map_err(|e| MetricError::SyntaxError {
                line: line_no,
                message: format!("invalid UTF-8: {}", e),
            })?
            .trim_end_matches('\r');

        self.parse_line(text).map_err(|e| e.at_line(line_no))
    }

    fn parse_line(&mut self, text: &str) -> Result<()> {
        let line = ExpositionGrammar::parse(Rule::line, text)?
            .next()
            .ok_or_else(|| MetricError::syntax("empty parse"))?;

        for pair in line.into_inner() {
            match pair.as_rule() {
                Rule::comment => self.parse_comment(pair)?,
                Rule::sample => self.parse_sample(pair)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn parse_comment(&mut self, pair: Pair<'_, Rule>) -> Result<()> {
        let inner = match pair.into_inner().next() {
            Some(inner) => inner,
            None => return Ok(()),
        };

        match inner.as_rule() {
            Rule::descriptor => self.parse_descriptor(inner),
            Rule::eof => {
                self.flush();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn parse_descriptor(&mut self, pair: Pair<'_, Rule>) -> Result<()> {
        let mut descriptor = pair.into_inner();
        let keyword = descriptor
            .next()
            .ok_or_else(|| MetricError::syntax("expected HELP, TYPE or UNIT"))?
            .as_rule();
        let metric_name = descriptor
            .next()
            .filter(|p| p.as_rule() == Rule::metric_name)
            .ok_or_else(|| MetricError::syntax("expected a metric name"))?
            .as_str();
        let text = descriptor.next().map(|p| p.as_str().trim_end());

        let family = self.switch_family(metric_name)?;
        match keyword {
            Rule::kw_help => family.try_add_help(text.unwrap_or("")),
            Rule::kw_type => {
                let family_type = text.ok_or_else(|| MetricError::syntax("TYPE needs a metric type"))?;
                family.try_add_type(MetricType::try_from(family_type)?)?;
            }
            Rule::kw_unit => {
                let unit = text.ok_or_else(|| MetricError::syntax("UNIT needs a unit"))?;
                family.try_add_unit(unit);
            }
            _ => return Err(MetricError::syntax("expected HELP, TYPE or UNIT")),
        }

        Ok(())
    }

    fn parse_sample(&mut self, pair: Pair<'_, Rule>) -> Result<()> {
        let mut descriptor = pair.into_inner();
        let metric_name = descriptor
            .next()
            .ok_or_else(|| MetricError::syntax("expected a metric name"))?
            .as_str();

        let mut next = descriptor.next();
        let labels = match next.take() {
            Some(labels) if labels.as_rule() == Rule::labels => {
                next = descriptor.next();
                LabelSet::from_rule(labels)?
            }
            other => {
                next = other;
                LabelSet::new()
            }
        };

        let value = next
            .ok_or_else(|| MetricError::syntax("expected a sample value"))?
            .as_str();

        let timestamp = match descriptor.next() {
            Some(ts) => Some(CdTime::from_ms(ts.as_str().parse::<u64>().map_err(|_| {
                MetricError::syntax(format!("timestamp must be an integer number of milliseconds (got: {})", ts.as_str()))
            })?)),
            None => None,
        };

        let kind = self
            .current
            .as_ref()
            .and_then(|marshal| marshal.match_sample(metric_name));
        let kind = match kind {
            Some(kind) => kind,
            None => {
                self.switch_family(metric_name)?;
                SampleKind::Value
            }
        };

        let config = &self.config;
        match self.current.as_mut() {
            Some(marshal) => marshal.process_new_metric(kind, labels, value, timestamp, config),
            None => Err(MetricError::invalid("no metric family to add to")),
        }
    }
}

/// Parses a complete exposition document.
pub fn parse_exposition(text: &str, config: &ParserConfig) -> Result<Vec<MetricFamily>> {
    let mut parser = ExpositionParser::new(config.clone());
    parser.feed(text.as_bytes())?;
    parser.finish()?;
    Ok(parser.take_families())
}

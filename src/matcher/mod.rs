use std::{convert::TryFrom, fmt};

use pest::Parser;
use regex::Regex;

use crate::exposition::{ExpositionGrammar, Rule};
use crate::internal::{is_valid_label_name, unescape_label_value};
use crate::{LabelSet, MetricError, Result};


/// Pseudo label that selects on the family name
pub const NAME_LABEL: &str = "__name__";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchOp {
    Eql,
    Neq,
    EqlRe,
    NeqRe,
}

impl TryFrom<&str> for MatchOp {
    type Error = MetricError;

    fn try_from(op: &str) -> Result<Self> {
        match op {
            "=" => Ok(MatchOp::Eql),
            "!=" => Ok(MatchOp::Neq),
            "=~" => Ok(MatchOp::EqlRe),
            "!~" => Ok(MatchOp::NeqRe),
            _ => Err(MetricError::syntax(format!("unexpected match operator {:?}", op))),
        }
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchOp::Eql => "=",
            MatchOp::Neq => "!=",
            MatchOp::EqlRe => "=~",
            MatchOp::NeqRe => "!~",
        })
    }
}

#[derive(Debug, Clone)]
enum Condition {
    Equal(String),
    NotEqual(String),
    Regex(Regex),
    NotRegex(Regex),
    Exists,
    NotExists,
}

#[derive(Debug, Clone)]
struct LabelMatcher {
    label: String,
    condition: Condition,
}

impl LabelMatcher {
    fn new(label: &str, op: MatchOp, value: &str) -> Result<LabelMatcher> {
        if label != NAME_LABEL && !is_valid_label_name(label) {
            return Err(MetricError::InvalidName(label.to_owned()));
        }

        let condition = match (op, value.is_empty()) {
            (MatchOp::Eql, true) => Condition::NotExists,
            (MatchOp::Neq, true) => Condition::Exists,
            (MatchOp::Eql, false) => Condition::Equal(value.to_owned()),
            (MatchOp::Neq, false) => Condition::NotEqual(value.to_owned()),
            (MatchOp::EqlRe, _) => Condition::Regex(compile(value)?),
            (MatchOp::NeqRe, _) => Condition::NotRegex(compile(value)?),
        };

        Ok(LabelMatcher {
            label: label.to_owned(),
            condition,
        })
    }

    fn matches(&self, value: Option<&str>) -> bool {
        let value = match (value, &self.condition) {
            (None, Condition::NotExists) => return true,
            (None, _) => return false,
            (Some(value), _) => value,
        };

        match &self.condition {
            Condition::Equal(want) => want == value,
            Condition::NotEqual(want) => want != value,
            Condition::Regex(re) => re.is_match(value),
            Condition::NotRegex(re) => !re.is_match(value),
            Condition::Exists => true,
            Condition::NotExists => false,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| MetricError::invalid(format!("bad regular expression {:?}: {}", pattern, e)))
}

/// A conjunction of label conditions, written `name{label op "value",...}`.
/// An empty value turns `=` into "label is absent" and `!=` into "label is present".
#[derive(Debug, Clone, Default)]
pub struct MetricMatch {
    matchers: Vec<LabelMatcher>,
}

impl MetricMatch {
    pub fn new() -> MetricMatch {
        MetricMatch::default()
    }

    pub fn parse(selector: &str) -> Result<MetricMatch> {
        let pair = ExpositionGrammar::parse(Rule::selector, selector)?
            .next()
            .ok_or_else(|| MetricError::syntax("expected a selector"))?;

        let mut result = MetricMatch::new();
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::metric_name => result.add(NAME_LABEL, MatchOp::Eql, part.as_str())?,
                Rule::matchers => {
                    for matcher in part.into_inner() {
                        let mut inner = matcher.into_inner();
                        let (label, op, value) = match (inner.next(), inner.next(), inner.next()) {
                            (Some(label), Some(op), Some(value)) => (label, op, value),
                            _ => return Err(MetricError::syntax("malformed label matcher")),
                        };

                        let op = MatchOp::try_from(op.as_str())?;
                        result.add(label.as_str(), op, &unescape_label_value(value.as_str()))?;
                    }
                }
                _ => {}
            }
        }

        Ok(result)
    }

    pub fn add(&mut self, label: &str, op: MatchOp, value: &str) -> Result<()> {
        let matcher = LabelMatcher::new(label, op, value)?;
        self.matchers.try_reserve(1)?;
        self.matchers.push(matcher);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True when every condition holds for the metric `labels` of family `name`.
    pub fn matches(&self, name: &str, labels: &LabelSet) -> bool {
        self.matchers.iter().all(|m| {
            let value = if m.label == NAME_LABEL {
                Some(name)
            } else {
                labels.get(&m.label)
            };
            m.matches(value)
        })
    }
}

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    convert::TryFrom,
    fmt,
};

use pest::Parser;
use serde::Deserialize;

use crate::exposition::{ExpositionGrammar, Rule};
use crate::internal::{is_valid_label_name, render_label_values, unescape_label_value};
use crate::{MetricError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

/// The identity of a time series within a family.
/// Pairs are kept sorted by name with every name appearing at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct LabelSet {
    pairs: Vec<LabelPair>,
}

impl LabelSet {
    pub fn new() -> LabelSet {
        LabelSet { pairs: Vec::new() }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<LabelSet> {
        let mut set = LabelSet::new();
        for (name, value) in pairs {
            set.add(name, value)?;
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelPair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[LabelPair] {
        &self.pairs
    }

    fn position(&self, name: &str) -> std::result::Result<usize, usize> {
        self.pairs.binary_search_by(|p| p.name.as_str().cmp(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).ok().map(|i| self.pairs[i].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_ok()
    }

    /// Inserts or overwrites `name`. An empty value removes the label.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        if !is_valid_label_name(name) {
            return Err(MetricError::InvalidName(name.to_owned()));
        }

        if value.is_empty() {
            self.remove(name);
            return Ok(());
        }

        match self.position(name) {
            Ok(i) => {
                self.pairs[i].value = value.to_owned();
            }
            Err(i) => {
                self.pairs.try_reserve(1)?;
                self.pairs.insert(
                    i,
                    LabelPair {
                        name: name.to_owned(),
                        value: value.to_owned(),
                    },
                );
            }
        }

        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        match self.position(name) {
            Ok(i) => Some(self.pairs.remove(i).value),
            Err(_) => None,
        }
    }

    /// Copies every pair of `other` into this set. Existing names are only replaced when `overwrite` is set.
    pub fn add_set(&mut self, other: &LabelSet, overwrite: bool) -> Result<()> {
        for pair in other.iter() {
            if !overwrite && self.contains(&pair.name) {
                continue;
            }
            self.add(&pair.name, &pair.value)?;
        }

        Ok(())
    }

    /// Renames the label `from` to `to`, keeping its value. Returns false if `from` isn't present.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<bool> {
        if !is_valid_label_name(to) {
            return Err(MetricError::InvalidName(to.to_owned()));
        }

        match self.remove(from) {
            Some(value) => {
                self.add(to, &value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// The series identity string: `name{k="v",...}`, with the braces only present when there are labels.
    pub fn marshal(&self, name: &str) -> String {
        let mut buf = String::with_capacity(name.len() + self.pairs.len() * 16);
        buf.push_str(name);
        render_label_values(&mut buf, self.pairs.iter());
        buf
    }

    /// Reads a `{k="v",...}` block from the front of `cursor`, leaving the cursor on the first byte after it.
    /// That byte has to be the end of the input or a space.
    pub fn unmarshal(cursor: &mut &str) -> Result<LabelSet> {
        let input = *cursor;
        let labels = ExpositionGrammar::parse(Rule::label_set, input)?
            .next()
            .ok_or_else(|| MetricError::syntax("expected a label set"))?;

        let end = labels.as_span().end();
        let rest = &input[end..];
        if !(rest.is_empty() || rest.starts_with(' ')) {
            return Err(MetricError::syntax(format!("unexpected text after label set: {:?}", rest)));
        }

        let set = LabelSet::from_rule(labels)?;
        *cursor = rest;
        Ok(set)
    }

    pub(crate) fn from_rule(pair: pest::iterators::Pair<'_, Rule>) -> Result<LabelSet> {
        debug_assert!(matches!(pair.as_rule(), Rule::labels | Rule::label_set));

        let mut set = LabelSet::new();
        for label in pair.into_inner().filter(|p| p.as_rule() == Rule::label) {
            let mut inner = label.into_inner();
            let (name, value) = match (inner.next(), inner.next()) {
                (Some(name), Some(value)) => (name.as_str(), value.as_str()),
                _ => return Err(MetricError::syntax("malformed label")),
            };

            if set.contains(name) {
                return Err(MetricError::syntax(format!(
                    "found label `{}` twice in the same labelset",
                    name
                )));
            }

            set.add(name, &unescape_label_value(value))?;
        }

        Ok(set)
    }
}

/// Larger sets sort after smaller ones; equal sized sets compare pair by pair.
impl Ord for LabelSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pairs.len().cmp(&other.pairs.len()).then_with(|| {
            for (a, b) in self.pairs.iter().zip(other.pairs.iter()) {
                let ord = a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
    }
}

impl PartialOrd for LabelSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<BTreeMap<String, String>> for LabelSet {
    type Error = MetricError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self> {
        let mut set = LabelSet::new();
        for (name, value) in map.iter() {
            set.add(name, value)?;
        }

        Ok(set)
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a LabelPair;
    type IntoIter = std::slice::Iter<'a, LabelPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marshal(""))
    }
}

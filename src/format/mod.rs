use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{MetricError, MetricFamily, Result};

mod json;
mod openmetrics_text;
mod opentsdb_json;
mod render;

#[cfg(test)]
mod tests;

pub use json::write_json;
pub use openmetrics_text::write_openmetrics_text;
pub use opentsdb_json::write_opentsdb_json;

/// Output formats a MetricFamily can be encoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    OpenMetrics,
    Json,
    OpenTsdb,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::OpenMetrics => "openmetrics",
            Format::Json => "json",
            Format::OpenTsdb => "opentsdb",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::OpenMetrics
    }
}

impl FromStr for Format {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openmetrics" => Ok(Format::OpenMetrics),
            "json" => Ok(Format::Json),
            "opentsdb" => Ok(Format::OpenTsdb),
            _ => Err(MetricError::invalid(format!("unknown format: {}", s))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderConfig {
    #[serde(default)]
    pub format: Format,
    /// Seconds, only used by OpenTSDB
    #[serde(default)]
    pub ttl: u32,
}

/// Appends `family` to `buf` in the configured format. On error `buf` is left as it was.
pub fn encode_family(buf: &mut String, family: &MetricFamily, config: &EncoderConfig) -> Result<()> {
    match config.format {
        Format::OpenMetrics => write_openmetrics_text(buf, family),
        Format::Json => write_json(buf, family),
        Format::OpenTsdb => write_opentsdb_json(buf, family, config.ttl),
    }
}

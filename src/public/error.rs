use std::collections::TryReserveError;

use thiserror::Error;

use crate::exposition::Rule;
use crate::MetricType;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("out of memory")]
    OutOfMemory,

    #[error("syntax error at line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    /// Distribution values have no text rendering
    #[error("{0} values cannot be encoded")]
    UnsupportedValue(MetricType),

    #[error("invalid number: {0:?}")]
    ParseError(String),
}

impl MetricError {
    pub(crate) fn syntax<S: Into<String>>(message: S) -> Self {
        MetricError::SyntaxError {
            line: 1,
            message: message.into(),
        }
    }

    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        MetricError::InvalidArgument(message.into())
    }

    /// Re-anchors a syntax error produced from a single line at its position in the stream.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            MetricError::SyntaxError { message, .. } => MetricError::SyntaxError { line, message },
            MetricError::ParseError(s) => MetricError::SyntaxError {
                line,
                message: format!("invalid number: {:?}", s),
            },
            other => other,
        }
    }
}

impl From<pest::error::Error<Rule>> for MetricError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let line = match err.line_col {
            pest::error::LineColLocation::Pos((line, _)) => line,
            pest::error::LineColLocation::Span((line, _), _) => line,
        };

        MetricError::SyntaxError {
            line,
            message: err.variant.message().into_owned(),
        }
    }
}

impl From<TryReserveError> for MetricError {
    fn from(_: TryReserveError) -> Self {
        MetricError::OutOfMemory
    }
}

pub type Result<T> = std::result::Result<T, MetricError>;

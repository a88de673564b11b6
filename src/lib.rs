extern crate pest;
#[macro_use]
extern crate pest_derive;

mod internal;
pub mod exposition;
pub mod format;
pub mod matcher;
pub mod numeric;
pub mod rate;
mod public;
pub use public::*;

pub use exposition::{parse_exposition, ExpositionParser, FamilySink, ParserConfig};
pub use format::{encode_family, EncoderConfig, Format};
pub use matcher::{MatchOp, MetricMatch};
pub use rate::RateTracker;

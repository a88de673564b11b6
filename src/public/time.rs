use std::{convert::TryFrom, fmt};

use auto_ops::impl_op_ex;
use serde::Deserialize;

const FRACTION_BITS: u32 = 30;
const FRACTION_MASK: u64 = (1 << FRACTION_BITS) - 1;

/// Daemon time: a fixed point number with 2^30 units per second.
/// Used both for timestamps (since the unix epoch) and for intervals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "f64")]
pub struct CdTime(u64);

impl CdTime {
    pub const ZERO: CdTime = CdTime(0);

    pub const fn from_raw(raw: u64) -> CdTime {
        CdTime(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn from_secs(secs: u64) -> CdTime {
        CdTime(secs << FRACTION_BITS)
    }

    pub fn from_secs_f64(secs: f64) -> CdTime {
        CdTime((secs * (1u64 << FRACTION_BITS) as f64) as u64)
    }

    pub fn from_ms(ms: u64) -> CdTime {
        let secs = (ms / 1000) << FRACTION_BITS;
        let frac = (((ms % 1000) << FRACTION_BITS) + 500) / 1000;
        CdTime(secs | frac)
    }

    /// Milliseconds, rounded to nearest.
    pub fn as_ms(&self) -> u64 {
        let secs = (self.0 >> FRACTION_BITS) * 1000;
        let frac = ((self.0 & FRACTION_MASK) * 1000 + (1 << (FRACTION_BITS - 1))) >> FRACTION_BITS;
        secs + frac
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / (1u64 << FRACTION_BITS) as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl_op_ex!(+ |a: &CdTime, b: &CdTime| -> CdTime { CdTime(a.0.wrapping_add(b.0)) });
impl_op_ex!(-|a: &CdTime, b: &CdTime| -> CdTime { CdTime(a.0.saturating_sub(b.0)) });
impl_op_ex!(+= |a: &mut CdTime, b: &CdTime| { a.0 = a.0.wrapping_add(b.0) });

impl TryFrom<f64> for CdTime {
    type Error = String;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(format!("time must be a non-negative number of seconds (got: {})", secs));
        }

        Ok(CdTime::from_secs_f64(secs))
    }
}

impl fmt::Display for CdTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_secs_f64())
    }
}

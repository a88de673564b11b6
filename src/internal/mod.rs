mod marshals;
mod samples;
mod traits;
mod utils;

pub use marshals::*;
pub use samples::*;
pub use traits::*;
pub use utils::*;

mod error;
mod labels;
mod model;
mod time;
mod value;


pub use error::*;
pub use labels::*;
pub use model::*;
pub use time::*;
pub use value::*;

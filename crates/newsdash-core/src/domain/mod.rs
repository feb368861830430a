mod record;
mod symbol;
mod timestamp;

pub use record::{columns, Record};
pub use symbol::Symbol;
pub use timestamp::{NewsDate, UtcDateTime};

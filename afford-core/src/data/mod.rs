//! Rate data consumed by the calculators.

mod source;
mod tables;

pub use source::RateSource;
pub use tables::RateTables;

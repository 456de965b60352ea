pub mod calculations;
pub mod data;
pub mod models;

pub use calculations::{AffordabilityError, AffordabilityRequest, AffordabilitySolver};
pub use data::{RateSource, RateTables};
pub use models::*;

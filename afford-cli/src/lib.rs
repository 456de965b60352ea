//! Command-line front end for the home affordability calculator.

pub mod app;
pub mod form;
pub mod logging;
pub mod report;
pub mod scenario_loader;
pub mod utils;

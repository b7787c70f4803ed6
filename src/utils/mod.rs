//! Module for additional computational capabilities
pub mod grid;
pub mod test_helper;
pub mod unit_format;
pub mod uom_macros;
pub use grid::linspace;

//! Display models for CLI output
//!
//! Flattened, column-named views of client models for table and JSON output.

pub mod display;

pub use display::{BatchStepDisplay, NodeDisplay, PageDisplay, StatsDisplay, VariableDisplay};

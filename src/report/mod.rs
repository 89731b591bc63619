//! Read-only projections over engine state for presentation layers.

pub mod export_csv;
mod summary;

pub use export_csv::{trace_to_string, write_trace, write_trace_file, write_traces};
pub use summary::{summarize, AutomatedPointsSummary, OtherShips, SHIP_LINES};

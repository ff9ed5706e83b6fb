//! Terminal output formatting for appstat
//!
//! Table and JSON renderings of the dashboard reports, plus the markdown
//! narrative report of the engagement view.

pub mod narrative;
pub mod output;

pub use narrative::render_report;
pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};

//! Report output

pub mod formatter;

pub use formatter::{save_report_to_file, suggest_filename, MatchReport, ReportGenerator};

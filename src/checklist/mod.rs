// Alert checklist: gap detection and the gap report artifact
pub mod gaps;
pub mod report;

pub use gaps::{detect_gaps, is_unfilled, CHECK_COLUMN_COUNT, FIRST_CHECK_COLUMN, NOT_APPLICABLE};
pub use report::{format_entry, parse_line, parse_report, read_report, render_report, write_report};

//! Human-facing output: disk tables, per-disk summaries, and sanitized
//! command output.

mod sanitizer;
mod table;

pub use sanitizer::{sanitize, sanitize_line};
pub use table::{
    disk_rows, render_summaries, render_table, DiskRow, DiskSummary, TABLE_HEADERS,
};

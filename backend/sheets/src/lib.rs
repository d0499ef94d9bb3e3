//! Spreadsheet mirror: one summary row per digitized form, appended to a
//! shared Google Sheet for the people who live in spreadsheets.
//!
//! The mirror is write-only and carries only the headline fields; the
//! document store remains the system of record.

mod google;
mod recording;

pub use google::{summary_row, GoogleSheetMirror, SUMMARY_HEADERS};
pub use recording::RecordingSheetMirror;

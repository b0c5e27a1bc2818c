//! CSV export functionality

use std::io::Write;

use mqbench_core::{PublishResult, PublishStatus};
use serde::Serialize;

use crate::error::ReportError;

const HEADER: [&str; 4] = ["response_time", "status", "size", "error"];

#[derive(Serialize)]
struct Row<'a> {
    response_time: String,
    status: PublishStatus,
    size: u64,
    error: &'a str,
}

/// Write one CSV row per result and return the number of rows
///
/// The header is written even when there are no results.
pub fn write_csv<W, I>(out: W, results: I) -> Result<usize, ReportError>
where
    W: Write,
    I: IntoIterator<Item = PublishResult>,
{
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;

    for result in results {
        writer.serialize(Row {
            response_time: format!("{:.4}", result.duration.as_secs_f64()),
            status: result.status,
            size: result.size,
            error: result.error.as_deref().unwrap_or(""),
        })?;
        rows += 1;
    }

    if rows == 0 {
        writer.write_record(HEADER)?;
    }

    writer.flush()?;
    Ok(rows)
}

//! Text and CSV reports on any writer

use std::io::{self, Write};

use mqbench_core::{BenchResult, FinalizeRequest, OutputMode, ReportFinalizer};

use crate::csv_export::write_csv;
use crate::error::ReportError;
use crate::summary::Summary;

const BAR: char = '∎';
const BAR_WIDTH: u64 = 40;

/// Report finalizer writing to `W` (stdout in the binary)
#[derive(Debug)]
pub struct ConsoleReport<W: Write> {
    out: W,
}

impl ConsoleReport<io::Stdout> {
    /// Report to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReport<W> {
    /// Report to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_summary(&mut self, summary: &Summary) -> Result<(), ReportError> {
        let out = &mut self.out;

        if summary.is_partial() {
            writeln!(out)?;
            writeln!(
                out,
                "{}: {} of {} requested results collected.",
                if summary.completed { "Note" } else { "Interrupted" },
                summary.total,
                summary.expected
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Summary:")?;
        writeln!(out, "  Total:\t{:4.4} secs", summary.elapsed.as_secs_f64())?;
        writeln!(out, "  Slowest:\t{:4.4} secs", summary.latency.max)?;
        writeln!(out, "  Fastest:\t{:4.4} secs", summary.latency.min)?;
        writeln!(out, "  Average:\t{:4.4} secs", summary.latency.mean)?;
        writeln!(out, "  Requests/sec:\t{:4.4}", summary.requests_per_sec)?;
        writeln!(out, "  Total data:\t{} bytes", summary.total_bytes)?;
        writeln!(out, "  Size/request:\t{} bytes", summary.size_per_request)?;

        writeln!(out)?;
        writeln!(out, "Status distribution:")?;
        for (status, count) in &summary.statuses {
            writeln!(out, "  [{status}]\t{count} responses")?;
        }

        if !summary.histogram.is_empty() {
            let tallest = summary.histogram.iter().map(|b| b.count).max().unwrap_or(0);
            writeln!(out)?;
            writeln!(out, "Response time histogram:")?;
            for bucket in &summary.histogram {
                let width = if tallest > 0 {
                    bucket.count * BAR_WIDTH / tallest
                } else {
                    0
                };
                let bar: String = std::iter::repeat(BAR).take(width as usize).collect();
                writeln!(out, "  {:4.3} [{}]\t|{}", bucket.mark, bucket.count, bar)?;
            }

            writeln!(out)?;
            writeln!(out, "Latency distribution:")?;
            for (pct, secs) in summary.latency.distribution() {
                writeln!(out, "  {pct}% in {secs:4.4} secs")?;
            }
        }

        if !summary.errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "Error distribution:")?;
            for (error, count) in &summary.errors {
                writeln!(out, "  [{count}]\t{error}")?;
            }
        }

        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write> ReportFinalizer for ConsoleReport<W> {
    fn finalize(&mut self, request: FinalizeRequest) -> BenchResult<()> {
        tracing::debug!(
            output = ?request.output,
            results = request.results.remaining(),
            completed = request.completed,
            "Finalizing report"
        );

        match request.output {
            OutputMode::Csv => {
                write_csv(&mut self.out, request.results)?;
            }
            OutputMode::Default => {
                let summary = Summary::from_results(
                    request.results,
                    request.expected,
                    request.elapsed,
                    request.completed,
                )?;
                self.write_summary(&summary)?;
            }
        }
        Ok(())
    }
}

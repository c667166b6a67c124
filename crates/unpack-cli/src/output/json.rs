//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use unpack_core::ExtractionReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct ExtractionOutput {
    files_extracted: usize,
    directories_created: usize,
    entries_skipped: usize,
    unsupported_entries: usize,
    bytes_written: u64,
    duration_ms: u128,
}

impl From<&ExtractionReport> for ExtractionOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            unsupported_entries: report.unsupported_entries,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        let output = JsonOutput::success("extract", ExtractionOutput::from(report));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("extract", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::warning(
            "extract",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

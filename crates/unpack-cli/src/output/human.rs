//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use unpack_core::ExtractionReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn summary_lines(&self, report: &ExtractionReport) -> Vec<String> {
        let mut lines = vec![
            format!(
                "  Files extracted: {}",
                Self::format_number(report.files_extracted)
            ),
            format!(
                "  Directories:     {}",
                Self::format_number(report.directories_created)
            ),
            format!("  Total size:      {}", Self::format_size(report.bytes_written)),
        ];

        if report.entries_skipped > 0 || self.verbose {
            lines.push(format!(
                "  Skipped:         {}",
                Self::format_number(report.entries_skipped)
            ));
        }

        if self.verbose {
            lines.push(format!(
                "  Unsupported:     {}",
                Self::format_number(report.unsupported_entries)
            ));
            lines.push(format!("  Duration:        {:?}", report.duration));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.term.write_line(&format!(
                "{} Extraction complete",
                style("✓").green().bold()
            ))?;
        } else {
            self.term.write_line("Extraction complete")?;
        }

        for line in self.summary_lines(report) {
            self.term.write_line(&line)?;
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}

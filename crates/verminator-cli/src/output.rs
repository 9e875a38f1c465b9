//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with specialized
//! rendering for validation reports, compatibility maps and releases.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};
use verminator_core::{CompatibleVersions, Release, ValidationReport, VersionIdentifier};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the warnings of a validation report
    fn format_validation_report(&self, report: &ValidationReport) -> Result<String>;

    /// Format a compatibility map for `version`
    fn format_compatible_versions(
        &self,
        version: &VersionIdentifier,
        compatible: &CompatibleVersions,
    ) -> Result<String>;

    /// Format a single release
    fn format_release(&self, release: &Release) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use YAML as the readable fallback
                Ok(serde_yaml::to_string(value)?)
            }
        }
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report)),
            _ => self.format(&report.warnings),
        }
    }

    fn format_compatible_versions(
        &self,
        version: &VersionIdentifier,
        compatible: &CompatibleVersions,
    ) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_compatible_versions_human(version, compatible)),
            _ => self.format(compatible),
        }
    }

    fn format_release(&self, release: &Release) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_release_human(release)),
            _ => self.format(release),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stdout().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether machine-readable output was requested
    pub fn is_machine(&self) -> bool {
        self.format != OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.is_machine() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.is_machine() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.is_machine() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.is_machine() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.is_machine() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report with specialized formatting
    pub fn validation_report(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_validation_report(report)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a compatibility map with specialized formatting
    pub fn compatible_versions(
        &mut self,
        version: &VersionIdentifier,
        compatible: &CompatibleVersions,
    ) -> Result<()> {
        let formatted = self.format.format_compatible_versions(version, compatible)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a release with specialized formatting
    pub fn release(&mut self, release: &Release) -> Result<()> {
        let formatted = self.format.format_release(release)?;
        self.writeln(formatted.trim_end())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.is_machine() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Format the warnings of a validation report for human reading
fn format_validation_report_human(report: &ValidationReport) -> String {
    let label = report.instance.label();
    if report.warnings.is_empty() {
        return format!("✅ {} is valid\n", label);
    }

    let mut output = format!("⚠️  {} is valid with {} warning(s)\n", label, report.warnings.len());
    for warning in &report.warnings {
        output.push_str(&format!("  • {}\n", warning));
    }
    output
}

/// Format a compatibility map for human reading, one product per line
fn format_compatible_versions_human(
    version: &VersionIdentifier,
    compatible: &CompatibleVersions,
) -> String {
    let mut output = format!("Compatible with {}:\n", version);
    let width = compatible.keys().map(|k| k.len()).max().unwrap_or(0);
    for (product, ranges) in compatible {
        let rendered = if ranges.is_empty() {
            "(none)".to_string()
        } else {
            ranges
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        output.push_str(&format!("  {:width$}  {}\n", product, rendered, width = width));
    }
    output
}

/// Format a release for human reading
fn format_release_human(release: &Release) -> String {
    let mut output = format!(
        "📦 {}{}\n",
        release.version(),
        if release.is_final() { " (final)" } else { "" }
    );

    if !release.image_version().is_empty() {
        output.push_str("  Images:\n");
        for (variable, version) in release.image_version() {
            output.push_str(&format!("    {}: {}\n", variable, version));
        }
    }

    if !release.dependencies().is_empty() {
        output.push_str("  Dependencies:\n");
        for dep in release.dependencies() {
            output.push_str(&format!("    {}: {}\n", dep.instance_type, dep.range));
        }
    }
    output
}

//! Output formatting utilities

use colored::Colorize;
use std::io::{self, Write};
use svd_recommender::report::OutputFormat;

/// Write a section header
pub(crate) fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "{}", format!("=== {title} ===").cyan().bold())
}

/// Write a key-value pair
pub(crate) fn kv(out: &mut impl Write, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "  {}: {}", key.white().bold(), value)
}

/// Write a rendered report; in table mode the summary line is highlighted.
pub(crate) fn report(out: &mut impl Write, text: &str, format: OutputFormat) -> io::Result<()> {
    match (format, text.split_once('\n')) {
        (OutputFormat::Table, Some((summary, rest))) => {
            writeln!(out, "{}", summary.bold())?;
            writeln!(out, "{rest}")
        }
        _ => writeln!(out, "{text}"),
    }
}

/// Print an error message
pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

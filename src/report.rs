//! Plain-text and JSON rendering of lookup results.
//!
//! Rendering is pure string building; colouring and printing stay in the
//! binary.

use crate::recommend::{ProductRecommendations, UserRecommendations};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output rendering for lookup results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned two-column table under a summary line
    #[default]
    Table,
    /// Pretty-printed JSON document
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other} (expected table or json)")),
        }
    }
}

/// Renders product recommendations.
///
/// With `show_scores` the table gains a `Score` column; JSON output never
/// carries scores.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_products(
    recs: &ProductRecommendations,
    format: OutputFormat,
    show_scores: bool,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => to_json(recs),
        OutputFormat::Table => {
            let mut headers = vec!["Product ID", "Product Cluster"];
            if show_scores {
                headers.push("Score");
            }
            let rows: Vec<Vec<String>> = recs
                .items
                .iter()
                .map(|p| {
                    let mut row = vec![p.product_id.to_string(), p.cluster.to_string()];
                    if show_scores {
                        row.push(format!("{:.4}", p.score));
                    }
                    row
                })
                .collect();
            Ok(format!(
                "{}\n{}",
                recs.summary_line(),
                table(&headers, &rows)
            ))
        }
    }
}

/// Renders users sharing a product's cluster.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_users(
    recs: &UserRecommendations,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => to_json(recs),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = recs
                .users
                .iter()
                .map(|u| vec![u.user_id.to_string(), u.cluster.to_string()])
                .collect();
            let mut out = format!("{}\n", recs.summary_line());
            if rows.is_empty() {
                out.push_str("(no users in this cluster)");
            } else {
                out.push_str(&table(&["User ID", "Cluster"], &rows));
            }
            Ok(out)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Left-aligned table with a dashed rule under the header.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

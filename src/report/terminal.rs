use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{Classification, Status};

/// Render a colored terminal report.
///
/// `quiet` prints only the summary line.
pub fn render(rows: &[Classification], quiet: bool) {
    if !quiet {
        println!(
            "\n {} v{}\n",
            "license-matcher".bold(),
            env!("CARGO_PKG_VERSION")
        );
        if !rows.is_empty() {
            println!("{}", build_table(rows));
        }
    }

    let summary = Summary::from_rows(rows);
    println!(
        " Total: {}  Identified: {}  Unknown: {}  Unreadable: {}",
        summary.total,
        summary.identified.to_string().green(),
        summary.unknown.to_string().yellow(),
        summary.unreadable.to_string().red(),
    );

    if !quiet && !summary.licenses.is_empty() {
        println!(" Licenses: {}", summary.licenses);
    }
}

fn build_table(rows: &[Classification]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Strategy").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let (license, color) = match row.status {
            Status::Identified => (row.license.as_deref().unwrap_or_default(), Color::Green),
            Status::Unknown => ("unknown", Color::Yellow),
            Status::Unreadable => (row.error.as_deref().unwrap_or("unreadable"), Color::Red),
        };

        table.add_row(vec![
            Cell::new(&row.source),
            Cell::new(license).fg(color),
            Cell::new(row.strategy.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    total: usize,
    identified: usize,
    unknown: usize,
    unreadable: usize,
    /// Top identifiers by count, e.g. `[MIT (3), Apache-2.0 (1)]`.
    licenses: String,
}

impl Summary {
    fn from_rows(rows: &[Classification]) -> Self {
        let count = |status: Status| rows.iter().filter(|r| r.status == status).count();

        Summary {
            total: rows.len(),
            identified: count(Status::Identified),
            unknown: count(Status::Unknown),
            unreadable: count(Status::Unreadable),
            licenses: summarize_licenses(rows),
        }
    }
}

fn summarize_licenses(rows: &[Classification]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for license in rows.iter().filter_map(|r| r.license.as_deref()) {
        *counts.entry(license).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(license, count)| format!("{} ({})", license, count))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

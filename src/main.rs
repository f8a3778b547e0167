//! `license-matcher`: find license files, identify them, and report.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and install logging ([`logging`]).
//! 2. Load the matcher config ([`config::load_config`]).
//! 3. Build the catalog and the strategy chain ([`config::Config::classifier`]).
//! 4. Expand paths into license files ([`detector::detect_license_files`]).
//! 5. Classify every input in parallel against the shared chain.
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0`, or `1` under `--strict` when any input stayed unidentified.

mod cli;
mod config;
mod detector;
mod logging;
mod models;
mod report;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use cli::{Cli, ReportFormat};
use config::load_config;
use detector::detect_license_files;
use license_matcher::license::exact::OsFileAccess;
use license_matcher::license::Classifier;
use logging::{init_logging, LogConfig};
use models::{Classification, InputSource, Status};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet));

    // The first directory argument is the project whose config applies
    let project = project_root(&cli.paths);
    let config = load_config(&project, cli.config.as_deref())?;

    let catalog = config.catalog()?;
    let classifier = config.classifier(&catalog, cli.threshold, Arc::new(OsFileAccess))?;
    info!(
        licenses = catalog.len(),
        strategies = ?classifier.strategy_names().collect::<Vec<_>>(),
        "classifier ready"
    );

    let inputs: Vec<InputSource> = if cli.stdin {
        vec![InputSource::Stdin]
    } else {
        detect_license_files(&cli.paths)?
            .into_iter()
            .map(InputSource::File)
            .collect()
    };

    if inputs.is_empty() {
        eprintln!(
            "No license files found in {}",
            display_paths(&cli.paths)
        );
        std::process::exit(1);
    }

    let rows = classify_all(&classifier, &inputs, cli.quiet)?;

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&rows, cli.quiet),
        ReportFormat::Json => report::json::render(&rows)?,
    }

    let incomplete = rows.iter().any(|r| r.status != Status::Identified);
    if cli.strict && incomplete {
        std::process::exit(1);
    }

    Ok(())
}

fn classify_all(
    classifier: &Classifier,
    inputs: &[InputSource],
    quiet: bool,
) -> Result<Vec<Classification>> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb
    };

    let rows = inputs
        .par_iter()
        .progress_with(pb.clone())
        .map(|source| match read_input(source) {
            Ok(text) => match classifier.classify(&text) {
                Some(found) => Classification::identified(source, found),
                None => {
                    debug!(source = %source, "no license identified");
                    Classification::unknown(source)
                }
            },
            Err(err) => {
                let message = format!("{err:#}");
                debug!(source = %source, error = %message, "input unreadable");
                Classification::unreadable(source, message)
            }
        })
        .collect();

    pb.finish_and_clear();
    Ok(rows)
}

/// Read one input as text. Invalid UTF-8 is replaced rather than rejected.
fn read_input(source: &InputSource) -> Result<String> {
    let bytes = match source.path() {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("failed to read standard input")?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn project_root(paths: &[PathBuf]) -> PathBuf {
    let root = paths
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    root.canonicalize().unwrap_or(root)
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use license_matcher::license::spdx::bundled_catalog;

    fn standard() -> Classifier {
        Classifier::standard(&bundled_catalog().unwrap()).unwrap()
    }

    #[test]
    fn test_classify_all_records_each_input() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = bundled_catalog().unwrap();
        let mit = catalog.get("MIT").and_then(|e| e.canonical_text()).unwrap();
        fs::write(dir.path().join("LICENSE"), mit).unwrap();
        fs::write(dir.path().join("NOTICE"), "Made with care.").unwrap();
        fs::write(dir.path().join("COPYING"), [0xff, 0xfe, b'x']).unwrap();

        let mut inputs: Vec<InputSource> = detect_license_files(&[dir.path().to_path_buf()])
            .unwrap()
            .into_iter()
            .map(InputSource::File)
            .collect();
        inputs.push(InputSource::File(dir.path().join("missing")));

        let rows = classify_all(&standard(), &inputs, true).unwrap();
        let statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![Status::Unknown, Status::Identified, Status::Unknown, Status::Unreadable]
        );
        assert_eq!(rows[1].license.as_deref(), Some("MIT"));
        assert_eq!(rows[1].strategy.as_deref(), Some("exact"));
        assert!(rows[3].error.as_deref().unwrap().contains("failed to read"));
    }

    #[test]
    fn test_lossy_utf8_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LICENSE");
        fs::write(&path, b"Made \xffwith care.").unwrap();
        let text = read_input(&InputSource::File(path)).unwrap();
        assert_eq!(text, "Made \u{FFFD}with care.");
    }

    #[test]
    fn test_project_root_prefers_first_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("LICENSE");
        fs::write(&file, "x").unwrap();
        let root = project_root(&[file, dir.path().to_path_buf()]);
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// File name prefixes that mark a license file inside a directory.
const LICENSE_FILE_PREFIXES: &[&str] = &["LICENSE", "LICENCE", "COPYING", "NOTICE", "UNLICENSE"];

/// Expand the given paths into the license files to classify.
///
/// Files are taken as is. Directories contribute their top-level license
/// files, sorted by name. A path that does not exist is an error.
pub fn detect_license_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(scan_directory(path)?);
        } else {
            bail!("path not found: {}", path.display());
        }
    }

    Ok(files)
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_license = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_license_file_name);
        if is_license {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}

/// `LICENSE`, `COPYING.md`, `license-mit.txt` and the like.
fn is_license_file_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    LICENSE_FILE_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

//! Input expansion and output target resolution.
//!
//! # Responsibility
//! - Turn positional arguments into an ordered list of `.json` note files.
//! - Map `--out` onto an [`OutputTarget`] before any conversion starts.
//!
//! # Invariants
//! - Directory arguments are expanded non-recursively, sorted by name.
//! - An existing output file is never overwritten.

use keepenex_core::OutputTarget;
use std::path::{Path, PathBuf};

/// Expands one positional argument into note files.
///
/// # Errors
/// - Returns a usage message when `path` is neither a `.json` file nor a
///   directory holding at least one.
pub fn expand_input(path: &Path) -> Result<Vec<PathBuf>, String> {
    if path.is_file() {
        if !has_json_extension(path) {
            return Err(format!("only .json files expected not: '{}'", path.display()));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let entries = std::fs::read_dir(path)
            .map_err(|err| format!("cannot list directory '{}': {err}", path.display()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|candidate| candidate.is_file() && has_json_extension(candidate))
            .collect();
        if files.is_empty() {
            return Err(format!(
                "directory of .json file(s) expected but has none: '{}'",
                path.display()
            ));
        }
        files.sort();
        return Ok(files);
    }

    Err(format!(
        "file or directory of .json file(s) expected but is neither: '{}'",
        path.display()
    ))
}

/// Expands every positional argument, keeping argument order.
pub fn expand_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut expanded = Vec::new();
    for path in paths {
        expanded.extend(expand_input(path)?);
    }
    Ok(expanded)
}

/// Resolves `--out`: `-` is stdout, a directory gets one file per batch,
/// anything else must be a new file in an existing directory.
pub fn resolve_output(value: &str) -> Result<OutputTarget, String> {
    if value == "-" {
        return Ok(OutputTarget::Stdout);
    }

    let path = PathBuf::from(value);
    if path.is_dir() {
        return Ok(OutputTarget::Directory(path));
    }
    if path.exists() {
        return Err(format!("output file already exists: '{}'", path.display()));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(format!(
            "output path not write-accessible: '{}'",
            path.display()
        ));
    }
    Ok(OutputTarget::File(path))
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

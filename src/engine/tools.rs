//! Input and output path utilities

use anyhow::{Context, Result, bail};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::utils::config::OUTPUT_FILENAME_FORMAT;

/// Check if a file should be skipped when expanding a directory (OS metadata files).
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            // macOS resource forks
            _ => name.starts_with("._"),
        }
    } else {
        false
    }
}

/// Expand inputs into mbox files: files are kept as given, directories contribute their
/// regular files (recursively, sorted). Any missing input is an error, before anything runs.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            bail!("input {} does not exist", input.display());
        }
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk {}", input.display()))?;
            if entry.file_type().is_file() && !is_os_hidden_file(entry.path()) {
                found.push(entry.into_path());
            }
        }
        if found.is_empty() {
            log::warn!("directory {} contains no files", input.display());
        }
        files.extend(found);
    }
    Ok(files)
}

/// Default output name from the local time.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(chrono::Local::now().format(OUTPUT_FILENAME_FORMAT).to_string())
}

/// Create the output file. An explicit path must not already exist.
pub fn make_output_file(output: Option<&Path>) -> Result<(File, PathBuf)> {
    let path = output.map(Path::to_path_buf).unwrap_or_else(default_output_path);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("create output file {}", path.display()))?;
    Ok((file, path))
}

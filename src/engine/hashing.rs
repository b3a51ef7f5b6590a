//! File checksum summaries for the input archives and the output CSV.

use anyhow::{Context, Result};
use blake3::Hasher;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::utils::config::{HashingConsts, REPORT_LABEL_WIDTH};

/// Hash a file with blake3. Uses memory-mapped I/O for files above threshold, chunked reading otherwise.
pub fn hash_file(path: &Path) -> Result<[u8; 32]> {
    let file = File::open(path).with_context(|| format!("open {} for hashing", path.display()))?;
    let size = file.metadata()?.len();
    let mut hasher = Hasher::new();

    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // Memory-mapped I/O for large files (Blake3 already uses SIMD internally)
        let mmap = unsafe { Mmap::map(&file)? };
        hasher.update(&mmap);
    } else {
        use std::io::Read;
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Lowercase hex of a digest.
pub fn to_hex(hash: &[u8; 32]) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}

/// Hash `files` in parallel and render a summary block under `label`, in the order given.
/// Fails on the first file that cannot be hashed.
pub fn checksum_summary(label: &str, files: &[PathBuf]) -> Result<String> {
    let sums = files
        .par_iter()
        .map(|f| hash_file(f).map(|h| (f, to_hex(&h))))
        .collect::<Result<Vec<_>>>()?;

    let w = REPORT_LABEL_WIDTH;
    let mut out = String::new();
    if !label.is_empty() {
        let _ = writeln!(out, "{label}");
    }
    for (f, sum) in sums {
        let _ = writeln!(out, "{:<w$}: {}", "file", f.display());
        let _ = writeln!(out, "{:<w$}: {}", "blake3sum", sum);
    }
    Ok(out)
}

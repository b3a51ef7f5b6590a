//! Application configuration constants.
//! Labels, formats and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    default_config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                default_config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    pub fn default_config_filename(&self) -> &str {
        &self.default_config_filename
    }
}

// ---- Outcome labels ----

/// Outcome labels for the default filter chain, in evaluation order.
pub struct Labels;

impl Labels {
    pub const ACCEPTED: &'static str = "accepted";
    pub const IP_INVALID: &'static str = "ip invalid";
    pub const OUTSIDE_DATERANGE: &'static str = "outside daterange";
    pub const ON_HOLIDAY: &'static str = "on holiday";
    pub const INVALID_SENDER: &'static str = "invalid sender";
    pub const DUPLICATE_ID: &'static str = "duplicate id";
}

// ---- Formats ----

/// Date format used in settings, CSV output and holiday display.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default output file name pattern (local time) when `--output` is not given.
pub const OUTPUT_FILENAME_FORMAT: &str = "%Y%m%d-%H%M%S.csv";

/// CSV header row.
pub const CSV_HEADER: [&str; 6] = ["date", "from", "subj", "source", "id", "received"];

/// Default max subject length written to the CSV.
pub const DEFAULT_SUBJECT_LEN: usize = 10;

/// Column width for the text stats report.
pub const REPORT_LABEL_WIDTH: usize = 25;

// ---- Streaming channel cap ----

/// Capacity of the merged accepted-record channel. Sources block once this many
/// records are waiting for the consumer.
pub const MERGED_CHANNEL_CAP: usize = 1_024;

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Progress ----

/// Update the verbose counter every this many records (reduce lock contention).
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 100;

//! Engine module: CLI surface, reporting and file utilities around the pipeline

pub mod arg_parser;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod report;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use handlers::handle_run;
pub use hashing::{checksum_summary, hash_file, to_hex};
pub use report::{csv_field, csv_row, write_records};
pub use tools::{expand_inputs, make_output_file};

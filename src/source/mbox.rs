//! Mbox archives: messages start at a `From ` line at the top of the file or after an
//! empty line. Only each message's header block is kept.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use super::headers::parse_message;
use super::{OpenSource, RecordSource, SourceError};
use crate::types::Record;

const SEPARATOR: &[u8] = b"From ";

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// Streaming reader over one mbox.
pub struct MboxReader<R> {
    reader: R,
    label: String,
    line_no: usize,
    started: bool,
    /// A separator has been consumed and its message not yet returned.
    in_message: bool,
}

impl<R: BufRead + Send> MboxReader<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
            line_no: 0,
            started: false,
            in_message: false,
        }
    }

    /// Read one line into `buf`; false at EOF.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, SourceError> {
        buf.clear();
        let n = self
            .reader
            .read_until(b'\n', buf)
            .map_err(|source| SourceError::Read {
                label: self.label.clone(),
                source,
            })?;
        if n > 0 {
            self.line_no += 1;
        }
        Ok(n > 0)
    }

    /// Consume leading blank lines and the first separator. False for an empty file.
    fn start(&mut self) -> Result<bool, SourceError> {
        self.started = true;
        let mut line = Vec::new();
        loop {
            if !self.read_line(&mut line)? {
                return Ok(false);
            }
            if !is_blank(&line) {
                break;
            }
        }
        if !line.starts_with(SEPARATOR) {
            return Err(SourceError::Format {
                label: self.label.clone(),
                line: self.line_no,
                reason: "expected a \"From \" separator line".to_string(),
            });
        }
        self.in_message = true;
        Ok(true)
    }
}

impl<R: BufRead + Send> RecordSource for MboxReader<R> {
    fn next_record(&mut self) -> Result<Option<Record>, SourceError> {
        if !self.started && !self.start()? {
            return Ok(None);
        }
        if !self.in_message {
            return Ok(None);
        }
        self.in_message = false;

        let first_line = self.line_no + 1;
        let mut raw = Vec::new();
        let mut line = Vec::new();
        let mut in_headers = true;
        let mut prev_blank = false;
        while self.read_line(&mut line)? {
            if prev_blank && line.starts_with(SEPARATOR) {
                self.in_message = true;
                break;
            }
            prev_blank = is_blank(&line);
            if in_headers {
                if prev_blank {
                    in_headers = false;
                } else {
                    raw.extend_from_slice(&line);
                }
            }
        }

        parse_message(&raw, &self.label)
            .map(Some)
            .map_err(|source| SourceError::Header {
                label: self.label.clone(),
                line: first_line,
                source,
            })
    }
}

/// An mbox file on disk, opened lazily by its pipeline thread.
#[derive(Clone, Debug)]
pub struct MboxFile {
    pub path: PathBuf,
}

impl MboxFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OpenSource for MboxFile {
    type Source = MboxReader<BufReader<File>>;

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn open(self) -> Result<Self::Source, SourceError> {
        let label = self.label();
        let file = File::open(&self.path).map_err(|source| SourceError::Open {
            label: label.clone(),
            source,
        })?;
        Ok(MboxReader::new(BufReader::new(file), label))
    }
}

//! Header block parsing: raw `Name: value` lines for the header map, mail-parser for
//! the decoded fields (date, from, subject, message id).

use chrono::{DateTime, Utc};
use mail_parser::{Address, MessageParser};
use thiserror::Error;

use crate::types::{HeaderMap, Record};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("message has no headers")]
    Empty,
    #[error("malformed header line {0:?}")]
    Malformed(String),
    #[error("continuation line before any header: {0:?}")]
    OrphanContinuation(String),
    #[error("message could not be parsed")]
    Unparseable,
    #[error("missing or invalid Date header")]
    Date,
}

/// Split a header block into an ordered, case-sensitive map. Folded lines are unfolded
/// with a single space.
pub fn parse_header_block(raw: &str) -> Result<HeaderMap, HeaderError> {
    let mut headers: HeaderMap = Vec::new();
    // (index into headers, index into its values) of the value being built
    let mut last: Option<(usize, usize)> = None;

    for line in raw.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            let (h, v) = last.ok_or_else(|| HeaderError::OrphanContinuation(line.to_string()))?;
            let value = &mut headers[h].1[v];
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .filter(|(name, _)| !name.is_empty() && !name.contains(char::is_whitespace))
            .ok_or_else(|| HeaderError::Malformed(line.to_string()))?;
        let value = value.trim().to_string();
        let h = match headers.iter().position(|(n, _)| n == name) {
            Some(h) => {
                headers[h].1.push(value);
                h
            }
            None => {
                headers.push((name.to_string(), vec![value]));
                headers.len() - 1
            }
        };
        last = Some((h, headers[h].1.len() - 1));
    }

    if headers.is_empty() {
        return Err(HeaderError::Empty);
    }
    Ok(headers)
}

/// All addresses in a `From`-style field, groups flattened.
fn addresses(addr: Option<&Address>) -> Vec<String> {
    let Some(addr) = addr else {
        return Vec::new();
    };
    match addr {
        Address::List(addrs) => addrs
            .iter()
            .filter_map(|a| a.address.as_ref().map(|s| s.to_string()))
            .collect(),
        Address::Group(groups) => groups
            .iter()
            .flat_map(|g| {
                g.addresses
                    .iter()
                    .filter_map(|a| a.address.as_ref().map(|s| s.to_string()))
            })
            .collect(),
    }
}

/// Build a [`Record`] from the raw header block of one message.
pub fn parse_message(raw: &[u8], source: &str) -> Result<Record, HeaderError> {
    let headers = parse_header_block(&String::from_utf8_lossy(raw))?;
    let message = MessageParser::default()
        .parse(raw)
        .ok_or(HeaderError::Unparseable)?;

    let timestamp = message
        .date()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.to_timestamp(), 0))
        .ok_or(HeaderError::Date)?;

    Ok(Record::new(
        timestamp,
        addresses(message.from()),
        message.subject().unwrap_or_default(),
        message.message_id().unwrap_or_default(),
        source,
    )
    .with_headers(headers))
}

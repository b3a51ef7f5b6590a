//! Mbox reading and header parsing, plus an on-disk end-to-end run.

use mboxfilter::filter_mboxes;
use mboxfilter::source::headers::parse_header_block;
use mboxfilter::source::{HeaderError, MboxReader, RecordSource, SourceError, parse_message};
use mboxfilter::utils::Settings;
use mboxfilter::utils::config::Labels;
use std::io::{Cursor, Write};

fn message(id: &str, date: &str, from: &str, ip: &str, subject: &str) -> String {
    format!(
        "From sender@example.com Mon Jan  1 00:00:00 2024\n\
         Received: from relay.example ([{ip}] helo=relay)\n\
         \tby mx.example with esmtpsa; {date}\n\
         Received: by internal.example\n\
         From: Some One <{from}>\n\
         Subject: {subject}\n\
         Date: {date}\n\
         Message-ID: <{id}>\n\
         \n\
         Body line one.\n\
         From the top of the body, not a separator\n\
         \n"
    )
}

fn reader(text: &str) -> MboxReader<Cursor<Vec<u8>>> {
    MboxReader::new(Cursor::new(text.as_bytes().to_vec()), "test.mbox")
}

#[test]
fn test_reads_messages_in_order() {
    let text = [
        message("one@x", "Tue, 05 Mar 2024 10:00:00 +0000", "a@corp.example", "10.0.0.1", "First"),
        message("two@x", "Wed, 06 Mar 2024 11:30:00 +0100", "b@corp.example", "10.0.0.2", "Second"),
    ]
    .concat();
    let mut r = reader(&text);

    let first = r.next_record().unwrap().unwrap();
    assert_eq!(first.message_id(), "one@x");
    assert_eq!(first.subject(), "First");
    assert_eq!(first.sender(), Some("a@corp.example"));
    assert_eq!(first.source(), "test.mbox");
    assert_eq!(first.timestamp().to_rfc3339(), "2024-03-05T10:00:00+00:00");

    let second = r.next_record().unwrap().unwrap();
    assert_eq!(second.message_id(), "two@x");
    assert_eq!(second.timestamp().to_rfc3339(), "2024-03-06T10:30:00+00:00");

    assert!(r.next_record().unwrap().is_none());
    assert!(r.next_record().unwrap().is_none());
}

#[test]
fn test_received_values_are_unfolded_and_ordered() {
    let text = message("one@x", "Tue, 05 Mar 2024 10:00:00 +0000", "a@x", "10.99.1.23", "s");
    let rec = reader(&text).next_record().unwrap().unwrap();
    assert_eq!(
        rec.header_values("Received"),
        [
            "from relay.example ([10.99.1.23] helo=relay) by mx.example with esmtpsa; Tue, 05 Mar 2024 10:00:00 +0000",
            "by internal.example",
        ]
    );
    let names: Vec<&str> = rec.headers().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["Received", "From", "Subject", "Date", "Message-ID"]);
}

#[test]
fn test_empty_input_has_no_records() {
    assert!(reader("").next_record().unwrap().is_none());
    assert!(reader("\n\n").next_record().unwrap().is_none());
}

#[test]
fn test_missing_separator_is_a_format_error() {
    let err = reader("Subject: hi\n\nbody\n").next_record().unwrap_err();
    assert!(matches!(err, SourceError::Format { line: 1, .. }));
}

#[test]
fn test_malformed_header_is_a_parse_error() {
    let text = "From x Mon Jan  1 00:00:00 2024\nthis is not a header\nDate: Tue, 05 Mar 2024 10:00:00 +0000\n\n";
    let err = reader(text).next_record().unwrap_err();
    match err {
        SourceError::Header { line, source, .. } => {
            assert_eq!(line, 2);
            assert!(matches!(source, HeaderError::Malformed(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_missing_date_is_a_parse_error() {
    let text = "From x Mon Jan  1 00:00:00 2024\nSubject: no date\nMessage-ID: <a@b>\n\n";
    let err = reader(text).next_record().unwrap_err();
    assert!(matches!(
        err,
        SourceError::Header {
            source: HeaderError::Date,
            ..
        }
    ));
}

#[test]
fn test_header_block_rules() {
    assert_eq!(parse_header_block(""), Err(HeaderError::Empty));
    assert!(matches!(
        parse_header_block(" leading continuation\n"),
        Err(HeaderError::OrphanContinuation(_))
    ));
    let map = parse_header_block("X-A: 1\nX-B: 2\nX-A: 3\n\nX-C: body\n").unwrap();
    assert_eq!(
        map,
        vec![
            ("X-A".to_string(), vec!["1".to_string(), "3".to_string()]),
            ("X-B".to_string(), vec!["2".to_string()]),
        ]
    );
}

#[test]
fn test_missing_message_id_and_sender_are_empty() {
    let raw = b"Date: Tue, 05 Mar 2024 10:00:00 +0000\nSubject: bare\n";
    let rec = parse_message(raw, "src").unwrap();
    assert_eq!(rec.message_id(), "");
    assert_eq!(rec.sender(), None);
    assert_eq!(rec.subject(), "bare");
}

const SETTINGS: &str = r#"
report_start = "2024-01-01"
report_end = "2024-12-31"
received_ip_fragment = "10.0.0."
valid_sender_regexp = "corp\\.example"

[[holidays]]
start = "2024-08-01"
end = "2024-08-15"
"#;

#[test]
fn test_filter_mboxes_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.mbox");
    let b = dir.path().join("b.mbox");

    let mut fa = std::fs::File::create(&a)?;
    fa.write_all(
        [
            message("m1@x", "Tue, 05 Mar 2024 10:00:00 +0000", "x@corp.example", "10.0.0.1", "ok"),
            message("m2@x", "Tue, 06 Aug 2024 10:00:00 +0000", "x@corp.example", "10.0.0.1", "holiday"),
            message("m3@x", "Tue, 05 Mar 2024 10:00:00 +0000", "x@other.example", "10.0.0.1", "sender"),
        ]
        .concat()
        .as_bytes(),
    )?;
    let mut fb = std::fs::File::create(&b)?;
    fb.write_all(
        [
            message("m1@x", "Tue, 05 Mar 2024 10:00:00 +0000", "x@CORP.example", "10.0.0.1", "dup"),
            message("m4@x", "Fri, 05 Apr 2024 10:00:00 +0000", "y@corp.example", "10.0.0.9", "ok"),
            message("m5@x", "Fri, 05 Apr 2024 10:00:00 +0000", "y@corp.example", "192.0.2.1", "ip"),
        ]
        .concat()
        .as_bytes(),
    )?;

    let settings = Settings::from_toml_str(SETTINGS)?;
    let (result, stats) = filter_mboxes(&[a, b], &settings);
    let summary = result.outcome?;
    assert_eq!(summary.examined(), 6);

    let mut ids: Vec<&str> = result.records.iter().map(|r| r.message_id()).collect();
    ids.sort();
    assert_eq!(ids, ["m1@x", "m4@x"]);

    assert_eq!(stats.accepted(), 2);
    assert_eq!(stats.get(Labels::ON_HOLIDAY), 1);
    assert_eq!(stats.get(Labels::INVALID_SENDER), 1);
    assert_eq!(stats.get(Labels::DUPLICATE_ID), 1);
    assert_eq!(stats.get(Labels::IP_INVALID), 1);
    assert_eq!(stats.total(), 6);
    Ok(())
}

#[test]
fn test_filter_mboxes_parse_error_surfaces_source() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bad = dir.path().join("bad.mbox");
    std::fs::write(&bad, "not an mbox\n")?;
    let settings = Settings::from_toml_str(SETTINGS)?;
    let (result, _) = filter_mboxes(&[bad.clone()], &settings);
    let err = result.outcome.unwrap_err();
    assert_eq!(err.label(), Some(bad.display().to_string().as_str()));
    Ok(())
}

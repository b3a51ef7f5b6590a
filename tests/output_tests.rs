//! CSV output, checksums and input expansion.

use chrono::{TimeZone, Utc};
use mboxfilter::Record;
use mboxfilter::engine::{
    checksum_summary, csv_field, csv_row, expand_inputs, hash_file, make_output_file, to_hex,
    write_records,
};

fn record(id: &str, day: u32, subject: &str) -> Record {
    Record::new(
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        vec![format!("{id}@corp.example")],
        subject,
        id,
        "inbox.mbox",
    )
    .with_header("Received", "from a [10.0.0.1]")
    .with_header("Received", "by b")
}

#[test]
fn test_csv_field_quoting() {
    assert_eq!(csv_field("plain"), "plain");
    assert_eq!(csv_field("a,b"), "\"a,b\"");
    assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
}

#[test]
fn test_csv_row_columns() {
    let row = csv_row(&record("id1", 5, "A long subject line"), 10);
    assert_eq!(
        row,
        [
            "2024-03-05".to_string(),
            "id1@corp.example".to_string(),
            "A long sub".to_string(),
            "inbox.mbox".to_string(),
            "id1".to_string(),
            "from a [10.0.0.1] by b".to_string(),
        ]
    );
    assert_eq!(csv_row(&record("id1", 5, "A long subject line"), 0)[2], "A long subject line");
}

#[test]
fn test_subject_truncation_respects_char_boundaries() {
    let r = record("id", 1, "héllo wörld");
    assert_eq!(r.subject_truncated(2), "hé");
    assert_eq!(r.subject_truncated(50), "héllo wörld");
}

#[test]
fn test_write_records_sorted_by_date() -> anyhow::Result<()> {
    let mut records = vec![record("c", 20, "third"), record("a", 1, "first"), record("b", 10, "second")];
    let mut out = Vec::new();
    write_records(&mut out, &mut records, 10)?;
    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,from,subj,source,id,received");
    assert!(lines[1].starts_with("2024-03-01,a@corp.example,first,"));
    assert!(lines[2].starts_with("2024-03-10,b@"));
    assert!(lines[3].starts_with("2024-03-20,c@"));
    assert_eq!(lines.len(), 4);
    Ok(())
}

#[test]
fn test_checksums() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.mbox");
    std::fs::write(&a, b"hello")?;
    let expected = blake3::hash(b"hello").to_hex().to_string();
    assert_eq!(to_hex(&hash_file(&a)?), expected);

    let summary = checksum_summary("input files", &[a.clone()])?;
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "input files");
    assert!(lines[1].ends_with(&a.display().to_string()));
    assert!(lines[2].ends_with(&expected));

    assert!(checksum_summary("x", &[dir.path().join("missing")]).is_err());
    Ok(())
}

#[test]
fn test_expand_inputs() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let sub = dir.path().join("archive");
    std::fs::create_dir(&sub)?;
    std::fs::write(sub.join("b.mbox"), "")?;
    std::fs::write(sub.join("a.mbox"), "")?;
    std::fs::write(sub.join(".DS_Store"), "")?;
    let single = dir.path().join("single.mbox");
    std::fs::write(&single, "")?;

    let files = expand_inputs(&[single.clone(), sub.clone()])?;
    assert_eq!(files, vec![single, sub.join("a.mbox"), sub.join("b.mbox")]);

    assert!(expand_inputs(&[dir.path().join("missing.mbox")]).is_err());
    Ok(())
}

#[test]
fn test_output_file_must_not_exist() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.csv");
    let (_file, made) = make_output_file(Some(path.as_path()))?;
    assert_eq!(made, path);
    assert!(make_output_file(Some(path.as_path())).is_err());
    Ok(())
}

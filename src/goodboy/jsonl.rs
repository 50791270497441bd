//! Flat-file persistence helpers used by every store.
//!
//! Logs are JSON-lines files: one serialized record per line, appended with
//! `O_APPEND`. Whole-file rewrites go through a sibling temp file and a rename
//! so a crash mid-write leaves the previous log intact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Load every record of a JSONL file. Missing files yield an empty list.
///
/// Blank lines are skipped. Lines that fail to parse are logged and skipped
/// so one corrupt record cannot make a whole store unreadable.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!(
                "goodboy::jsonl: skipping malformed line {} in {}: {}",
                line_no + 1,
                path.display(),
                e
            ),
        }
    }
    Ok(records)
}

/// Append one record as a single line, creating parent directories as needed.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> io::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string(record)
        .map_err(|e| io::Error::other(format!("Failed to serialize record: {}", e)))?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Replace the whole log with `records`.
pub fn rewrite_records<T: Serialize>(path: &Path, records: &[T]) -> io::Result<()> {
    let mut buf = String::new();
    for record in records {
        let json = serde_json::to_string(record)
            .map_err(|e| io::Error::other(format!("Failed to serialize record: {}", e)))?;
        buf.push_str(&json);
        buf.push('\n');
    }
    replace_file(path, buf.as_bytes())
}

/// Read a single pretty or compact JSON document, `None` when absent.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map(Some).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), e),
        )
    })
}

/// Overwrite a JSON document (pretty printed).
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::other(format!("Failed to serialize document: {}", e)))?;
    replace_file(path, json.as_bytes())
}

fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    ensure_parent(path)?;
    let tmp = temp_sibling(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        n: u32,
    }

    #[test]
    fn append_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.jsonl");
        for n in 0..3 {
            append_record(&path, &Row { n }).unwrap();
        }
        let rows: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(rows, vec![Row { n: 0 }, Row { n: 1 }, Row { n: 2 }]);
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"n\":1}\n\nnot-json\n{\"n\":2}\n").unwrap();
        let rows: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn rewrite_replaces_content_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        append_record(&path, &Row { n: 9 }).unwrap();
        rewrite_records(&path, &[Row { n: 1 }]).unwrap();
        let rows: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(rows, vec![Row { n: 1 }]);
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn missing_document_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Option<Row> = read_document(&dir.path().join("absent.json")).unwrap();
        assert!(doc.is_none());
    }
}

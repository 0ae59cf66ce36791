//! Document and text file I/O

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use redact_core::{CandidateDocument, Error, RawCandidate, Result, SchemaCheck};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::table;

/// Encodings accepted for input documents
const SUPPORTED_ENCODINGS: &[&str] = &["utf-8", "utf8"];

pub fn check_encoding(encoding: &str) -> Result<()> {
    let normalized = encoding.trim().to_lowercase().replace('_', "-");
    if SUPPORTED_ENCODINGS.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedEncoding(encoding.to_string()))
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::NotFound(path.to_path_buf()))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Read a text file. Invalid byte sequences become U+FFFD.
pub fn read_text(path: &Path, encoding: &str) -> Result<String> {
    check_encoding(encoding)?;
    ensure_exists(path)?;
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, text)?;
    Ok(())
}

pub fn save_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    debug!("Wrote {:?}", path);
    Ok(())
}

/// Raw records from JSON text: a bare list or an object with `items`
pub fn parse_raw_candidates(json: &str) -> Result<Vec<RawCandidate>> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(list) => Value::Array(list),
        Value::Object(mut obj) => obj
            .remove("items")
            .filter(Value::is_array)
            .ok_or_else(|| Error::schema("$.items", "expected a list of candidates"))?,
        _ => return Err(Error::schema("$", "expected a list or an object with items")),
    };
    serde_json::from_value(items).map_err(|e| Error::schema("$.items", e.to_string()))
}

/// Raw records from a `.csv` table or a JSON file
pub fn load_raw_candidates(path: &Path) -> Result<Vec<RawCandidate>> {
    ensure_exists(path)?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = File::open(path)?;
        table::read_candidates_csv(BufReader::new(file))
    } else {
        parse_raw_candidates(&fs::read_to_string(path)?)
    }
}

/// A validated candidate document, schema-checked on load
pub fn load_candidate_document(path: &Path) -> Result<CandidateDocument> {
    ensure_exists(path)?;
    CandidateDocument::from_json_str(&fs::read_to_string(path)?)
}

pub fn export_csv(path: &Path, doc: &CandidateDocument) -> Result<()> {
    ensure_parent(path)?;
    table::write_candidates_csv(File::create(path)?, doc)
}

pub fn export_raw_csv(path: &Path, items: &[RawCandidate]) -> Result<()> {
    ensure_parent(path)?;
    table::write_raw_csv(File::create(path)?, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_encoding() {
        assert!(check_encoding("utf-8").is_ok());
        assert!(check_encoding("UTF8").is_ok());
        assert!(check_encoding("utf_8").is_ok());
        assert!(matches!(
            check_encoding("cp1251"),
            Err(Error::UnsupportedEncoding(e)) if e == "cp1251"
        ));
    }

    #[test]
    fn test_parse_list_and_object() {
        let list = r#"[{"type":"PER","start":0,"end":4,"text":"Иван"}]"#;
        let parsed = parse_raw_candidates(list).unwrap();
        assert_eq!(parsed[0].typ, "PER");
        assert_eq!(parsed[0].id, None);

        let obj = r#"{"version":"1","items":[{"id":"a","typ":"PHONE","apply":true}]}"#;
        let parsed = parse_raw_candidates(obj).unwrap();
        assert_eq!(parsed[0].id.as_deref(), Some("a"));
        assert_eq!(parsed[0].apply, Some(true));

        assert!(parse_raw_candidates(r#"{"rows":[]}"#).is_err());
        assert!(parse_raw_candidates("42").is_err());
    }

    #[test]
    fn test_malformed_record_is_schema_error() {
        // Record without a type
        let err = parse_raw_candidates(r#"[{"start":1}]"#).unwrap_err();
        assert!(matches!(err, Error::Schema { ref location, .. } if location == "$.items"));

        let err = parse_raw_candidates(r#"{"items":[{"typ":"PER","start":"x"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_read_text_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, b"ab\xffc").unwrap();
        assert_eq!(read_text(&path, "utf-8").unwrap(), "ab\u{fffd}c");
        assert!(matches!(
            read_text(&dir.path().join("missing.txt"), "utf-8"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            read_text(&path, "latin-1"),
            Err(Error::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_save_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("doc.json");
        save_json_pretty(&path, &CandidateDocument::new(Vec::new())).unwrap();
        let loaded = load_candidate_document(&path).unwrap();
        assert!(loaded.items.is_empty());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("review.CSV");
        fs::write(&csv_path, "id;typ;start;end\nx;PER;0;4\n").unwrap();
        let rows = load_raw_candidates(&csv_path).unwrap();
        assert_eq!(rows[0].end, 4);

        let json_path = dir.path().join("raw.json");
        fs::write(&json_path, r#"[{"typ":"ADDR"}]"#).unwrap();
        assert_eq!(load_raw_candidates(&json_path).unwrap()[0].typ, "ADDR");
    }
}

//! `;`-delimited tables of candidates for manual review
//!
//! Columns: `id;typ;start;end;text;norm;score` plus optional `apply` and
//! `replacement`. Header names are matched case-insensitively; unknown
//! columns are ignored.

use std::io::{Read, Write};

use redact_core::{CandidateDocument, Error, RawCandidate, Result};

use crate::validate::coerce_bool;

const DELIMITER: u8 = b';';

/// Maps CSV column indices to candidate fields
#[derive(Debug, Default)]
struct ColumnMap {
    id: Option<usize>,
    typ: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    text: Option<usize>,
    norm: Option<usize>,
    score: Option<usize>,
    apply: Option<usize>,
    replacement: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut map = Self::default();

        for (i, header) in headers.iter().enumerate() {
            match header.trim().to_lowercase().as_str() {
                "id" => map.id = Some(i),
                "typ" | "type" => map.typ = Some(i),
                "start" => map.start = Some(i),
                "end" => map.end = Some(i),
                "text" => map.text = Some(i),
                "norm" => map.norm = Some(i),
                "score" => map.score = Some(i),
                "apply" => map.apply = Some(i),
                "replacement" => map.replacement = Some(i),
                _ => {}
            }
        }

        if map.id.is_none() || map.typ.is_none() {
            return Err(Error::InvalidInput(
                "CSV must have 'id' and 'typ' (or 'type') columns".to_string(),
            ));
        }
        Ok(map)
    }
}

fn parse_field<T: std::str::FromStr>(
    value: Option<&str>,
    column: &str,
    row: usize,
) -> Result<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| {
            Error::InvalidInput(format!("row {}: bad {} value {:?}", row, column, v))
        }),
    }
}

/// Read candidate records. Rows without an id are skipped.
pub fn read_candidates_csv<R: Read>(reader: R) -> Result<Vec<RawCandidate>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut out = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = i + 2;
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        let Some(id) = get(columns.id).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };

        out.push(RawCandidate {
            id: Some(id.to_string()),
            typ: get(columns.typ).unwrap_or_default().trim().to_string(),
            start: parse_field(get(columns.start), "start", row)?.unwrap_or(0),
            end: parse_field(get(columns.end), "end", row)?.unwrap_or(0),
            text: get(columns.text).unwrap_or_default().to_string(),
            norm: get(columns.norm)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from),
            score: parse_field(get(columns.score), "score", row)?,
            apply: get(columns.apply).and_then(coerce_bool),
            replacement: get(columns.replacement)
                .filter(|v| !v.trim().is_empty())
                .map(String::from),
            ..RawCandidate::default()
        });
    }
    Ok(out)
}

fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

fn writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(writer)
}

/// Write raw detections (no apply/replacement columns)
pub fn write_raw_csv<W: Write>(out: W, items: &[RawCandidate]) -> Result<()> {
    let mut w = writer(out);
    w.write_record(["id", "typ", "start", "end", "text", "norm", "score"])?;
    for c in items {
        w.write_record([
            c.id.clone().unwrap_or_default(),
            c.typ.clone(),
            c.start.to_string(),
            c.end.to_string(),
            c.text.clone(),
            c.norm.clone().unwrap_or_default(),
            c.score.map(format_score).unwrap_or_default(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write a validated document for review, decisions included
pub fn write_candidates_csv<W: Write>(out: W, doc: &CandidateDocument) -> Result<()> {
    let mut w = writer(out);
    w.write_record([
        "id",
        "typ",
        "start",
        "end",
        "text",
        "norm",
        "score",
        "apply",
        "replacement",
    ])?;
    for item in &doc.items {
        w.write_record([
            item.id.clone(),
            item.typ.label().to_string(),
            item.start.to_string(),
            item.end.to_string(),
            item.text.clone(),
            item.norm.clone().unwrap_or_default(),
            format_score(item.score),
            item.apply.to_string(),
            item.replacement.clone(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use redact_core::{CandidateItem, EntityKind, Meta};

    #[test]
    fn test_read_with_bool_forms() {
        let data = "\
id;type;start;end;text;norm;score;apply;replacement
a;PHONE;0;12;+79991234567;+79991234567;0.9;да;
b;PER;20;31;Иванов И.И.;;0.6;No;[ФИО]
;ADDR;40;50;ул. Ленина;;;1;
c;ADDR;40;50;ул. Ленина;;;maybe;
";
        let rows = read_candidates_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].typ, "PHONE");
        assert_eq!(rows[0].apply, Some(true));
        assert_eq!(rows[0].replacement, None);
        assert_eq!(rows[0].score, Some(0.9));

        assert_eq!(rows[1].text, "Иванов И.И.");
        assert_eq!(rows[1].norm, None);
        assert_eq!(rows[1].apply, Some(false));
        assert_eq!(rows[1].replacement.as_deref(), Some("[ФИО]"));

        assert_eq!(rows[2].id.as_deref(), Some("c"));
        assert_eq!(rows[2].score, None);
        assert_eq!(rows[2].apply, None);
    }

    #[test]
    fn test_missing_columns_rejected() {
        let err = read_candidates_csv("start;end\n1;2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_bad_number_reports_row() {
        let err = read_candidates_csv("id;typ;start\nx;PER;abc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_export_reads_back() {
        let doc = CandidateDocument::new(vec![CandidateItem {
            id: "PER:0-11".to_string(),
            typ: EntityKind::Person,
            start: 0,
            end: 11,
            text: "Иванов; И.И.".to_string(),
            norm: None,
            score: 0.6,
            apply: false,
            replacement: "[PER_001]".to_string(),
            meta: Meta::new(),
        }]);

        let mut buf = Vec::new();
        write_candidates_csv(&mut buf, &doc).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id;typ;start;end;text;norm;score;apply;replacement\n"));

        assert!(text.contains(";0.60;false;[PER_001]"));

        let rows = read_candidates_csv(text.as_bytes()).unwrap();
        assert_eq!(rows[0].text, "Иванов; И.И.");
        assert_eq!(rows[0].apply, Some(false));
        assert_eq!(rows[0].replacement.as_deref(), Some("[PER_001]"));
    }

    #[test]
    fn test_raw_preview_header() {
        let rows = vec![RawCandidate {
            id: Some("SNILS:6-20".to_string()),
            typ: "SNILS".to_string(),
            start: 6,
            end: 20,
            text: "112-233-445 95".to_string(),
            score: Some(1.0),
            ..RawCandidate::default()
        }];
        let mut buf = Vec::new();
        write_raw_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "id;typ;start;end;text;norm;score\nSNILS:6-20;SNILS;6;20;112-233-445 95;;1.00\n"
        );
    }
}

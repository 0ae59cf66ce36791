//! Schema checks for persisted documents
//!
//! Structural conformance (field names, JSON types) is enforced by the serde
//! definitions in [`crate::document`]; the checks here cover the constraints
//! a JSON Schema would add on top: versions, ranges, uniqueness, formats.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{CandidateDocument, DOCUMENT_VERSION, Error, Report, Result};

/// A document that can verify it conforms to its schema
pub trait SchemaCheck {
    fn check_schema(&self) -> Result<()>;

    /// Parse JSON text, mapping structural failures to schema errors
    fn from_json_str(json: &str) -> Result<Self>
    where
        Self: Sized + DeserializeOwned,
    {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::schema("$", "expected object"));
        }
        let doc: Self = serde_json::from_value(value).map_err(|e| Error::schema("$", e.to_string()))?;
        doc.check_schema()?;
        Ok(doc)
    }
}

fn check_version(version: &str) -> Result<()> {
    if version != DOCUMENT_VERSION {
        return Err(Error::schema(
            "$.version",
            format!("expected \"{}\", got \"{}\"", DOCUMENT_VERSION, version),
        ));
    }
    Ok(())
}

impl SchemaCheck for CandidateDocument {
    fn check_schema(&self) -> Result<()> {
        check_version(&self.version)?;

        let mut seen = HashSet::new();
        for (i, item) in self.items.iter().enumerate() {
            let at = |field: &str| format!("$.items[{}].{}", i, field);

            if item.id.trim().is_empty() {
                return Err(Error::schema(at("id"), "must not be empty"));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(Error::schema(at("id"), format!("duplicate id \"{}\"", item.id)));
            }
            if item.start > item.end {
                return Err(Error::schema(
                    at("end"),
                    format!("end {} precedes start {}", item.end, item.start),
                ));
            }
            if !(0.0..=1.0).contains(&item.score) {
                return Err(Error::schema(at("score"), format!("{} outside [0, 1]", item.score)));
            }
            if item.replacement.is_empty() {
                return Err(Error::schema(at("replacement"), "must not be empty"));
            }
        }
        Ok(())
    }
}

impl SchemaCheck for Report {
    fn check_schema(&self) -> Result<()> {
        check_version(&self.version)?;

        if OffsetDateTime::parse(&self.created_utc, &Rfc3339).is_err() {
            return Err(Error::schema(
                "$.created_utc",
                format!("\"{}\" is not an ISO-8601 timestamp", self.created_utc),
            ));
        }
        if self.encoding.trim().is_empty() {
            return Err(Error::schema("$.encoding", "must not be empty"));
        }

        let counts = self.counts;
        if counts.total != self.items.len() {
            return Err(Error::schema(
                "$.counts.total",
                format!("{} but {} items", counts.total, self.items.len()),
            ));
        }
        if counts.applied + counts.skipped != counts.total {
            return Err(Error::schema("$.counts", "applied + skipped must equal total"));
        }

        for (i, item) in self.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(Error::schema(format!("$.items[{}].id", i), "must not be empty"));
            }
            if item.start > item.end {
                return Err(Error::schema(
                    format!("$.items[{}].end", i),
                    format!("end {} precedes start {}", item.end, item.start),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CandidateItem, Counts, EntityKind, Meta, ReportItem};

    fn item(id: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            typ: EntityKind::Phone,
            start: 0,
            end: 5,
            text: "12345".to_string(),
            norm: None,
            score: 0.9,
            apply: true,
            replacement: "[PHONE_001]".to_string(),
            meta: Meta::new(),
        }
    }

    #[test]
    fn test_valid_document() {
        let doc = CandidateDocument::new(vec![item("a"), item("b")]);
        assert!(doc.check_schema().is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doc = CandidateDocument::new(vec![item("a"), item("a")]);
        let err = doc.check_schema().unwrap_err();
        assert!(matches!(err, Error::Schema { location, .. } if location == "$.items[1].id"));
    }

    #[test]
    fn test_score_out_of_range() {
        let mut bad = item("a");
        bad.score = 1.5;
        assert!(CandidateDocument::new(vec![bad]).check_schema().is_err());
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        let json = r#"{"version":"1","items":[],"extra":true}"#;
        let err = CandidateDocument::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_array_is_schema_error() {
        let err = CandidateDocument::from_json_str("[]").unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_report_counts_must_add_up() {
        let report = Report {
            version: "1".to_string(),
            source_path: String::new(),
            encoding: "utf-8".to_string(),
            created_utc: "2024-05-01T10:00:00Z".to_string(),
            counts: Counts { total: 1, applied: 1, skipped: 1 },
            items: vec![ReportItem {
                id: "x".to_string(),
                typ: EntityKind::Person,
                start: 0,
                end: 1,
                old: "a".to_string(),
                new: "b".to_string(),
                ok_slice: true,
            }],
        };
        assert!(report.check_schema().is_err());

        let fixed = Report {
            counts: Counts { total: 1, applied: 1, skipped: 0 },
            ..report
        };
        assert!(fixed.check_schema().is_ok());
    }
}

//! Mapping between client-facing field names and stored column names.
//!
//! Records serialize with camelCase field names. Stored rows use the table's
//! own column names: `created_at` everywhere, snake_case asset URLs on papers,
//! and the capitalized `Title`/`Date`/`Location` columns of the conference
//! table. Sequence-keyed tables store their id as a JSON number.

use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::id::IdStrategy;
use crate::resource::Resource;

const SHARED_COLUMNS: &[(&str, &str)] = &[("createdAt", "created_at")];

fn mappings<R: Resource>() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    SHARED_COLUMNS.iter().chain(R::COLUMNS.iter())
}

/// Stored column name for a client field.
pub fn column_for<R: Resource>(field: &str) -> &str {
    mappings::<R>()
        .find(|(f, _)| *f == field)
        .map(|(_, c)| *c)
        .unwrap_or(field)
}

/// Client field name for a stored column.
pub fn field_for<R: Resource>(column: &str) -> &str {
    mappings::<R>()
        .find(|(_, c)| *c == column)
        .map(|(f, _)| *f)
        .unwrap_or(column)
}

/// Serialize a record into a stored row.
pub fn to_row<R: Resource>(record: &R) -> Result<Value, TypeError> {
    let Value::Object(fields) = serde_json::to_value(record)? else {
        return Err(TypeError::RowNotObject);
    };
    let mut row = Map::with_capacity(fields.len());
    for (field, mut value) in fields {
        if field == "id" && R::ID_STRATEGY == IdStrategy::Sequence {
            value = sequence_key(value)?;
        }
        row.insert(column_for::<R>(&field).to_string(), value);
    }
    Ok(Value::Object(row))
}

/// Decode a stored row back into a record.
pub fn from_row<R: Resource>(row: Value) -> Result<R, TypeError> {
    let Value::Object(columns) = row else {
        return Err(TypeError::RowNotObject);
    };
    let mut fields = Map::with_capacity(columns.len());
    for (column, mut value) in columns {
        if column == "id" {
            if let Value::Number(n) = &value {
                value = Value::String(n.to_string());
            }
        }
        fields.insert(field_for::<R>(&column).to_string(), value);
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn sequence_key(value: Value) -> Result<Value, TypeError> {
    match &value {
        Value::String(s) => s
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| TypeError::InvalidId(s.clone())),
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conference::{ConferenceDraft, GlobalConference};
    use crate::id::RecordId;
    use crate::paper::{PaperDraft, ResearchPaper};
    use chrono::{NaiveDate, Utc};

    fn conference() -> GlobalConference {
        GlobalConference::from_draft(
            RecordId::from_seq(12),
            Utc::now(),
            ConferenceDraft {
                title: "CSSE".into(),
                date: NaiveDate::from_ymd_opt(2025, 6, 2),
                location: "Montreal".into(),
                description: "Canadian Society for the Study of Education".into(),
                link: Some("https://csse-scee.ca".into()),
            },
        )
    }

    #[test]
    fn conference_columns_are_capitalized() {
        let row = to_row(&conference()).unwrap();
        assert_eq!(row["Title"], "CSSE");
        assert_eq!(row["Location"], "Montreal");
        assert_eq!(row["Date"], "2025-06-02");
        assert_eq!(row["id"], 12);
        assert!(row.get("created_at").is_some());
        assert!(row.get("title").is_none());
    }

    #[test]
    fn conference_row_decodes_to_string_id() {
        let original = conference();
        let decoded: GlobalConference = from_row(to_row(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.id.as_str(), "12");
    }

    #[test]
    fn paper_asset_columns_are_snake_case() {
        let paper = ResearchPaper::from_draft(
            RecordId::new_uuid(),
            Utc::now(),
            PaperDraft {
                title: "T".into(),
                author: "A".into(),
                pdf_url: Some("https://cdn/x.pdf".into()),
                ..Default::default()
            },
        );
        let row = to_row(&paper).unwrap();
        assert_eq!(row["pdf_url"], "https://cdn/x.pdf");
        assert!(row.get("pdfUrl").is_none());
        assert!(row["id"].is_string());
    }

    #[test]
    fn field_lookup_falls_through() {
        assert_eq!(column_for::<GlobalConference>("description"), "description");
        assert_eq!(field_for::<GlobalConference>("Title"), "title");
    }

    #[test]
    fn non_object_rows_are_rejected() {
        assert_eq!(
            from_row::<GlobalConference>(Value::Null).unwrap_err(),
            TypeError::RowNotObject
        );
    }
}

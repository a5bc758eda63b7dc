use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_patched_text, require_text, ValidationError};
use crate::id::RecordId;
use crate::resource::{changed, Direction, ListOrder, OrderKey, Resource, ResourceKind};

/// A consortium event (symposium, workshop, meeting).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Event form fields. A missing date means "today" on creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;

    const KIND: ResourceKind = ResourceKind::Event;
    const ORDER: ListOrder = ListOrder::new(OrderKey::Date, Direction::Ascending);

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: EventDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            date: draft.date.unwrap_or_else(|| created_at.date_naive()),
            location: draft.location.trim().to_string(),
            description: draft.description,
            created_at,
        }
    }

    fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            date: Some(self.date),
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }

    fn apply(&mut self, patch: &EventPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(location) = &patch.location {
            self.location = location.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }

    fn diff(&self, edited: &EventDraft) -> EventPatch {
        EventPatch {
            title: changed(&self.title, &edited.title.trim().to_string()),
            date: edited.date.and_then(|d| changed(&self.date, &d)),
            location: changed(&self.location, &edited.location.trim().to_string()),
            description: changed(&self.description, &edited.description),
        }
    }

    fn validate_draft(draft: &EventDraft) -> Result<(), ValidationError> {
        require_text("title", &draft.title)?;
        require_text("location", &draft.location)?;
        require_text("description", &draft.description)
    }

    fn validate_patch(patch: &EventPatch) -> Result<(), ValidationError> {
        require_patched_text("title", &patch.title)?;
        require_patched_text("location", &patch.location)?;
        require_patched_text("description", &patch.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn symposium() -> EventDraft {
        EventDraft {
            title: "Spring Symposium".into(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1),
            location: "Toronto".into(),
            description: "Annual gathering".into(),
        }
    }

    #[test]
    fn draft_round_trips_through_form() {
        let e = Event::from_draft(RecordId::from("e1"), Utc::now(), symposium());
        assert_eq!(e.to_draft(), symposium());
    }

    #[test]
    fn missing_date_defaults_to_creation_day() {
        let created = Utc.with_ymd_and_hms(2024, 11, 2, 23, 0, 0).unwrap();
        let e = Event::from_draft(
            RecordId::from("e1"),
            created,
            EventDraft { date: None, ..symposium() },
        );
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
    }

    #[test]
    fn diff_and_apply() {
        let mut e = Event::from_draft(RecordId::from("e1"), Utc::now(), symposium());
        let mut edited = e.to_draft();
        edited.location = "Ottawa".into();
        let patch = e.diff(&edited);
        assert_eq!(patch, EventPatch { location: Some("Ottawa".into()), ..Default::default() });
        e.apply(&patch);
        assert_eq!(e.location, "Ottawa");
        assert_eq!(e.title, "Spring Symposium");
    }

    #[test]
    fn required_fields() {
        let d = EventDraft { description: String::new(), ..symposium() };
        assert_eq!(Event::validate_draft(&d), Err(ValidationError::MissingField("description")));
        assert!(Event::validate_patch(&EventPatch::default()).is_ok());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = EventPatch { title: Some("New".into()), ..Default::default() };
        let v = serde_json::to_value(&patch).unwrap();
        assert_eq!(v, serde_json::json!({ "title": "New" }));
    }
}

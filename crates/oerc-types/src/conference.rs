use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{check_link, non_empty, require_patched_text, require_text, ValidationError};
use crate::id::{IdStrategy, RecordId};
use crate::resource::{changed, Direction, ListOrder, OrderKey, Resource, ResourceKind};

/// An external conference listed alongside consortium events.
///
/// The backing table is keyed by an integer sequence and stores its title,
/// date, and location under capitalized column names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConference {
    pub id: RecordId,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GlobalConference {
    /// The public listing renders a clickable row only when this is `Some`.
    pub fn href(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| !l.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub description: String,
    pub link: Option<String>,
}

/// Changed conference fields. `link: Some("")` removes the link.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Resource for GlobalConference {
    type Draft = ConferenceDraft;
    type Patch = ConferencePatch;

    const KIND: ResourceKind = ResourceKind::Conference;
    const ORDER: ListOrder = ListOrder::new(OrderKey::Date, Direction::Ascending);
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequence;
    const COLUMNS: &'static [(&'static str, &'static str)] =
        &[("title", "Title"), ("date", "Date"), ("location", "Location")];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: ConferenceDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            date: draft.date.unwrap_or_else(|| created_at.date_naive()),
            location: draft.location.trim().to_string(),
            description: draft.description,
            link: non_empty(draft.link),
            created_at,
        }
    }

    fn to_draft(&self) -> ConferenceDraft {
        ConferenceDraft {
            title: self.title.clone(),
            date: Some(self.date),
            location: self.location.clone(),
            description: self.description.clone(),
            link: self.link.clone(),
        }
    }

    fn apply(&mut self, patch: &ConferencePatch) {
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
        if let Some(link) = &patch.link {
            self.link = non_empty(Some(link.clone()));
        }
    }

    fn diff(&self, edited: &ConferenceDraft) -> ConferencePatch {
        ConferencePatch {
            title: changed(&self.title, &edited.title.trim().to_string()),
            date: edited.date.and_then(|d| changed(&self.date, &d)),
            location: changed(&self.location, &edited.location.trim().to_string()),
            description: changed(&self.description, &edited.description),
            link: changed(&self.link, &non_empty(edited.link.clone())).map(Option::unwrap_or_default),
        }
    }

    fn validate_draft(draft: &ConferenceDraft) -> Result<(), ValidationError> {
        require_text("title", &draft.title)?;
        require_text("location", &draft.location)?;
        require_text("description", &draft.description)?;
        match &draft.link {
            Some(link) => check_link(link),
            None => Ok(()),
        }
    }

    fn validate_patch(patch: &ConferencePatch) -> Result<(), ValidationError> {
        require_patched_text("title", &patch.title)?;
        require_patched_text("location", &patch.location)?;
        require_patched_text("description", &patch.description)?;
        match &patch.link {
            Some(link) => check_link(link),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aera() -> ConferenceDraft {
        ConferenceDraft {
            title: "AERA Annual Meeting".into(),
            date: NaiveDate::from_ymd_opt(2025, 4, 23),
            location: "Denver".into(),
            description: "American Educational Research Association".into(),
            link: Some("   ".into()),
        }
    }

    #[test]
    fn blank_link_is_not_clickable() {
        let c = GlobalConference::from_draft(RecordId::from_seq(1), Utc::now(), aera());
        assert!(c.link.is_none());
        assert!(c.href().is_none());
    }

    #[test]
    fn adding_a_link_only_patches_link() {
        let mut c = GlobalConference::from_draft(RecordId::from_seq(1), Utc::now(), aera());
        let mut edited = c.to_draft();
        edited.link = Some("https://example.org".into());
        let patch = c.diff(&edited);
        assert_eq!(
            patch,
            ConferencePatch { link: Some("https://example.org".into()), ..Default::default() }
        );
        c.apply(&patch);
        assert_eq!(c.href(), Some("https://example.org"));
    }

    #[test]
    fn removing_a_link() {
        let mut d = aera();
        d.link = Some("https://example.org".into());
        let mut c = GlobalConference::from_draft(RecordId::from_seq(1), Utc::now(), d);
        let mut edited = c.to_draft();
        edited.link = Some(String::new());
        c.apply(&c.diff(&edited));
        assert!(c.href().is_none());
    }

    #[test]
    fn rejects_non_http_link() {
        let mut d = aera();
        d.link = Some("javascript:alert(1)".into());
        assert!(matches!(
            GlobalConference::validate_draft(&d),
            Err(ValidationError::InvalidLink(_))
        ));
    }

    #[test]
    fn keyed_by_sequence() {
        assert_eq!(GlobalConference::ID_STRATEGY, IdStrategy::Sequence);
    }
}

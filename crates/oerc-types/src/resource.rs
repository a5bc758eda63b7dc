//! The [`Resource`] trait shared by every managed entity.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{IdStrategy, RecordId};

/// The kinds of resources the site manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Paper,
    Event,
    Conference,
    Faq,
    Subscriber,
}

impl ResourceKind {
    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Paper => "research_papers",
            Self::Event => "events",
            Self::Conference => "global_conferences",
            Self::Faq => "faqs",
            Self::Subscriber => "newsletter_subscribers",
        }
    }

    /// Human-readable singular name, used in notices and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Event => "event",
            Self::Conference => "conference",
            Self::Faq => "FAQ",
            Self::Subscriber => "subscriber",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderKey {
    CreatedAt,
    Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Store-side ordering of a table's full listing.
///
/// Rows with equal keys fall back to creation time, then id, so listings are
/// deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListOrder {
    pub key: OrderKey,
    pub direction: Direction,
}

impl ListOrder {
    pub const fn new(key: OrderKey, direction: Direction) -> Self {
        Self { key, direction }
    }

    /// Stored column the listing is ordered by.
    pub fn column(&self) -> &'static str {
        match self.key {
            OrderKey::CreatedAt => "created_at",
            OrderKey::Date => "date",
        }
    }

    pub fn compare<R: Resource>(&self, a: &R, b: &R) -> Ordering {
        let primary = match self.key {
            OrderKey::CreatedAt => a.created_at().cmp(&b.created_at()),
            OrderKey::Date => a.date().cmp(&b.date()),
        };
        let ord = primary
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(b.id()));
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }

    pub fn sort<R: Resource>(&self, rows: &mut [R]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }

    /// Newest-first listings show fresh rows at the top.
    pub fn inserts_at_front(&self) -> bool {
        self.key == OrderKey::CreatedAt && self.direction == Direction::Descending
    }
}

/// A managed entity with its own table and CRUD lifecycle.
///
/// `Draft` is the full set of client-editable fields used for creation and
/// for the edit form. `Patch` carries only the fields an update changes;
/// `None` means "leave the column alone".
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    type Patch: Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    const KIND: ResourceKind;
    const ORDER: ListOrder;
    const ID_STRATEGY: IdStrategy = IdStrategy::Uuid;
    /// Client field name to stored column name, for fields whose names differ.
    const COLUMNS: &'static [(&'static str, &'static str)] = &[];

    fn id(&self) -> &RecordId;
    fn created_at(&self) -> DateTime<Utc>;

    /// Calendar date used by date-ordered tables.
    fn date(&self) -> Option<NaiveDate> {
        None
    }

    /// Value covered by the table's uniqueness constraint, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;
    fn to_draft(&self) -> Self::Draft;
    fn apply(&mut self, patch: &Self::Patch);

    /// Fields of `edited` that differ from `self`, as a patch.
    fn diff(&self, edited: &Self::Draft) -> Self::Patch;

    fn validate_draft(draft: &Self::Draft) -> Result<(), ValidationError>;
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;
}

/// `Some(new)` when `new` differs from `old`.
pub(crate) fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
    if old == new {
        None
    } else {
        Some(new.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventDraft};
    use crate::faq::{Faq, FaqDraft};
    use chrono::TimeZone;

    fn event(id: &str, date: (i32, u32, u32), created_secs: i64) -> Event {
        Event::from_draft(
            RecordId::from(id),
            Utc.timestamp_opt(created_secs, 0).unwrap(),
            EventDraft {
                title: id.into(),
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
                location: "Toronto".into(),
                description: "d".into(),
            },
        )
    }

    #[test]
    fn table_names() {
        assert_eq!(ResourceKind::Conference.table(), "global_conferences");
        assert_eq!(ResourceKind::Subscriber.to_string(), "newsletter_subscribers");
    }

    #[test]
    fn date_ascending_order() {
        let mut rows = vec![
            event("b", (2025, 6, 1), 1),
            event("a", (2025, 5, 1), 2),
            event("c", (2024, 1, 1), 3),
        ];
        Event::ORDER.sort(&mut rows);
        let ids: Vec<_> = rows.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn equal_dates_break_ties_by_creation() {
        let mut rows = vec![event("late", (2025, 5, 1), 9), event("early", (2025, 5, 1), 1)];
        Event::ORDER.sort(&mut rows);
        assert_eq!(rows[0].id.as_str(), "early");
    }

    #[test]
    fn created_ascending_for_faqs() {
        let mk = |id: &str, secs| {
            Faq::from_draft(
                RecordId::from(id),
                Utc.timestamp_opt(secs, 0).unwrap(),
                FaqDraft { question: "q".into(), answer: "a".into() },
            )
        };
        let mut rows = vec![mk("2", 20), mk("1", 10)];
        Faq::ORDER.sort(&mut rows);
        assert_eq!(rows[0].id.as_str(), "1");
        assert!(!Faq::ORDER.inserts_at_front());
    }

    #[test]
    fn changed_helper() {
        assert_eq!(changed(&1, &1), None);
        assert_eq!(changed(&1, &2), Some(2));
    }
}

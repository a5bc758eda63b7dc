//! Read-only listings for anonymous visitors.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use oerc_types::tags::{available_tags, filter_by_tags};
use oerc_types::{GlobalConference, RecordId, ResearchPaper, Resource};
use serde::Serialize;

use crate::repository::Repository;

/// Full listing in store order. A failed fetch is logged and shown as empty.
pub async fn public_listing<R: Resource>(repo: &dyn Repository<R>) -> Vec<R> {
    match repo.list().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(table = %R::KIND, error = %e, "public listing failed");
            Vec::new()
        }
    }
}

/// The research library with its tag selection.
#[derive(Clone, Debug, Default)]
pub struct ResearchView {
    papers: Vec<ResearchPaper>,
    selected: BTreeSet<String>,
}

impl ResearchView {
    pub fn new(papers: Vec<ResearchPaper>) -> Self {
        Self { papers, selected: BTreeSet::new() }
    }

    /// Select a tag, or deselect it if already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.selected.remove(tag) {
            self.selected.insert(tag.to_string());
        }
    }

    pub fn select_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.extend(tags.into_iter().map(Into::into));
    }

    pub fn clear_tags(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Papers carrying every selected tag.
    pub fn visible(&self) -> Vec<&ResearchPaper> {
        let selected: Vec<String> = self.selected.iter().cloned().collect();
        filter_by_tags(&self.papers, &selected)
    }

    pub fn available_tags(&self) -> Vec<String> {
        available_tags(&self.papers)
    }
}

/// One row of the public conference listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRow {
    pub id: RecordId,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    /// Present only when the row should render as a link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ConferenceRow {
    pub fn is_clickable(&self) -> bool {
        self.href.is_some()
    }
}

impl From<&GlobalConference> for ConferenceRow {
    fn from(c: &GlobalConference) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            date: c.date,
            location: c.location.clone(),
            description: c.description.clone(),
            href: c.href().map(str::to_string),
        }
    }
}

//! Health, info, and the public read-only listings.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use oerc_site::views::public_listing;
use oerc_site::{ConferenceRow, Repository, ResearchView, Site};
use oerc_types::tags::parse_tag_list;
use oerc_types::{Event, Faq, GlobalConference, ResearchPaper, Resource};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// A resource kind with a repository on the [`Site`].
pub trait Managed: Resource {
    fn repository(site: &Site) -> Arc<dyn Repository<Self>>;
}

impl Managed for ResearchPaper {
    fn repository(site: &Site) -> Arc<dyn Repository<Self>> {
        site.papers.clone()
    }
}

impl Managed for Event {
    fn repository(site: &Site) -> Arc<dyn Repository<Self>> {
        site.events.clone()
    }
}

impl Managed for GlobalConference {
    fn repository(site: &Site) -> Arc<dyn Repository<Self>> {
        site.conferences.clone()
    }
}

impl Managed for Faq {
    fn repository(site: &Site) -> Arc<dyn Repository<Self>> {
        site.faqs.clone()
    }
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "oerc-server",
        "version": env!("CARGO_PKG_VERSION"),
        "bucket": state.config.bucket,
        "persistent": state.config.data_dir.is_some(),
    }))
}

/// Full public listing of one resource kind, in store order.
pub async fn list<R: Managed>(State(state): State<AppState>) -> Json<Vec<R>> {
    let repo = R::repository(&state.site);
    Json(public_listing(repo.as_ref()).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct PaperQuery {
    /// Comma-separated; a paper must carry all of them.
    pub tags: Option<String>,
}

pub async fn papers(
    State(state): State<AppState>,
    Query(query): Query<PaperQuery>,
) -> Json<Vec<ResearchPaper>> {
    let papers = public_listing::<ResearchPaper>(state.site.papers.as_ref()).await;
    let mut view = ResearchView::new(papers);
    if let Some(tags) = query.tags.as_deref() {
        view.select_tags(parse_tag_list(tags));
    }
    Json(view.visible().into_iter().cloned().collect())
}

pub async fn paper_tags(State(state): State<AppState>) -> Json<Vec<String>> {
    let papers = public_listing::<ResearchPaper>(state.site.papers.as_ref()).await;
    let view = ResearchView::new(papers);
    Json(view.available_tags())
}

pub async fn conferences(State(state): State<AppState>) -> Json<Vec<ConferenceRow>> {
    let rows = public_listing(state.site.conferences.as_ref()).await;
    Json(rows.iter().map(ConferenceRow::from).collect())
}

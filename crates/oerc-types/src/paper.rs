use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{check_link, non_empty, require_patched_text, require_text, ValidationError};
use crate::id::RecordId;
use crate::resource::{changed, Direction, ListOrder, OrderKey, Resource, ResourceKind};
use crate::tags::normalize_tags;

/// A paper in the research library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPaper {
    pub id: RecordId,
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResearchPaper {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Paper metadata as entered in the upload/edit form.
///
/// `image_url` and `pdf_url` are filled in by the asset protocol after the
/// files are stored; the form itself never sets them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperDraft {
    pub title: String,
    pub author: String,
    pub date: Option<NaiveDate>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub pdf_url: Option<String>,
    pub video_url: Option<String>,
}

/// Changed paper fields. `video_url: Some("")` clears the video link.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl PaperPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Resource for ResearchPaper {
    type Draft = PaperDraft;
    type Patch = PaperPatch;

    const KIND: ResourceKind = ResourceKind::Paper;
    const ORDER: ListOrder = ListOrder::new(OrderKey::CreatedAt, Direction::Descending);
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("imageUrl", "image_url"),
        ("pdfUrl", "pdf_url"),
        ("videoUrl", "video_url"),
    ];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: PaperDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            author: draft.author.trim().to_string(),
            date: draft.date.unwrap_or_else(|| created_at.date_naive()),
            abstract_text: draft.abstract_text,
            tags: normalize_tags(draft.tags),
            image_url: non_empty(draft.image_url),
            pdf_url: non_empty(draft.pdf_url),
            video_url: non_empty(draft.video_url),
            created_at,
        }
    }

    fn to_draft(&self) -> PaperDraft {
        PaperDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            date: Some(self.date),
            abstract_text: self.abstract_text.clone(),
            tags: self.tags.clone(),
            image_url: self.image_url.clone(),
            pdf_url: self.pdf_url.clone(),
            video_url: self.video_url.clone(),
        }
    }

    fn apply(&mut self, patch: &PaperPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(author) = &patch.author {
            self.author = author.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(text) = &patch.abstract_text {
            self.abstract_text = text.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags.clone());
        }
        if let Some(url) = &patch.image_url {
            self.image_url = non_empty(Some(url.clone()));
        }
        if let Some(url) = &patch.pdf_url {
            self.pdf_url = non_empty(Some(url.clone()));
        }
        if let Some(url) = &patch.video_url {
            self.video_url = non_empty(Some(url.clone()));
        }
    }

    fn diff(&self, edited: &PaperDraft) -> PaperPatch {
        let video = non_empty(edited.video_url.clone());
        PaperPatch {
            title: changed(&self.title, &edited.title.trim().to_string()),
            author: changed(&self.author, &edited.author.trim().to_string()),
            date: edited.date.and_then(|d| changed(&self.date, &d)),
            abstract_text: changed(&self.abstract_text, &edited.abstract_text),
            tags: changed(&self.tags, &normalize_tags(edited.tags.clone())),
            image_url: non_empty(edited.image_url.clone())
                .and_then(|url| changed(&self.image_url, &Some(url)).flatten()),
            pdf_url: non_empty(edited.pdf_url.clone())
                .and_then(|url| changed(&self.pdf_url, &Some(url)).flatten()),
            video_url: changed(&self.video_url, &video).map(Option::unwrap_or_default),
        }
    }

    fn validate_draft(draft: &PaperDraft) -> Result<(), ValidationError> {
        require_text("title", &draft.title)?;
        require_text("author", &draft.author)?;
        if let Some(video) = &draft.video_url {
            check_link(video)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &PaperPatch) -> Result<(), ValidationError> {
        require_patched_text("title", &patch.title)?;
        require_patched_text("author", &patch.author)?;
        if let Some(video) = &patch.video_url {
            check_link(video)?;
        }
        Ok(())
    }
}

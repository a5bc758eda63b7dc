//! Privileged content endpoints. Every handler checks `ManageContent`
//! before reading the body or touching storage.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use oerc_auth::Capability;
use oerc_site::{Attachments, FileUpload, Repository};
use oerc_types::tags::parse_tag_list;
use oerc_types::{PaperDraft, PaperPatch, RecordId, ResearchPaper, Resource};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::handler::Managed;
use crate::state::AppState;

pub async fn create<R: Managed>(
    State(state): State<AppState>,
    caller: Caller,
    Json(draft): Json<R::Draft>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let admin = caller.require(&state, Capability::ManageContent).await?;
    let row = R::repository(&state.site)
        .create(draft, Attachments::default())
        .await?;
    let kind = R::KIND;
    tracing::info!(table = %kind, id = %row.id(), by = %admin.email, "created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// The body lists only the fields to change.
pub async fn update<R: Managed>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(patch): Json<R::Patch>,
) -> Result<Json<R>, ApiError> {
    caller.require(&state, Capability::ManageContent).await?;
    let id: RecordId = id.parse()?;
    let repo = R::repository(&state.site);
    let current = repo.fetch(&id).await?;
    let row = repo.update(&current, patch, Attachments::default()).await?;
    Ok(Json(row))
}

pub async fn remove<R: Managed>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    caller.require(&state, Capability::ManageContent).await?;
    let id: RecordId = id.parse()?;
    let repo = R::repository(&state.site);
    let current = repo.fetch(&id).await?;
    if repo.remove(&current).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("{} not found: {id}", R::KIND.label())))
    }
}

pub async fn create_paper(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResearchPaper>), ApiError> {
    let admin = caller.require(&state, Capability::ManageContent).await?;
    let (draft, files) = PaperForm::read(multipart).await?.into_draft();
    let paper = state.site.papers.create(draft, files).await?;
    tracing::info!(id = %paper.id, by = %admin.email, "paper uploaded");
    Ok((StatusCode::CREATED, Json(paper)))
}

/// Fields left out of the form are unchanged; file parts replace files.
pub async fn update_paper(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ResearchPaper>, ApiError> {
    caller.require(&state, Capability::ManageContent).await?;
    let id: RecordId = id.parse()?;
    let current = state.site.papers.fetch(&id).await?;
    let (patch, files) = PaperForm::read(multipart).await?.into_patch();
    let paper = state.site.papers.update(&current, patch, files).await?;
    Ok(Json(paper))
}

/// Multipart paper form: `title`, `author`, `abstract`, `tags`
/// (comma-separated), `date` (YYYY-MM-DD), `videoUrl`, and the `pdf` and
/// `image` file parts. Empty file parts count as "no file chosen".
#[derive(Debug, Default)]
struct PaperForm {
    title: Option<String>,
    author: Option<String>,
    abstract_text: Option<String>,
    tags: Option<Vec<String>>,
    date: Option<NaiveDate>,
    video_url: Option<String>,
    files: Attachments,
}

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::new(e.status(), e.body_text())
}

impl PaperForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "pdf" | "image" => {
                    let file_name = field.file_name().unwrap_or(&name).to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let upload = FileUpload { file_name, content_type, bytes };
                    if name == "pdf" {
                        form.files.pdf = Some(upload);
                    } else {
                        form.files.image = Some(upload);
                    }
                }
                "title" | "author" | "abstract" | "tags" | "date" | "videoUrl" => {
                    let text = field.text().await.map_err(bad_multipart)?;
                    form.set_text(&name, text)?;
                }
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn set_text(&mut self, name: &str, text: String) -> Result<(), ApiError> {
        match name {
            "title" => self.title = Some(text),
            "author" => self.author = Some(text),
            "abstract" => self.abstract_text = Some(text),
            "tags" => self.tags = Some(parse_tag_list(&text)),
            "videoUrl" => self.video_url = Some(text.trim().to_string()),
            "date" => {
                let text = text.trim();
                if !text.is_empty() {
                    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
                        ApiError::bad_request(format!("invalid date {text:?}: {e}"))
                    })?;
                    self.date = Some(date);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn into_draft(self) -> (PaperDraft, Attachments) {
        let draft = PaperDraft {
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            date: self.date,
            abstract_text: self.abstract_text.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            image_url: None,
            pdf_url: None,
            video_url: self.video_url.filter(|v| !v.is_empty()),
        };
        (draft, self.files)
    }

    fn into_patch(self) -> (PaperPatch, Attachments) {
        let patch = PaperPatch {
            title: self.title,
            author: self.author,
            date: self.date,
            abstract_text: self.abstract_text,
            tags: self.tags,
            image_url: None,
            pdf_url: None,
            video_url: self.video_url,
        };
        (patch, self.files)
    }
}

//! The admin list/form lifecycle, shared by every resource kind.

use std::sync::Arc;

use oerc_auth::{require, Capability, SessionHandle};
use oerc_types::{RecordId, Resource};

use crate::error::{SiteError, SiteResult};
use crate::notice::{Confirmation, Notice};
use crate::repository::Repository;
use crate::upload::Attachments;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

/// Form state: the fields being edited plus any chosen files.
#[derive(Clone, Debug)]
pub struct Form<R: Resource> {
    pub mode: FormMode,
    pub draft: R::Draft,
    pub files: Attachments,
}

impl<R: Resource> Form<R> {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }
}

impl<R: Resource> Default for Form<R> {
    fn default() -> Self {
        Self {
            mode: FormMode::Create,
            draft: R::Draft::default(),
            files: Attachments::default(),
        }
    }
}

/// List and form state over one resource table.
///
/// Mutations require `ManageContent` on the session's identity. Every
/// failure is logged, recorded as a [`Notice`], and reported to the caller
/// as `None` or `false`; nothing is retried. After a successful mutation the
/// list is re-fetched from the repository unless revalidation is turned off,
/// in which case the local list mirrors the mutation.
///
/// Methods take `&mut self`, so a manager runs one action at a time.
pub struct ResourceManager<R: Resource> {
    repo: Arc<dyn Repository<R>>,
    session: SessionHandle,
    items: Vec<R>,
    form: Form<R>,
    notice: Option<Notice>,
    revalidate: bool,
}

impl<R: Resource> ResourceManager<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, session: SessionHandle) -> Self {
        Self {
            repo,
            session,
            items: Vec::new(),
            form: Form::default(),
            notice: None,
            revalidate: true,
        }
    }

    pub fn with_revalidation(mut self, revalidate: bool) -> Self {
        self.revalidate = revalidate;
        self
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn form(&self) -> &Form<R> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form<R> {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Fetch the full list. A failed fetch leaves the list empty.
    pub async fn load(&mut self) -> &[R] {
        match self.repo.list().await {
            Ok(rows) => self.items = rows,
            Err(e) => {
                tracing::error!(table = %R::KIND, error = %e, "failed to load rows");
                self.items.clear();
            }
        }
        &self.items
    }

    pub async fn create(&mut self, draft: R::Draft, files: Attachments) -> Option<R> {
        let result = match self.authorize() {
            Ok(()) => self.repo.create(draft, files).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(row) => {
                self.insert_local(row.clone());
                self.form = Form::default();
                self.succeed(format!("{} created.", capitalized(R::KIND.label())));
                self.revalidate().await;
                Some(row)
            }
            Err(e) => {
                self.fail("create", &e);
                None
            }
        }
    }

    /// Fill the form from an existing row. File slots start empty.
    pub fn begin_edit(&mut self, id: &RecordId) -> bool {
        let Some(row) = self.items.iter().find(|r| r.id() == id) else {
            return false;
        };
        self.form = Form {
            mode: FormMode::Edit(id.clone()),
            draft: row.to_draft(),
            files: Attachments::default(),
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.form = Form::default();
    }

    /// Create or update from the current form, depending on its mode.
    pub async fn submit(&mut self) -> Option<R> {
        let form = self.form.clone();
        match form.mode {
            FormMode::Create => self.create(form.draft, form.files).await,
            FormMode::Edit(id) => self.update(&id, form.draft, form.files).await,
        }
    }

    /// Send the fields of `edited` that differ from the listed row.
    pub async fn update(&mut self, id: &RecordId, edited: R::Draft, files: Attachments) -> Option<R> {
        let Some(current) = self.items.iter().find(|r| r.id() == id).cloned() else {
            let e = SiteError::NotFound { kind: R::KIND.label(), id: id.clone() };
            self.fail("update", &e);
            return None;
        };
        let patch = current.diff(&edited);
        let result = match self.authorize() {
            Ok(()) if patch == R::Patch::default() && files.is_empty() => Ok(current),
            Ok(()) => self.repo.update(&current, patch, files).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(row) => {
                if let Some(slot) = self.items.iter_mut().find(|r| r.id() == id) {
                    *slot = row.clone();
                }
                self.form = Form::default();
                self.succeed(format!("{} updated.", capitalized(R::KIND.label())));
                self.revalidate().await;
                Some(row)
            }
            Err(e) => {
                self.fail("update", &e);
                None
            }
        }
    }

    /// Delete after confirmation. Declining makes no call and sets no notice.
    pub async fn delete(&mut self, id: &RecordId, confirm: impl Confirmation) -> bool {
        let Some(current) = self.items.iter().find(|r| r.id() == id).cloned() else {
            let e = SiteError::NotFound { kind: R::KIND.label(), id: id.clone() };
            self.fail("delete", &e);
            return false;
        };
        let prompt = format!("Are you sure you want to delete this {}?", R::KIND.label());
        if !confirm.confirm(&prompt) {
            return false;
        }
        let result = match self.authorize() {
            Ok(()) => self.repo.remove(&current).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(removed) => {
                self.items.retain(|r| r.id() != id);
                if self.form.mode == FormMode::Edit(id.clone()) {
                    self.form = Form::default();
                }
                if removed {
                    self.succeed(format!("{} deleted.", capitalized(R::KIND.label())));
                } else {
                    let e = SiteError::NotFound { kind: R::KIND.label(), id: id.clone() };
                    self.fail("delete", &e);
                }
                self.revalidate().await;
                removed
            }
            Err(e) => {
                self.fail("delete", &e);
                false
            }
        }
    }

    fn authorize(&self) -> SiteResult<()> {
        let identity = self.session.identity();
        require(identity.as_ref(), Capability::ManageContent)?;
        Ok(())
    }

    fn insert_local(&mut self, row: R) {
        if R::ORDER.inserts_at_front() {
            self.items.insert(0, row);
        } else {
            self.items.push(row);
            R::ORDER.sort(&mut self.items);
        }
    }

    async fn revalidate(&mut self) {
        if !self.revalidate {
            return;
        }
        match self.repo.list().await {
            Ok(rows) => self.items = rows,
            Err(e) => tracing::warn!(table = %R::KIND, error = %e, "re-fetch after write failed"),
        }
    }

    fn succeed(&mut self, message: String) {
        self.notice = Some(Notice::Success(message));
    }

    fn fail(&mut self, action: &str, error: &SiteError) {
        tracing::error!(table = %R::KIND, action, error = %error, "admin action failed");
        self.notice = Some(Notice::Failure(format!(
            "Failed to {action} {}. Please try again.",
            R::KIND.label()
        )));
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

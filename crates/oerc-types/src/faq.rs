use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_patched_text, require_text, ValidationError};
use crate::id::RecordId;
use crate::resource::{changed, Direction, ListOrder, OrderKey, Resource, ResourceKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqDraft {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Resource for Faq {
    type Draft = FaqDraft;
    type Patch = FaqPatch;

    const KIND: ResourceKind = ResourceKind::Faq;
    const ORDER: ListOrder = ListOrder::new(OrderKey::CreatedAt, Direction::Ascending);

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: FaqDraft) -> Self {
        Self {
            id,
            question: draft.question.trim().to_string(),
            answer: draft.answer,
            created_at,
        }
    }

    fn to_draft(&self) -> FaqDraft {
        FaqDraft {
            question: self.question.clone(),
            answer: self.answer.clone(),
        }
    }

    fn apply(&mut self, patch: &FaqPatch) {
        if let Some(question) = &patch.question {
            self.question = question.trim().to_string();
        }
        if let Some(answer) = &patch.answer {
            self.answer = answer.clone();
        }
    }

    fn diff(&self, edited: &FaqDraft) -> FaqPatch {
        FaqPatch {
            question: changed(&self.question, &edited.question.trim().to_string()),
            answer: changed(&self.answer, &edited.answer),
        }
    }

    fn validate_draft(draft: &FaqDraft) -> Result<(), ValidationError> {
        require_text("question", &draft.question)?;
        require_text("answer", &draft.answer)
    }

    fn validate_patch(patch: &FaqPatch) -> Result<(), ValidationError> {
        require_patched_text("question", &patch.question)?;
        require_patched_text("answer", &patch.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_lifecycle_fields() {
        let mut faq = Faq::from_draft(
            RecordId::from("f1"),
            Utc::now(),
            FaqDraft { question: " Who can join? ".into(), answer: "Anyone.".into() },
        );
        assert_eq!(faq.question, "Who can join?");

        let mut edited = faq.to_draft();
        edited.answer = "Educators and researchers.".into();
        let patch = faq.diff(&edited);
        assert!(patch.question.is_none());
        faq.apply(&patch);
        assert_eq!(faq.answer, "Educators and researchers.");
    }

    #[test]
    fn both_fields_required() {
        let d = FaqDraft { question: "Q".into(), answer: "".into() };
        assert_eq!(Faq::validate_draft(&d), Err(ValidationError::MissingField("answer")));
    }
}

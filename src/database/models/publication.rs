use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::error::FieldErrors;

pub const PUBLICATION_STATUSES: &[&str] = &["draft", "pending_review", "published", "rejected"];

/// Statuses an author may set on their own publication
pub const AUTHOR_STATUSES: &[&str] = &["draft", "pending_review"];

const MAX_TERMS: usize = 20;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: Uuid,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub content: String,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag or category row
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDetail {
    #[serde(flatten)]
    pub publication: Publication,
    pub tags: Vec<Term>,
    pub categories: Vec<Term>,
    /// Present on owner reads of a rejected publication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionReason {
    pub reason: String,
    pub details: Option<String>,
    pub rejected_at: DateTime<Utc>,
    pub rejected_by: String,
}

/// Stored in `content` when a publication is rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionEnvelope {
    pub original_content: String,
    pub rejection_reason: RejectionReason,
}

impl RejectionEnvelope {
    pub fn wrap(original_content: String, reason: RejectionReason) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RejectionEnvelope {
            original_content,
            rejection_reason: reason,
        })
    }

    /// `None` when the content is not an envelope
    pub fn unwrap_content(content: &str) -> Option<RejectionEnvelope> {
        serde_json::from_str(content).ok()
    }
}

fn check_terms(errors: &mut FieldErrors, field: &str, terms: Option<&[String]>) {
    if let Some(terms) = terms {
        if terms.len() > MAX_TERMS {
            errors.insert(field.to_string(), format!("At most {} entries", MAX_TERMS));
        } else if terms.iter().any(|t| t.trim().is_empty() || t.chars().count() > 60) {
            errors.insert(
                field.to_string(),
                "Entries must be non-empty and at most 60 characters".to_string(),
            );
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublication {
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Submit for review immediately instead of saving a draft
    #[serde(default)]
    pub submit: bool,
}

impl Validate for CreatePublication {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, 300);
        validate::max_len(errors, "abstract", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "content", Some(&self.content), 200_000);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        check_terms(errors, "tags", Some(&self.tags));
        check_terms(errors, "categories", Some(&self.categories));
    }
}

impl CreatePublication {
    pub fn status(&self) -> &'static str {
        if self.submit {
            "pending_review"
        } else {
            "draft"
        }
    }
}

/// Partial update; `tags`/`categories` replace the full set when present
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublication {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub content: Option<String>,
    pub thumbnail_url: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl Validate for UpdatePublication {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), 300);
        validate::max_len(errors, "abstract", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "content", self.content.as_deref(), 200_000);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        validate::one_of(errors, "status", self.status.as_deref(), PUBLICATION_STATUSES);
        check_terms(errors, "tags", self.tags.as_deref());
        check_terms(errors, "categories", self.categories.as_deref());
    }
}

impl UpdatePublication {
    /// Scalar columns other than status and slug
    pub fn content_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title.clone())
            .set_opt_text("abstract", self.summary.clone())
            .set_some("content", self.content.clone())
            .set_opt_text("thumbnail_url", self.thumbnail_url.clone());
        fields
    }
}

/// Reviewer overrides applied on approval
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationModifications {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl From<PublicationModifications> for UpdatePublication {
    fn from(m: PublicationModifications) -> Self {
        UpdatePublication {
            title: m.title,
            summary: m.summary,
            content: m.content,
            thumbnail_url: None,
            status: None,
            tags: m.tags,
            categories: m.categories,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePublication {
    pub modifications: Option<PublicationModifications>,
}

impl Validate for ApprovePublication {
    fn check(&self, errors: &mut FieldErrors) {
        if let Some(m) = &self.modifications {
            validate::required_if_present(errors, "modifications.title", m.title.as_deref(), 300);
            validate::max_len(errors, "modifications.abstract", m.summary.as_deref(), 2_000);
            validate::max_len(errors, "modifications.content", m.content.as_deref(), 200_000);
            check_terms(errors, "modifications.tags", m.tags.as_deref());
            check_terms(errors, "modifications.categories", m.categories.as_deref());
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectPublication {
    pub reason: String,
    pub details: Option<String>,
}

impl Validate for RejectPublication {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "reason", &self.reason, 500);
        validate::max_len(errors, "details", self.details.as_deref(), 5_000);
    }
}

/// `?category=&tag=&page=&limit=` for public browsing
#[derive(Debug, Default, Deserialize)]
pub struct PublicationQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason() -> RejectionReason {
        RejectionReason {
            reason: "Needs sources".into(),
            details: Some("Cite the 2023 data".into()),
            rejected_at: "2025-01-02T03:04:05Z".parse().unwrap(),
            rejected_by: "admin_1".into(),
        }
    }

    #[test]
    fn rejection_envelope_shape() {
        let wrapped = RejectionEnvelope::wrap("Original body".into(), reason()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(value["originalContent"], "Original body");
        assert_eq!(value["rejectionReason"]["reason"], "Needs sources");
        assert_eq!(value["rejectionReason"]["details"], "Cite the 2023 data");
        assert_eq!(value["rejectionReason"]["rejectedBy"], "admin_1");
        assert!(value["rejectionReason"]["rejectedAt"].is_string());

        let unpacked = RejectionEnvelope::unwrap_content(&wrapped).unwrap();
        assert_eq!(unpacked.original_content, "Original body");
        assert_eq!(unpacked.rejection_reason, reason());
    }

    #[test]
    fn plain_content_is_not_an_envelope() {
        assert!(RejectionEnvelope::unwrap_content("Just prose").is_none());
        assert!(RejectionEnvelope::unwrap_content(r#"{"foo":1}"#).is_none());
    }

    #[test]
    fn abstract_field_is_named_on_the_wire() {
        let input: CreatePublication =
            serde_json::from_str(r#"{"title":"Tariffs","abstract":"Short","tags":["Trade"],"submit":true}"#).unwrap();
        assert_eq!(input.summary.as_deref(), Some("Short"));
        assert_eq!(input.status(), "pending_review");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_content_fields_skip_status_and_terms() {
        let patch: UpdatePublication =
            serde_json::from_str(r#"{"title":"New","status":"published","tags":[]}"#).unwrap();
        assert_eq!(patch.content_fields().columns(), vec!["title"]);
    }

    #[test]
    fn blank_tags_are_rejected() {
        let patch = UpdatePublication {
            tags: Some(vec!["Trade".into(), " ".into()]),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}

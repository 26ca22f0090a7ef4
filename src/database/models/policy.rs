use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::database::resource::{Changeset, Resource};
use crate::error::FieldErrors;

pub const POLICY_STATUSES: &[&str] = &["draft", "published"];
pub const CAMPAIGN_STATUSES: &[&str] = &["planned", "active", "completed"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub document_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_policy_status")]
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub document_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

fn default_policy_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicy {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
    pub document_url: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreatePolicy {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, 200);
        validate::max_len(errors, "summary", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "category", self.category.as_deref(), 100);
        validate::one_of(errors, "status", Some(&self.status), POLICY_STATUSES);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        validate::url(errors, "documentUrl", self.document_url.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdatePolicy {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), 200);
        validate::max_len(errors, "summary", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "category", self.category.as_deref(), 100);
        validate::one_of(errors, "status", self.status.as_deref(), POLICY_STATUSES);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        validate::url(errors, "documentUrl", self.document_url.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreatePolicy {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", self.title)
            .set("summary", self.summary)
            .set("content", self.content)
            .set("category", self.category)
            .set("status", self.status)
            .set("thumbnail_url", self.thumbnail_url)
            .set("document_url", self.document_url)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdatePolicy {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title)
            .set_opt_text("summary", self.summary)
            .set_opt_text("content", self.content)
            .set_opt_text("category", self.category)
            .set_some("status", self.status)
            .set_opt_text("thumbnail_url", self.thumbnail_url)
            .set_opt_text("document_url", self.document_url)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for Policy {
    const TABLE: &'static str = "policies";
    const LABEL: &'static str = "Policy";
    const PUBLIC_FILTER: Option<&'static str> = Some("\"status\" = 'published'");
    const CHILDREN: &'static [(&'static str, &'static str)] = &[("policy_case_studies", "policy_id")];
    type Create = CreatePolicy;
    type Update = UpdatePolicy;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub outcome: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseStudy {
    pub policy_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub outcome: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseStudy {
    pub policy_id: Option<Uuid>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub outcome: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateCaseStudy {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, 200);
        validate::max_len(errors, "summary", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "outcome", self.outcome.as_deref(), 2_000);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateCaseStudy {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), 200);
        validate::max_len(errors, "summary", self.summary.as_deref(), 2_000);
        validate::max_len(errors, "outcome", self.outcome.as_deref(), 2_000);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateCaseStudy {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("policy_id", self.policy_id)
            .set("title", self.title)
            .set("summary", self.summary)
            .set("content", self.content)
            .set("outcome", self.outcome)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateCaseStudy {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("policy_id", self.policy_id)
            .set_some("title", self.title)
            .set_opt_text("summary", self.summary)
            .set_opt_text("content", self.content)
            .set_opt_text("outcome", self.outcome)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for CaseStudy {
    const TABLE: &'static str = "policy_case_studies";
    const LABEL: &'static str = "Case study";
    const PARENT_KEY: Option<&'static str> = Some("policy_id");
    type Create = CreateCaseStudy;
    type Update = UpdateCaseStudy;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Stored campaign row; `achievements` holds a JSON array as text
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub achievements: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campaign as served to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocacyCampaign {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub achievements: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CampaignRow> for AdvocacyCampaign {
    fn from(row: CampaignRow) -> Self {
        let achievements = decode_achievements(&row.achievements);
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            achievements,
            start_date: row.start_date,
            end_date: row.end_date,
            display_order: row.display_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub fn encode_achievements(achievements: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(achievements)
}

/// Malformed stored text reads back as an empty list
pub fn decode_achievements(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Discarding malformed campaign achievements: {}", e);
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaign {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_campaign_status")]
    pub status: String,
    #[serde(default)]
    pub achievements: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub display_order: i32,
}

fn default_campaign_status() -> String {
    "planned".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaign {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    /// Replaces the whole list when present
    pub achievements: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub display_order: Option<i32>,
}

fn check_achievements(errors: &mut FieldErrors, achievements: Option<&[String]>) {
    if let Some(list) = achievements {
        if list.len() > 100 {
            errors.insert("achievements".to_string(), "At most 100 entries".to_string());
        } else if list.iter().any(|a| a.trim().is_empty() || a.chars().count() > 500) {
            errors.insert(
                "achievements".to_string(),
                "Entries must be non-empty and at most 500 characters".to_string(),
            );
        }
    }
}

impl Validate for CreateCampaign {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, 200);
        validate::max_len(errors, "description", self.description.as_deref(), 10_000);
        validate::one_of(errors, "status", Some(&self.status), CAMPAIGN_STATUSES);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
        check_achievements(errors, Some(&self.achievements));
    }
}

impl Validate for UpdateCampaign {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), 200);
        validate::max_len(errors, "description", self.description.as_deref(), 10_000);
        validate::one_of(errors, "status", self.status.as_deref(), CAMPAIGN_STATUSES);
        validate::non_negative(errors, "displayOrder", self.display_order);
        check_achievements(errors, self.achievements.as_deref());
    }
}

impl CreateCampaign {
    /// Scalar columns; achievements are encoded separately
    pub fn scalar_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", self.title.clone())
            .set("description", self.description.clone())
            .set("status", self.status.clone())
            .set("start_date", self.start_date)
            .set("end_date", self.end_date)
            .set("display_order", self.display_order);
        fields
    }
}

impl UpdateCampaign {
    pub fn scalar_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title.clone())
            .set_opt_text("description", self.description.clone())
            .set_some("status", self.status.clone())
            .set_some("start_date", self.start_date)
            .set_some("end_date", self.end_date)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Changeset for CreateCampaign {
    fn into_fields(self) -> Fields {
        let mut fields = self.scalar_fields();
        match encode_achievements(&self.achievements) {
            Ok(encoded) => {
                fields.set("achievements", encoded);
            }
            Err(e) => tracing::warn!("Could not encode achievements: {}", e),
        }
        fields
    }
}

impl Changeset for UpdateCampaign {
    fn into_fields(self) -> Fields {
        let mut fields = self.scalar_fields();
        if let Some(list) = &self.achievements {
            match encode_achievements(list) {
                Ok(encoded) => {
                    fields.set("achievements", encoded);
                }
                Err(e) => tracing::warn!("Could not encode achievements: {}", e),
            }
        }
        fields
    }
}

impl Resource for CampaignRow {
    const TABLE: &'static str = "advocacy_campaigns";
    const LABEL: &'static str = "Campaign";
    type Create = CreateCampaign;
    type Update = UpdateCampaign;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::FieldValue;

    #[test]
    fn achievements_codec() {
        let list = vec!["Passed bill 12".to_string(), "Held 3 hearings".to_string()];
        let encoded = encode_achievements(&list).unwrap();
        assert_eq!(encoded, r#"["Passed bill 12","Held 3 hearings"]"#);
        assert_eq!(decode_achievements(&encoded), list);
        assert_eq!(encode_achievements(&[]).unwrap(), "[]");
    }

    #[test]
    fn malformed_achievements_read_as_empty() {
        assert!(decode_achievements("").is_empty());
        assert!(decode_achievements("not json").is_empty());
        assert!(decode_achievements(r#"{"a":1}"#).is_empty());
    }

    #[test]
    fn update_without_achievements_leaves_column_alone() {
        let patch: UpdateCampaign = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
        let fields = patch.into_fields();
        assert_eq!(fields.columns(), vec!["status"]);

        let patch: UpdateCampaign = serde_json::from_str(r#"{"achievements":[]}"#).unwrap();
        assert_eq!(patch.into_fields().get("achievements"), Some(&FieldValue::Text("[]".into())));
    }

    #[test]
    fn policy_status_is_restricted() {
        let input: CreatePolicy = serde_json::from_str(r#"{"title":"Carbon pricing","status":"archived"}"#).unwrap();
        assert!(input.validate().is_err());
        let input: CreatePolicy = serde_json::from_str(r#"{"title":"Carbon pricing"}"#).unwrap();
        assert_eq!(input.status, "draft");
    }
}

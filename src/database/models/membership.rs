use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::database::resource::{Changeset, Resource};
use crate::error::FieldErrors;

pub const BILLING_PERIODS: &[&str] = &["monthly", "yearly", "lifetime", "one_time"];
pub const MEMBERSHIP_STATUSES: &[&str] = &["pending", "active", "expired", "cancelled"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MembershipType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub billing_period: String,
    pub benefits: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipType {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: i32,
    #[serde(default = "default_billing_period")]
    pub billing_period: String,
    pub benefits: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_billing_period() -> String {
    "yearly".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipType {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub billing_period: Option<String>,
    pub benefits: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

impl Validate for CreateMembershipType {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "name", &self.name, 120);
        validate::max_len(errors, "description", self.description.as_deref(), 5_000);
        validate::non_negative(errors, "priceCents", Some(self.price_cents));
        validate::one_of(errors, "billingPeriod", Some(&self.billing_period), BILLING_PERIODS);
        validate::max_len(errors, "benefits", self.benefits.as_deref(), 5_000);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateMembershipType {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "name", self.name.as_deref(), 120);
        validate::max_len(errors, "description", self.description.as_deref(), 5_000);
        validate::non_negative(errors, "priceCents", self.price_cents);
        validate::one_of(errors, "billingPeriod", self.billing_period.as_deref(), BILLING_PERIODS);
        validate::max_len(errors, "benefits", self.benefits.as_deref(), 5_000);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateMembershipType {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("name", self.name)
            .set("description", self.description)
            .set("price_cents", self.price_cents)
            .set("billing_period", self.billing_period)
            .set("benefits", self.benefits)
            .set("is_active", self.is_active)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateMembershipType {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("name", self.name)
            .set_opt_text("description", self.description)
            .set_some("price_cents", self.price_cents)
            .set_some("billing_period", self.billing_period)
            .set_opt_text("benefits", self.benefits)
            .set_some("is_active", self.is_active)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for MembershipType {
    const TABLE: &'static str = "membership_types";
    const LABEL: &'static str = "Membership type";
    const PUBLIC_FILTER: Option<&'static str> = Some("\"is_active\"");
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[("memberships", "membership_type_id")];
    type Create = CreateMembershipType;
    type Update = UpdateMembershipType;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: String,
    pub membership_type_id: Uuid,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembership {
    pub user_id: String,
    pub membership_type_id: Uuid,
    #[serde(default = "default_membership_status")]
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub display_order: i32,
}

fn default_membership_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembership {
    pub membership_type_id: Option<Uuid>,
    pub status: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub display_order: Option<i32>,
}

impl Validate for CreateMembership {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "userId", &self.user_id, 200);
        validate::one_of(errors, "status", Some(&self.status), MEMBERSHIP_STATUSES);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateMembership {
    fn check(&self, errors: &mut FieldErrors) {
        validate::one_of(errors, "status", self.status.as_deref(), MEMBERSHIP_STATUSES);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateMembership {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("user_id", self.user_id)
            .set("membership_type_id", self.membership_type_id)
            .set("status", self.status)
            .set("started_at", self.started_at)
            .set("expires_at", self.expires_at)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateMembership {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("membership_type_id", self.membership_type_id)
            .set_some("status", self.status)
            .set_some("started_at", self.started_at)
            .set_some("expires_at", self.expires_at)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for Membership {
    const TABLE: &'static str = "memberships";
    const LABEL: &'static str = "Membership";
    type Create = CreateMembership;
    type Update = UpdateMembership;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaq {
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaq {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateFaq {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "question", &self.question, 500);
        validate::required(errors, "answer", &self.answer, 5_000);
        validate::max_len(errors, "category", self.category.as_deref(), 100);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateFaq {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "question", self.question.as_deref(), 500);
        validate::required_if_present(errors, "answer", self.answer.as_deref(), 5_000);
        validate::max_len(errors, "category", self.category.as_deref(), 100);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateFaq {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("question", self.question)
            .set("answer", self.answer)
            .set("category", self.category)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateFaq {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("question", self.question)
            .set_some("answer", self.answer)
            .set_opt_text("category", self.category)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for Faq {
    const TABLE: &'static str = "faqs";
    const LABEL: &'static str = "FAQ";
    type Create = CreateFaq;
    type Update = UpdateFaq;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_type_defaults() {
        let input: CreateMembershipType = serde_json::from_str(r#"{"name":"Student"}"#).unwrap();
        assert!(input.is_active);
        assert_eq!(input.billing_period, "yearly");
        assert_eq!(input.price_cents, 0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let patch = UpdateMembershipType {
            price_cents: Some(-100),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn deletion_is_blocked_by_memberships() {
        assert_eq!(MembershipType::REFERENCED_BY, &[("memberships", "membership_type_id")]);
        assert_eq!(MembershipType::PUBLIC_FILTER, Some("\"is_active\""));
    }
}

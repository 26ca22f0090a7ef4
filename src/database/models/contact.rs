use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::error::FieldErrors;

pub const INQUIRY_TYPES: &[&str] = &["general", "membership", "partnership", "media", "other"];
pub const CONTACT_STATUSES: &[&str] = &["new", "in_progress", "resolved"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub inquiry_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default = "default_inquiry_type")]
    pub inquiry_type: String,
}

fn default_inquiry_type() -> String {
    "general".to_string()
}

impl Validate for CreateContactSubmission {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "name", &self.name, 120);
        validate::required(errors, "email", &self.email, 254);
        if !errors.contains_key("email") {
            validate::email(errors, "email", Some(&self.email));
        }
        validate::required(errors, "subject", &self.subject, 200);
        validate::required(errors, "message", &self.message, 5_000);
        validate::one_of(errors, "inquiryType", Some(&self.inquiry_type), INQUIRY_TYPES);
    }
}

impl CreateContactSubmission {
    /// New submissions always start in `new`
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("name", self.name.trim().to_string())
            .set("email", self.email.trim().to_string())
            .set("subject", self.subject)
            .set("message", self.message)
            .set("inquiry_type", self.inquiry_type)
            .set("status", "new".to_string());
        fields
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusUpdate {
    pub status: String,
}

impl Validate for ContactStatusUpdate {
    fn check(&self, errors: &mut FieldErrors) {
        validate::one_of(errors, "status", Some(&self.status), CONTACT_STATUSES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::FieldValue;

    #[test]
    fn intake_forces_status_new() {
        let input: CreateContactSubmission = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.org","subject":"Hello","message":"Interested in partnering"}"#,
        )
        .unwrap();
        assert!(input.validate().is_ok());
        let fields = input.into_fields();
        assert_eq!(fields.get("status"), Some(&FieldValue::Text("new".into())));
        assert_eq!(fields.get("inquiry_type"), Some(&FieldValue::Text("general".into())));
    }

    #[test]
    fn intake_reports_each_bad_field() {
        let input: CreateContactSubmission = serde_json::from_str(
            r#"{"name":"","email":"nope","subject":"Hi","message":"","inquiryType":"sales"}"#,
        )
        .unwrap();
        match input.validate() {
            Err(crate::error::ApiError::ValidationError { field_errors: Some(fields), .. }) => {
                let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["email", "inquiryType", "message", "name"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn status_update_accepts_any_known_status() {
        for status in CONTACT_STATUSES {
            let update = ContactStatusUpdate { status: status.to_string() };
            assert!(update.validate().is_ok());
        }
        let update = ContactStatusUpdate { status: "closed".into() };
        assert!(update.validate().is_err());
    }
}

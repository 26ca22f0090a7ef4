use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::error::FieldErrors;

/// Profile row keyed by the identity-provider user id
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub organization: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User listing entry for administrators
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    #[serde(flatten)]
    pub user: User,
    pub is_admin: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub organization: Option<String>,
    pub is_public: Option<bool>,
}

impl Validate for UpdateProfile {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "name", self.name.as_deref(), 120);
        validate::max_len(errors, "bio", self.bio.as_deref(), 2_000);
        validate::url(errors, "avatarUrl", self.avatar_url.as_deref());
        validate::max_len(errors, "organization", self.organization.as_deref(), 200);
    }
}

impl UpdateProfile {
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_opt_text("name", self.name)
            .set_opt_text("bio", self.bio)
            .set_opt_text("avatar_url", self.avatar_url)
            .set_opt_text("organization", self.organization)
            .set_some("is_public", self.is_public);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_view_flattens_user() {
        let view = AdminUserView {
            user: User {
                id: "user_1".into(),
                email: Some("a@example.org".into()),
                name: None,
                bio: None,
                avatar_url: None,
                organization: None,
                is_public: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            is_admin: true,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["id"], "user_1");
        assert_eq!(value["isAdmin"], true);
        assert_eq!(value["isPublic"], false);
    }

    #[test]
    fn profile_update_fields() {
        let patch: UpdateProfile = serde_json::from_str(r#"{"bio":"Economist","isPublic":true}"#).unwrap();
        assert!(patch.validate().is_ok());
        assert_eq!(patch.into_fields().columns(), vec!["bio", "is_public"]);
    }
}

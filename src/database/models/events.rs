use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::database::resource::{Changeset, Resource};
use crate::error::FieldErrors;

pub const EVENT_STATUSES: &[&str] = &["upcoming", "ongoing", "completed", "cancelled"];
pub const MEDIA_TYPES: &[&str] = &["image", "video", "document", "link"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub registration_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_event_status")]
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub registration_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

fn default_event_status() -> String {
    "upcoming".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
    pub registration_url: Option<String>,
    pub display_order: Option<i32>,
}

fn check_dates(errors: &mut FieldErrors, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.insert("endDate".to_string(), "Must not be before startDate".to_string());
        }
    }
}

impl Validate for CreateEvent {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, 200);
        validate::max_len(errors, "description", self.description.as_deref(), 20_000);
        validate::max_len(errors, "location", self.location.as_deref(), 300);
        validate::one_of(errors, "status", Some(&self.status), EVENT_STATUSES);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        validate::url(errors, "registrationUrl", self.registration_url.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
        check_dates(errors, Some(self.start_date), self.end_date);
    }
}

impl Validate for UpdateEvent {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), 200);
        validate::max_len(errors, "description", self.description.as_deref(), 20_000);
        validate::max_len(errors, "location", self.location.as_deref(), 300);
        validate::one_of(errors, "status", self.status.as_deref(), EVENT_STATUSES);
        validate::url(errors, "thumbnailUrl", self.thumbnail_url.as_deref());
        validate::url(errors, "registrationUrl", self.registration_url.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
        check_dates(errors, self.start_date, self.end_date);
    }
}

impl Changeset for CreateEvent {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", self.title)
            .set("description", self.description)
            .set("location", self.location)
            .set("start_date", self.start_date)
            .set("end_date", self.end_date)
            .set("status", self.status)
            .set("thumbnail_url", self.thumbnail_url)
            .set("registration_url", self.registration_url)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateEvent {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title)
            .set_opt_text("description", self.description)
            .set_opt_text("location", self.location)
            .set_some("start_date", self.start_date)
            .set_some("end_date", self.end_date)
            .set_some("status", self.status)
            .set_opt_text("thumbnail_url", self.thumbnail_url)
            .set_opt_text("registration_url", self.registration_url)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for Event {
    const TABLE: &'static str = "events";
    const LABEL: &'static str = "Event";
    const ORDER_BY: &'static str = "\"start_date\" DESC, \"display_order\" ASC, \"id\" ASC";
    const CHILDREN: &'static [(&'static str, &'static str)] = &[("event_media", "event_id")];
    type Create = CreateEvent;
    type Update = UpdateEvent;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventMedia {
    pub id: Uuid,
    pub event_id: Uuid,
    pub media_type: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventMedia {
    pub event_id: Uuid,
    pub media_type: String,
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventMedia {
    pub event_id: Option<Uuid>,
    pub media_type: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateEventMedia {
    fn check(&self, errors: &mut FieldErrors) {
        validate::one_of(errors, "mediaType", Some(&self.media_type), MEDIA_TYPES);
        validate::required(errors, "url", &self.url, 2048);
        validate::url(errors, "url", Some(&self.url));
        validate::max_len(errors, "caption", self.caption.as_deref(), 500);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateEventMedia {
    fn check(&self, errors: &mut FieldErrors) {
        validate::one_of(errors, "mediaType", self.media_type.as_deref(), MEDIA_TYPES);
        validate::required_if_present(errors, "url", self.url.as_deref(), 2048);
        validate::url(errors, "url", self.url.as_deref());
        validate::max_len(errors, "caption", self.caption.as_deref(), 500);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateEventMedia {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("event_id", self.event_id)
            .set("media_type", self.media_type)
            .set("url", self.url)
            .set("caption", self.caption)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateEventMedia {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("event_id", self.event_id)
            .set_some("media_type", self.media_type)
            .set_some("url", self.url)
            .set_opt_text("caption", self.caption)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for EventMedia {
    const TABLE: &'static str = "event_media";
    const LABEL: &'static str = "Event media";
    const PARENT_KEY: Option<&'static str> = Some("event_id");
    type Create = CreateEventMedia;
    type Update = UpdateEventMedia;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_upcoming() {
        let input: CreateEvent =
            serde_json::from_str(r#"{"title":"Budget Forum","startDate":"2025-03-01T18:00:00Z"}"#).unwrap();
        assert_eq!(input.status, "upcoming");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_status_and_inverted_dates() {
        let input: CreateEvent = serde_json::from_str(
            r#"{"title":"Forum","startDate":"2025-03-02T00:00:00Z","endDate":"2025-03-01T00:00:00Z","status":"postponed"}"#,
        )
        .unwrap();
        match input.validate() {
            Err(crate::error::ApiError::ValidationError { field_errors: Some(fields), .. }) => {
                assert!(fields.contains_key("status"));
                assert!(fields.contains_key("endDate"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn media_type_is_checked() {
        let patch = UpdateEventMedia {
            media_type: Some("podcast".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}

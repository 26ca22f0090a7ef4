use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::validate::{self, Validate};
use crate::database::query_builder::Fields;
use crate::database::resource::{Changeset, Resource};
use crate::error::FieldErrors;

const TITLE_MAX: usize = 200;
const TEXT_MAX: usize = 10_000;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MissionStatement {
    pub id: Uuid,
    pub heading: String,
    pub body: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMissionStatement {
    pub heading: String,
    pub body: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMissionStatement {
    pub heading: Option<String>,
    pub body: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateMissionStatement {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "heading", &self.heading, TITLE_MAX);
        validate::required(errors, "body", &self.body, TEXT_MAX);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateMissionStatement {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "heading", self.heading.as_deref(), TITLE_MAX);
        validate::required_if_present(errors, "body", self.body.as_deref(), TEXT_MAX);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateMissionStatement {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("heading", self.heading)
            .set("body", self.body)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateMissionStatement {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("heading", self.heading)
            .set_some("body", self.body)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for MissionStatement {
    const TABLE: &'static str = "mission_statements";
    const LABEL: &'static str = "Mission statement";
    type Create = CreateMissionStatement;
    type Update = UpdateMissionStatement;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AboutSection {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAboutSection {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAboutSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateAboutSection {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateAboutSection {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateAboutSection {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", self.title)
            .set("description", self.description)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateAboutSection {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title)
            .set_opt_text("description", self.description)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for AboutSection {
    const TABLE: &'static str = "about_sections";
    const LABEL: &'static str = "About section";
    const CHILDREN: &'static [(&'static str, &'static str)] = &[("about_cards", "section_id")];
    type Create = CreateAboutSection;
    type Update = UpdateAboutSection;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AboutCard {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub link_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAboutCard {
    pub section_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAboutCard {
    pub section_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub link_url: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateAboutCard {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::max_len(errors, "icon", self.icon.as_deref(), 100);
        validate::url(errors, "linkUrl", self.link_url.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateAboutCard {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::max_len(errors, "icon", self.icon.as_deref(), 100);
        validate::url(errors, "linkUrl", self.link_url.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateAboutCard {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("section_id", self.section_id)
            .set("title", self.title)
            .set("description", self.description)
            .set("icon", self.icon)
            .set("link_url", self.link_url)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateAboutCard {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("section_id", self.section_id)
            .set_some("title", self.title)
            .set_opt_text("description", self.description)
            .set_opt_text("icon", self.icon)
            .set_opt_text("link_url", self.link_url)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for AboutCard {
    const TABLE: &'static str = "about_cards";
    const LABEL: &'static str = "About card";
    const PARENT_KEY: Option<&'static str> = Some("section_id");
    type Create = CreateAboutCard;
    type Update = UpdateAboutCard;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A section with its cards, as served by the about overview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWithCards {
    #[serde(flatten)]
    pub section: AboutSection,
    pub cards: Vec<AboutCard>,
}

/// Group cards under their sections, keeping both orderings
pub fn nest_cards(sections: Vec<AboutSection>, cards: Vec<AboutCard>) -> Vec<SectionWithCards> {
    let mut nested: Vec<SectionWithCards> = sections
        .into_iter()
        .map(|section| SectionWithCards { section, cards: Vec::new() })
        .collect();

    for card in cards {
        if let Some(entry) = nested.iter_mut().find(|s| s.section.id == card.section_id) {
            entry.cards.push(card);
        }
    }
    nested
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub email: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMember {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMember {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub email: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateTeamMember {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "name", &self.name, 120);
        validate::required(errors, "role", &self.role, 120);
        validate::max_len(errors, "bio", self.bio.as_deref(), TEXT_MAX);
        validate::url(errors, "photoUrl", self.photo_url.as_deref());
        validate::url(errors, "linkedinUrl", self.linkedin_url.as_deref());
        validate::email(errors, "email", self.email.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateTeamMember {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "name", self.name.as_deref(), 120);
        validate::required_if_present(errors, "role", self.role.as_deref(), 120);
        validate::max_len(errors, "bio", self.bio.as_deref(), TEXT_MAX);
        validate::url(errors, "photoUrl", self.photo_url.as_deref());
        validate::url(errors, "linkedinUrl", self.linkedin_url.as_deref());
        validate::email(errors, "email", self.email.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateTeamMember {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("name", self.name)
            .set("role", self.role)
            .set("bio", self.bio)
            .set("photo_url", self.photo_url)
            .set("linkedin_url", self.linkedin_url)
            .set("email", self.email)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateTeamMember {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("name", self.name)
            .set_some("role", self.role)
            .set_opt_text("bio", self.bio)
            .set_opt_text("photo_url", self.photo_url)
            .set_opt_text("linkedin_url", self.linkedin_url)
            .set_opt_text("email", self.email)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for TeamMember {
    const TABLE: &'static str = "team_members";
    const LABEL: &'static str = "Team member";
    type Create = CreateTeamMember;
    type Update = UpdateTeamMember;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartner {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartner {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreatePartner {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "name", &self.name, TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::url(errors, "logoUrl", self.logo_url.as_deref());
        validate::url(errors, "websiteUrl", self.website_url.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdatePartner {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "name", self.name.as_deref(), TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::url(errors, "logoUrl", self.logo_url.as_deref());
        validate::url(errors, "websiteUrl", self.website_url.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreatePartner {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("name", self.name)
            .set("description", self.description)
            .set("logo_url", self.logo_url)
            .set("website_url", self.website_url)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdatePartner {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("name", self.name)
            .set_opt_text("description", self.description)
            .set_opt_text("logo_url", self.logo_url)
            .set_opt_text("website_url", self.website_url)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for Partner {
    const TABLE: &'static str = "partners";
    const LABEL: &'static str = "Partner";
    type Create = CreatePartner;
    type Update = UpdatePartner;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollaborationCard {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollaborationCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for CreateCollaborationCard {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required(errors, "title", &self.title, TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::max_len(errors, "ctaLabel", self.cta_label.as_deref(), 80);
        validate::url(errors, "ctaUrl", self.cta_url.as_deref());
        validate::non_negative(errors, "displayOrder", Some(self.display_order));
    }
}

impl Validate for UpdateCollaborationCard {
    fn check(&self, errors: &mut FieldErrors) {
        validate::required_if_present(errors, "title", self.title.as_deref(), TITLE_MAX);
        validate::max_len(errors, "description", self.description.as_deref(), TEXT_MAX);
        validate::max_len(errors, "ctaLabel", self.cta_label.as_deref(), 80);
        validate::url(errors, "ctaUrl", self.cta_url.as_deref());
        validate::non_negative(errors, "displayOrder", self.display_order);
    }
}

impl Changeset for CreateCollaborationCard {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", self.title)
            .set("description", self.description)
            .set("icon", self.icon)
            .set("cta_label", self.cta_label)
            .set("cta_url", self.cta_url)
            .set("display_order", self.display_order);
        fields
    }
}

impl Changeset for UpdateCollaborationCard {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields
            .set_some("title", self.title)
            .set_opt_text("description", self.description)
            .set_opt_text("icon", self.icon)
            .set_opt_text("cta_label", self.cta_label)
            .set_opt_text("cta_url", self.cta_url)
            .set_some("display_order", self.display_order);
        fields
    }
}

impl Resource for CollaborationCard {
    const TABLE: &'static str = "collaboration_cards";
    const LABEL: &'static str = "Collaboration card";
    type Create = CreateCollaborationCard;
    type Update = UpdateCollaborationCard;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::FieldValue;

    fn section(id: u128, title: &str) -> AboutSection {
        AboutSection {
            id: Uuid::from_u128(id),
            title: title.to_string(),
            description: None,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn card(id: u128, section_id: u128) -> AboutCard {
        AboutCard {
            id: Uuid::from_u128(id),
            section_id: Uuid::from_u128(section_id),
            title: format!("card {}", id),
            description: None,
            icon: None,
            link_url: None,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overview_nests_cards_in_order() {
        let nested = nest_cards(
            vec![section(1, "Who we are"), section(2, "What we do")],
            vec![card(10, 2), card(11, 1), card(12, 2), card(13, 99)],
        );
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].cards.len(), 1);
        let ids: Vec<Uuid> = nested[1].cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(10), Uuid::from_u128(12)]);
    }

    #[test]
    fn create_defaults_display_order_to_zero() {
        let input: CreateAboutSection = serde_json::from_str(r#"{"title":"Who we are"}"#).unwrap();
        assert_eq!(input.display_order, 0);
        let fields = input.into_fields();
        assert_eq!(fields.get("display_order"), Some(&FieldValue::Int(0)));
        assert_eq!(fields.get("description"), Some(&FieldValue::OptText(None)));
    }

    #[test]
    fn partial_update_only_lists_supplied_fields() {
        let patch: UpdateTeamMember = serde_json::from_str(r#"{"role":"Director"}"#).unwrap();
        assert!(patch.validate().is_ok());
        assert_eq!(patch.into_fields().columns(), vec!["role"]);
    }

    #[test]
    fn card_validation_rejects_bad_link() {
        let input: CreateAboutCard = serde_json::from_str(&format!(
            r#"{{"sectionId":"{}","title":"Research","linkUrl":"javascript:alert(1)"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert!(input.validate().is_err());
    }
}

pub mod about;
pub mod contact;
pub mod events;
pub mod membership;
pub mod policy;
pub mod publication;
pub mod user;

pub use about::{AboutCard, AboutSection, CollaborationCard, MissionStatement, Partner, SectionWithCards, TeamMember};
pub use contact::{ContactStatusUpdate, ContactSubmission, CreateContactSubmission};
pub use events::{Event, EventMedia};
pub use membership::{Faq, Membership, MembershipType};
pub use policy::{AdvocacyCampaign, CampaignRow, CaseStudy, Policy};
pub use publication::{Publication, PublicationDetail, Term};
pub use user::{AdminUserView, UpdateProfile, User};

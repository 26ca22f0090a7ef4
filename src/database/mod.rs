pub mod manager;
pub mod migrations;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod resource;

pub use manager::{DatabaseError, DatabaseManager};
pub use migrations::run_migrations;
pub use repository::{DeleteOutcome, Repository};
pub use resource::{Changeset, ListFilter, NewRecord, Resource, Visibility};

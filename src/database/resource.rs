use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use crate::api::validate::Validate;
use crate::database::query_builder::Fields;
use crate::error::FieldErrors;

/// Default presentation order shared by every content table
pub const DISPLAY_ORDER: &str = "\"display_order\" ASC, \"id\" ASC";

/// A content table served through the generic CRUD procedures.
///
/// Rows are read with `SELECT *`, so the implementing struct must match the
/// table's columns. Children are removed before the parent on delete, and a
/// row named in `REFERENCED_BY` blocks the delete entirely.
pub trait Resource: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;

    /// Human-readable name used in error messages and logs
    const LABEL: &'static str;

    const ORDER_BY: &'static str = DISPLAY_ORDER;

    /// Column linking a child row to its parent
    const PARENT_KEY: Option<&'static str> = None;

    /// SQL predicate a row must satisfy to be served by public procedures
    const PUBLIC_FILTER: Option<&'static str> = None;

    /// (table, foreign key column) pairs deleted together with the parent
    const CHILDREN: &'static [(&'static str, &'static str)] = &[];

    /// (table, foreign key column) pairs whose presence blocks deletion
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[];

    type Create: Changeset;
    type Update: Changeset;

    fn id(&self) -> Uuid;
}

/// A validated request payload that maps onto table columns
pub trait Changeset: DeserializeOwned + Validate + Send + 'static {
    fn into_fields(self) -> Fields;
}

/// Create payload with an optional caller-chosen id
#[derive(Debug, Deserialize)]
pub struct NewRecord<C> {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: C,
}

impl<C: Validate> Validate for NewRecord<C> {
    fn check(&self, errors: &mut FieldErrors) {
        self.fields.check(errors);
    }
}

/// Which rows a read procedure may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct ListFilter {
    pub parent_id: Option<Uuid>,
    pub visibility: Visibility,
}

impl ListFilter {
    pub fn public(parent_id: Option<Uuid>) -> Self {
        Self { parent_id, visibility: Visibility::Public }
    }

    pub fn all(parent_id: Option<Uuid>) -> Self {
        Self { parent_id, visibility: Visibility::All }
    }
}

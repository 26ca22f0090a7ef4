use sqlx::{self, postgres::PgRow, FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{self, quote_identifier, FieldValue, Fields};
use crate::database::resource::{Changeset, ListFilter, NewRecord, Resource, Visibility};

/// Result of a delete that may be refused by a referential pre-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
    /// A row in the named table still references the target
    InUse(&'static str),
}

impl DeleteOutcome {
    pub fn deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Generic CRUD over one `Resource` table
pub struct Repository<R> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<R>,
}

impl<R: Resource> Repository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn list(&self, filter: ListFilter) -> Result<Vec<R>, DatabaseError> {
        let parent = match (R::PARENT_KEY, filter.parent_id) {
            (Some(column), Some(parent_id)) => Some((column, parent_id)),
            _ => None,
        };
        let mut qb = query_builder::select_query(R::TABLE, parent, Self::predicate(filter.visibility), R::ORDER_BY);
        let rows = qb.build_query_as::<R>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find(&self, id: Uuid, visibility: Visibility) -> Result<Option<R>, DatabaseError> {
        let mut sql = format!("SELECT * FROM {} WHERE \"id\" = $1", quote_identifier(R::TABLE));
        if let Some(predicate) = Self::predicate(visibility) {
            sql.push_str(&format!(" AND ({})", predicate));
        }
        let row = sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn get(&self, id: Uuid, visibility: Visibility) -> Result<R, DatabaseError> {
        self.find(id, visibility)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", R::LABEL, id)))
    }

    pub async fn create(&self, input: NewRecord<R::Create>) -> Result<R, DatabaseError> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        insert_row(&self.pool, R::TABLE, id, input.fields.into_fields()).await
    }

    pub async fn update(&self, id: Uuid, patch: R::Update) -> Result<R, DatabaseError> {
        update_row(&self.pool, R::TABLE, id, patch.into_fields())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", R::LABEL, id)))
    }

    /// Delete the row and its children in one transaction
    pub async fn delete(&self, id: Uuid) -> Result<DeleteOutcome, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        for (table, column) in R::REFERENCED_BY {
            let sql = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)",
                quote_identifier(table),
                quote_identifier(column)
            );
            let referenced: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *tx).await?;
            if referenced {
                tx.rollback().await?;
                return Ok(DeleteOutcome::InUse(*table));
            }
        }

        for (table, column) in R::CHILDREN {
            let sql = format!("DELETE FROM {} WHERE {} = $1", quote_identifier(table), quote_identifier(column));
            let removed = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
            tracing::debug!(table = *table, parent = %id, rows = removed.rows_affected(), "removed child rows");
        }

        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", quote_identifier(R::TABLE));
        let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            Ok(DeleteOutcome::Missing)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }

    fn predicate(visibility: Visibility) -> Option<&'static str> {
        match visibility {
            Visibility::Public => R::PUBLIC_FILTER,
            Visibility::All => None,
        }
    }
}

/// Insert a row with server timestamps, usable inside a transaction
pub async fn insert_row<'e, T, E>(executor: E, table: &str, id: Uuid, fields: Fields) -> Result<T, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    let mut qb = query_builder::insert_query(table, FieldValue::Uuid(id), fields);
    let row = qb.build_query_as::<T>().fetch_one(executor).await?;
    Ok(row)
}

/// Update the supplied columns; `None` when no row has this id
pub async fn update_row<'e, T, E>(
    executor: E,
    table: &str,
    id: impl Into<FieldValue>,
    fields: Fields,
) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    let mut qb = query_builder::update_query(table, id.into(), fields);
    let row = qb.build_query_as::<T>().fetch_optional(executor).await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_outcome_flags() {
        assert!(DeleteOutcome::Deleted.deleted());
        assert!(!DeleteOutcome::Missing.deleted());
        assert!(!DeleteOutcome::InUse("memberships").deleted());
    }
}

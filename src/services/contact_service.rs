use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::contact::{ContactSubmission, CreateContactSubmission};
use crate::database::query_builder::Fields;
use crate::database::repository::{insert_row, update_row};
use crate::services::ServiceError;

const TABLE: &str = "contact_submissions";

pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, input: CreateContactSubmission) -> Result<ContactSubmission, ServiceError> {
        let row: ContactSubmission = insert_row(&self.pool, TABLE, Uuid::new_v4(), input.into_fields()).await?;
        tracing::info!(id = %row.id, inquiry_type = %row.inquiry_type, "Contact submission received");
        Ok(row)
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<ContactSubmission>, ServiceError> {
        let rows = sqlx::query_as::<_, ContactSubmission>(
            "SELECT * FROM contact_submissions ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Any status may follow any other
    pub async fn set_status(&self, id: Uuid, status: String) -> Result<ContactSubmission, ServiceError> {
        let mut fields = Fields::new();
        fields.set("status", status);
        let row: Option<ContactSubmission> = update_row(&self.pool, TABLE, id, fields).await?;
        let row = row.ok_or_else(|| ServiceError::NotFound(format!("Contact submission {} not found", id)))?;

        tracing::info!(id = %id, status = %row.status, "Contact submission status changed");
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

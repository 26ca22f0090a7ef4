use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::policy::{encode_achievements, AdvocacyCampaign, CampaignRow, CreateCampaign, UpdateCampaign};
use crate::database::repository::{insert_row, update_row};
use crate::database::resource::{ListFilter, NewRecord, Resource, Visibility};
use crate::database::Repository;
use crate::services::ServiceError;

/// Advocacy campaigns: scalar columns plus a serialized achievements list
pub struct CampaignService {
    pool: PgPool,
}

impl CampaignService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository(&self) -> Repository<CampaignRow> {
        Repository::new(self.pool.clone())
    }

    pub async fn list(&self) -> Result<Vec<AdvocacyCampaign>, ServiceError> {
        let rows = self.repository().list(ListFilter::all(None)).await?;
        Ok(rows.into_iter().map(AdvocacyCampaign::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<AdvocacyCampaign, ServiceError> {
        let row = self.repository().get(id, Visibility::All).await?;
        Ok(row.into())
    }

    pub async fn create(&self, input: NewRecord<CreateCampaign>) -> Result<AdvocacyCampaign, ServiceError> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        let mut fields = input.fields.scalar_fields();
        fields.set("achievements", encode_achievements(&input.fields.achievements)?);

        let mut tx = self.pool.begin().await?;
        let row: CampaignRow = insert_row(&mut *tx, CampaignRow::TABLE, id, fields).await?;
        tx.commit().await?;

        tracing::info!(resource = CampaignRow::TABLE, id = %row.id, "Created campaign");
        Ok(row.into())
    }

    /// Supplied scalars and, when present, the full achievements list are
    /// replaced together.
    pub async fn update(&self, id: Uuid, patch: UpdateCampaign) -> Result<AdvocacyCampaign, ServiceError> {
        let mut fields = patch.scalar_fields();
        if let Some(achievements) = &patch.achievements {
            fields.set("achievements", encode_achievements(achievements)?);
        }

        let mut tx = self.pool.begin().await?;
        let row: Option<CampaignRow> = update_row(&mut *tx, CampaignRow::TABLE, id, fields).await?;
        let row = match row {
            Some(row) => row,
            None => {
                tx.rollback().await?;
                return Err(ServiceError::NotFound(format!("{} {} not found", CampaignRow::LABEL, id)));
            }
        };
        tx.commit().await?;

        tracing::info!(resource = CampaignRow::TABLE, id = %id, "Updated campaign");
        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let outcome = self.repository().delete(id).await?;
        Ok(outcome.deleted())
    }
}

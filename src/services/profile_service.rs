use sqlx::PgPool;

use crate::auth::AdminSet;
use crate::database::models::membership::Membership;
use crate::database::models::user::{AdminUserView, UpdateProfile, User};
use crate::database::repository::update_row;
use crate::middleware::Identity;
use crate::services::ServiceError;

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The caller's profile; the row is created from token claims on first access
    pub async fn get_or_provision(&self, identity: &Identity) -> Result<User, ServiceError> {
        let inserted = sqlx::query(
            "INSERT INTO users (id, email, name, created_at, updated_at) VALUES ($1, $2, $3, now(), now()) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&identity.user_id)
        .bind(&identity.email)
        .bind(&identity.name)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(user_id = %identity.user_id, "Provisioned user profile");
        }

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(&identity.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update(&self, identity: &Identity, patch: UpdateProfile) -> Result<User, ServiceError> {
        // Make sure there is a row to update
        self.get_or_provision(identity).await?;

        let user: Option<User> = update_row(&self.pool, "users", identity.user_id.clone(), patch.into_fields()).await?;
        user.ok_or_else(|| ServiceError::NotFound(format!("User {} not found", identity.user_id)))
    }

    pub async fn memberships(&self, user_id: &str) -> Result<Vec<Membership>, ServiceError> {
        let rows = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every known user, flagged with admin membership
    pub async fn list_users(&self, admins: &AdminSet) -> Result<Vec<AdminUserView>, ServiceError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users
            .into_iter()
            .map(|user| AdminUserView {
                is_admin: admins.contains(&user.id),
                user,
            })
            .collect())
    }
}

//! User repository.
//!
//! Users mirror the upstream identity provider; the identity middleware
//! upserts the actor row on each authenticated request so owner roles can
//! be resolved locally.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use thiserror::Error;
use uuid::Uuid;

use portledger_core::access::Role;

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Error types for user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// User not found.
    #[error("User {0} not found")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for UserError {
    fn from(e: DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no such user exists.
    pub async fn find(&self, id: Uuid) -> Result<users::Model, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Inserts or refreshes a user row from the identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert_from_identity(
        &self,
        id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<users::Model, UserError> {
        let now = chrono::Utc::now().into();
        let active = users::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            role: Set(UserRole::from_core(role)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = users::Entity::insert(active)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([
                        users::Column::Username,
                        users::Column::Role,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Ok(model)
    }
}

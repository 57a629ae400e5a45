use async_trait::async_trait;
use prep_core::model::{UserId, UserProgress};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ProgressRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let document = serde_json::to_string(progress).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO user_progress (user_id, updated_at, document)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id) DO UPDATE SET
                    updated_at = excluded.updated_at,
                    document = excluded.document
            ",
        )
        .bind(progress.user_id.to_string())
        .bind(progress.updated_at)
        .bind(document)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_progress(&self, user_id: UserId) -> Result<Option<UserProgress>, StorageError> {
        let row = sqlx::query("SELECT document FROM user_progress WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        row.map(|row| {
            let document: String = row.try_get("document").map_err(ser)?;
            serde_json::from_str(&document).map_err(ser)
        })
        .transpose()
    }
}

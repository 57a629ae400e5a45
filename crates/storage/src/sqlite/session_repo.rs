use async_trait::async_trait;
use prep_core::model::{InterviewSession, SessionId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{SessionRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn decode_session(row: &sqlx::sqlite::SqliteRow) -> Result<InterviewSession, StorageError> {
    let document: String = row.try_get("document").map_err(ser)?;
    serde_json::from_str(&document).map_err(ser)
}

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn upsert_session(&self, session: &InterviewSession) -> Result<(), StorageError> {
        let document = serde_json::to_string(session).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO sessions (session_id, user_id, status, created_at, document)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(session_id) DO UPDATE SET
                    user_id = excluded.user_id,
                    status = excluded.status,
                    created_at = excluded.created_at,
                    document = excluded.document
            ",
        )
        .bind(session.session_id().to_string())
        .bind(session.user_id().map(|u| u.to_string()))
        .bind(session.status().to_string())
        .bind(session.created_at())
        .bind(document)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError> {
        let row = sqlx::query("SELECT document FROM sessions WHERE session_id = ?1")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        row.as_ref().map(decode_session).transpose()
    }

    async fn list_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT document FROM sessions
                WHERE user_id = ?1
                ORDER BY created_at ASC, session_id ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(decode_session(&row)?);
        }
        Ok(out)
    }
}

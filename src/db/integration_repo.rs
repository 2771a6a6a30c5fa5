// src/db/integration_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::integration::{Integration, IntegrationPayload},
};

const INTEGRATION_COLUMNS: &str = "id, name, provider, base_url, api_key, api_secret, \
    username, password, is_active, notes, created_at";

#[derive(Clone, Default)]
pub struct IntegrationRepository;

impl IntegrationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Integration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INTEGRATION_COLUMNS} FROM integrations ORDER BY created_at DESC");
        let items = sqlx::query_as::<_, Integration>(&sql).fetch_all(executor).await?;
        Ok(items)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Integration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = $1");
        let item = sqlx::query_as::<_, Integration>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &IntegrationPayload) -> Result<Integration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO integrations
                (name, provider, base_url, api_key, api_secret, username, password, is_active, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INTEGRATION_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, Integration>(&sql)
            .bind(&payload.name)
            .bind(&payload.provider)
            .bind(&payload.base_url)
            .bind(&payload.api_key)
            .bind(&payload.api_secret)
            .bind(&payload.username)
            .bind(&payload.password)
            .bind(payload.is_active)
            .bind(&payload.notes)
            .fetch_one(executor)
            .await?;
        Ok(item)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &IntegrationPayload,
    ) -> Result<Option<Integration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE integrations SET
                name = $2, provider = $3, base_url = $4, api_key = $5, api_secret = $6,
                username = $7, password = $8, is_active = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INTEGRATION_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, Integration>(&sql)
            .bind(id)
            .bind(&payload.name)
            .bind(&payload.provider)
            .bind(&payload.base_url)
            .bind(&payload.api_key)
            .bind(&payload.api_secret)
            .bind(&payload.username)
            .bind(&payload.password)
            .bind(payload.is_active)
            .bind(&payload.notes)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    // Inverte is_active numa única instrução
    pub async fn toggle<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Integration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE integrations SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 RETURNING {INTEGRATION_COLUMNS}"
        );
        let item = sqlx::query_as::<_, Integration>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM integrations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// src/db/power_plant_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::power_plant::{PowerPlant, PowerPlantPayload},
};

// Projeção comum: a usina com o nome do cliente vinculado (ou "-")
const PLANT_PROJECTION: &str = "p.id, p.name, p.status, p.client_id, \
    COALESCE(NULLIF(c.name, ''), '-') AS client_name, \
    p.platform, p.external_id, p.city, p.state, p.notes, p.created_at";

#[derive(Clone, Default)]
pub struct PowerPlantRepository;

impl PowerPlantRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<PowerPlant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PLANT_PROJECTION} FROM power_plants p \
             LEFT JOIN clients c ON c.id = p.client_id \
             ORDER BY p.created_at DESC"
        );
        let plants = sqlx::query_as::<_, PowerPlant>(&sql).fetch_all(executor).await?;
        Ok(plants)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PowerPlant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PLANT_PROJECTION} FROM power_plants p \
             LEFT JOIN clients c ON c.id = p.client_id \
             WHERE p.id = $1"
        );
        let plant = sqlx::query_as::<_, PowerPlant>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(plant)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &PowerPlantPayload) -> Result<PowerPlant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH saved AS (
                INSERT INTO power_plants (name, status, client_id, platform, external_id, city, state, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {PLANT_PROJECTION} FROM saved p
            LEFT JOIN clients c ON c.id = p.client_id
            "#
        );
        let plant = sqlx::query_as::<_, PowerPlant>(&sql)
            .bind(&payload.name)
            .bind(payload.status)
            .bind(payload.client_id)
            .bind(&payload.platform)
            .bind(&payload.external_id)
            .bind(&payload.city)
            .bind(&payload.state)
            .bind(&payload.notes)
            .fetch_one(executor)
            .await
            .map_err(map_client_fk)?;
        Ok(plant)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &PowerPlantPayload,
    ) -> Result<Option<PowerPlant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH saved AS (
                UPDATE power_plants SET
                    name = $2, status = $3, client_id = $4, platform = $5,
                    external_id = $6, city = $7, state = $8, notes = $9,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {PLANT_PROJECTION} FROM saved p
            LEFT JOIN clients c ON c.id = p.client_id
            "#
        );
        let plant = sqlx::query_as::<_, PowerPlant>(&sql)
            .bind(id)
            .bind(&payload.name)
            .bind(payload.status)
            .bind(payload.client_id)
            .bind(&payload.platform)
            .bind(&payload.external_id)
            .bind(&payload.city)
            .bind(&payload.state)
            .bind(&payload.notes)
            .fetch_optional(executor)
            .await
            .map_err(map_client_fk)?;
        Ok(plant)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM power_plants WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Vínculo com um cliente que não existe
fn map_client_fk(e: sqlx::Error) -> AppError {
    map_constraint_error(e, None, Some(AppError::ClientNotFound))
}

// src/services/power_plant_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::PowerPlantRepository,
    models::power_plant::{PowerPlant, PowerPlantPayload},
};

#[derive(Clone)]
pub struct PowerPlantService {
    pool: PgPool,
    repo: PowerPlantRepository,
}

impl PowerPlantService {
    pub fn new(pool: PgPool, repo: PowerPlantRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list(&self) -> Result<Vec<PowerPlant>, AppError> {
        self.repo.list(&self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<PowerPlant, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::PowerPlantNotFound)
    }

    pub async fn create(&self, payload: PowerPlantPayload) -> Result<PowerPlant, AppError> {
        payload.validate()?;
        let plant = self.repo.create(&self.pool, &payload).await?;
        tracing::info!("☀️ Usina criada: {}", plant.name);
        Ok(plant)
    }

    pub async fn update(&self, id: Uuid, payload: PowerPlantPayload) -> Result<PowerPlant, AppError> {
        payload.validate()?;
        self.repo
            .update(&self.pool, id, &payload)
            .await?
            .ok_or(AppError::PowerPlantNotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::PowerPlantNotFound);
        }
        Ok(())
    }
}

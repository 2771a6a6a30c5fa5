// src/services/integration_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::IntegrationRepository,
    models::integration::{Integration, IntegrationPayload},
};

#[derive(Clone)]
pub struct IntegrationService {
    pool: PgPool,
    repo: IntegrationRepository,
}

impl IntegrationService {
    pub fn new(pool: PgPool, repo: IntegrationRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list(&self) -> Result<Vec<Integration>, AppError> {
        self.repo.list(&self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Integration, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::IntegrationNotFound)
    }

    pub async fn create(&self, payload: IntegrationPayload) -> Result<Integration, AppError> {
        payload.validate()?;
        let integration = self.repo.create(&self.pool, &payload).await?;
        tracing::info!("🔌 Integração criada: {} ({})", integration.name, integration.provider);
        Ok(integration)
    }

    pub async fn update(&self, id: Uuid, payload: IntegrationPayload) -> Result<Integration, AppError> {
        payload.validate()?;
        self.repo
            .update(&self.pool, id, &payload)
            .await?
            .ok_or(AppError::IntegrationNotFound)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Integration, AppError> {
        let integration = self
            .repo
            .toggle(&self.pool, id)
            .await?
            .ok_or(AppError::IntegrationNotFound)?;
        tracing::info!(
            "🔌 Integração {} agora está {}",
            integration.name,
            if integration.is_active { "ativa" } else { "inativa" }
        );
        Ok(integration)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::IntegrationNotFound);
        }
        Ok(())
    }
}

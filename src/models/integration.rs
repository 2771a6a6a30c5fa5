// src/models/integration.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Credenciais de uma plataforma externa (ex: Solarman)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: Uuid,

    #[schema(example = "Solarman - conta principal")]
    pub name: String,

    #[schema(example = "solarman")]
    pub provider: String,

    #[schema(example = "https://api.solarmanpv.com")]
    pub base_url: String,

    pub api_key: String,
    pub api_secret: String,
    pub username: String,
    pub password: String,

    pub is_active: bool,
    pub notes: String,

    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    pub provider: String,

    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub notes: String,
}

// src/models/power_plant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

// O que sai do banco (tabela power_plants), já com o nome do cliente vinculado
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PowerPlant {
    pub id: Uuid,

    #[schema(example = "Usina Fazenda Boa Vista")]
    pub name: String,

    pub status: PlantStatus,

    pub client_id: Option<Uuid>,

    // "-" quando não há vínculo
    #[schema(example = "Ana Souza")]
    pub client_name: String,

    #[schema(example = "Solarman")]
    pub platform: String,

    pub external_id: String,
    pub city: String,
    pub state: String,
    pub notes: String,

    pub created_at: DateTime<Utc>,
}

// Payload de criação/edição. Campos ausentes ficam vazios.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerPlantPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Usina Fazenda Boa Vista")]
    pub name: String,

    pub status: PlantStatus,

    pub client_id: Option<Uuid>,

    #[schema(example = "Solarman")]
    pub platform: String,
    pub external_id: String,
    pub city: String,
    pub state: String,
    pub notes: String,
}

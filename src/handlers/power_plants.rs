// src/handlers/power_plants.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, StaffOrAdmin},
    models::power_plant::{PowerPlant, PowerPlantPayload},
};

#[utoipa::path(
    get,
    path = "/api/power-plants",
    tag = "Power Plants",
    responses((status = 200, description = "Usinas (mais recentes primeiro)", body = [PowerPlant])),
    security(("api_jwt" = []))
)]
pub async fn list_power_plants(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
) -> Result<Json<Vec<PowerPlant>>, AppError> {
    Ok(Json(app_state.power_plant_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/power-plants",
    tag = "Power Plants",
    request_body = PowerPlantPayload,
    responses(
        (status = 201, description = "Usina criada", body = PowerPlant),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente vinculado não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_power_plant(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Json(payload): Json<PowerPlantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let plant = app_state.power_plant_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(plant)))
}

#[utoipa::path(
    get,
    path = "/api/power-plants/{id}",
    tag = "Power Plants",
    params(("id" = Uuid, Path, description = "ID da usina")),
    responses(
        (status = 200, description = "Usina", body = PowerPlant),
        (status = 404, description = "Usina não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_power_plant(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<PowerPlant>, AppError> {
    Ok(Json(app_state.power_plant_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/power-plants/{id}",
    tag = "Power Plants",
    params(("id" = Uuid, Path, description = "ID da usina")),
    request_body = PowerPlantPayload,
    responses(
        (status = 200, description = "Usina atualizada", body = PowerPlant),
        (status = 404, description = "Usina não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_power_plant(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PowerPlantPayload>,
) -> Result<Json<PowerPlant>, AppError> {
    Ok(Json(app_state.power_plant_service.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/power-plants/{id}",
    tag = "Power Plants",
    params(("id" = Uuid, Path, description = "ID da usina")),
    responses(
        (status = 204, description = "Usina excluída"),
        (status = 404, description = "Usina não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_power_plant(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.power_plant_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/integrations.rs

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
    models::integration::{Integration, IntegrationPayload},
};

#[utoipa::path(
    get,
    path = "/api/integrations",
    tag = "Integrations",
    responses((status = 200, description = "Integrações cadastradas", body = [Integration])),
    security(("api_jwt" = []))
)]
pub async fn list_integrations(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
) -> Result<Json<Vec<Integration>>, AppError> {
    Ok(Json(app_state.integration_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/integrations",
    tag = "Integrations",
    request_body = IntegrationPayload,
    responses(
        (status = 201, description = "Integração criada", body = Integration),
        (status = 400, description = "Nome e provedor são obrigatórios")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_integration(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Json(payload): Json<IntegrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let integration = app_state.integration_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(integration)))
}

#[utoipa::path(
    get,
    path = "/api/integrations/{id}",
    tag = "Integrations",
    params(("id" = Uuid, Path, description = "ID da integração")),
    responses(
        (status = 200, description = "Integração", body = Integration),
        (status = 404, description = "Integração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_integration(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<Integration>, AppError> {
    Ok(Json(app_state.integration_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/integrations/{id}",
    tag = "Integrations",
    params(("id" = Uuid, Path, description = "ID da integração")),
    request_body = IntegrationPayload,
    responses(
        (status = 200, description = "Integração atualizada", body = Integration),
        (status = 404, description = "Integração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_integration(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IntegrationPayload>,
) -> Result<Json<Integration>, AppError> {
    Ok(Json(app_state.integration_service.update(id, payload).await?))
}

// Liga/desliga a integração
#[utoipa::path(
    post,
    path = "/api/integrations/{id}/toggle",
    tag = "Integrations",
    params(("id" = Uuid, Path, description = "ID da integração")),
    responses(
        (status = 200, description = "Estado invertido", body = Integration),
        (status = 404, description = "Integração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_integration(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<Integration>, AppError> {
    Ok(Json(app_state.integration_service.toggle(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/integrations/{id}",
    tag = "Integrations",
    params(("id" = Uuid, Path, description = "ID da integração")),
    responses(
        (status = 204, description = "Integração excluída"),
        (status = 404, description = "Integração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_integration(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.integration_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

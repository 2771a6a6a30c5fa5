// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, StaffOrAdmin},
    models::client::ClientDraft,
    services::{
        client_filter::ClientFilter,
        client_service::{ClientListResponse, ClientPreview, ClientService, PreviewRequest},
    },
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientFilter),
    responses(
        (status = 200, description = "Clientes filtrados (mais recentes primeiro) e contadores", body = ClientListResponse),
        (status = 403, description = "Perfil sem acesso")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<ClientListResponse>, AppError> {
    let response = app_state.client_service.list(&filter).await?;
    Ok(Json(response))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientDraft,
    responses(
        (status = 201, description = "Cliente criado", body = ClientDraft),
        (status = 400, description = "Payload inválido"),
        (status = 422, description = "Pagamentos não fecham 100%")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    access: RequireRole<StaffOrAdmin>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let draft = ClientDraft::hydrate(body)?;
    let saved = app_state
        .client_service
        .save(draft, None, access.session().user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = ClientDraft),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDraft>, AppError> {
    let client = app_state.client_service.load(id).await?;
    Ok(Json(client))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientDraft,
    responses(
        (status = 200, description = "Cliente atualizado", body = ClientDraft),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Pagamentos não fecham 100%")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<ClientDraft>, AppError> {
    let draft = ClientDraft::hydrate(body)?;
    let saved = app_state
        .client_service
        .save(draft, Some(id), access.session().user.id)
        .await?;

    Ok(Json(saved))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente excluído"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.client_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/clients/preview
#[utoipa::path(
    post,
    path = "/api/clients/preview",
    tag = "Clients",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Rascunho recalculado após as edições", body = ClientPreview),
        (status = 400, description = "Payload inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_client(
    _access: RequireRole<StaffOrAdmin>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<ClientPreview>, AppError> {
    Ok(Json(ClientService::preview(request)?))
}

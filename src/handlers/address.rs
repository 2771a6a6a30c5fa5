// src/handlers/address.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, StaffOrAdmin},
    models::address::AddressInfo,
    services::address_lookup::resolve_address,
};

// GET /api/address/{cep}
#[utoipa::path(
    get,
    path = "/api/address/{cep}",
    tag = "Address",
    params(("cep" = String, Path, description = "CEP com ou sem máscara")),
    responses(
        (status = 200, description = "Endereço encontrado", body = AddressInfo),
        (status = 400, description = "CEP não tem 8 dígitos"),
        (status = 404, description = "CEP inexistente"),
        (status = 502, description = "Serviço de CEP indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn lookup_address(
    State(app_state): State<AppState>,
    _access: RequireRole<StaffOrAdmin>,
    Path(cep): Path<String>,
) -> Result<Json<AddressInfo>, AppError> {
    let address = resolve_address(app_state.address_lookup.as_ref(), &cep).await?;
    Ok(Json(address))
}

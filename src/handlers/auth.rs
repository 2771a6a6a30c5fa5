// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::SessionContext,
        rbac::{AdminOnly, RequireRole},
    },
    models::auth::{AuthResponse, LoginUserPayload, MeResponse, RegisterUserPayload, UpdateRolePayload, User},
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado (sem perfil)", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .register_user(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(response))
}

// Sessão atual e a tela inicial do perfil
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão atual", body = MeResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(session: SessionContext) -> Json<MeResponse> {
    let home = session.home();
    Json(MeResponse {
        role: session.role,
        user: session.user,
        home,
    })
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Auth",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user_role(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<User>, AppError> {
    let user = app_state.auth_service.update_role(id, payload.role).await?;
    Ok(Json(user))
}

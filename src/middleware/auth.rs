// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Role, User},
};

/// Usuário autenticado e o perfil dele, resolvidos uma vez por requisição.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: User,
    pub role: Option<Role>,
}

impl SessionContext {
    pub fn new(user: User) -> Self {
        Self { role: user.role, user }
    }

    pub fn home(&self) -> &'static str {
        Role::home_route(self.role)
    }
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    // Insere a sessão nos "extensions" da requisição
    request.extensions_mut().insert(SessionContext::new(user));
    Ok(next.run(request).await)
}

// Extrator para obter a sessão diretamente nos handlers
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::SessionContext,
    models::auth::Role,
};

/// Define quais perfis passam por um portão.
pub trait RoleGate: Send + Sync + 'static {
    fn allowed() -> &'static [Role];

    fn allows(role: Option<Role>) -> bool {
        role.is_some_and(|r| Self::allowed().contains(&r))
    }
}

// Equipe interna: clientes, usinas, integrações e CEP
pub struct StaffOrAdmin;

impl RoleGate for StaffOrAdmin {
    fn allowed() -> &'static [Role] {
        &[Role::Admin, Role::Staff]
    }
}

pub struct AdminOnly;

impl RoleGate for AdminOnly {
    fn allowed() -> &'static [Role] {
        &[Role::Admin]
    }
}

/// Extrator que exige sessão válida com um perfil aceito por `T`.
pub struct RequireRole<T>(pub SessionContext, pub PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn session(&self) -> &SessionContext {
        &self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleGate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionContext::from_request_parts(parts, state).await?;

        if !T::allows(session.role) {
            tracing::warn!(
                "⛔ {} ({:?}) tentou acessar {}",
                session.user.email,
                session.role,
                parts.uri.path()
            );
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(session, PhantomData))
    }
}

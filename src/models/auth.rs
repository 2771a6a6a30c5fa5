// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Perfis de acesso. Um usuário recém-registrado fica sem perfil até um admin definir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Client,
    Technician,
}

impl Role {
    /// Tela inicial de cada perfil no frontend.
    pub fn home_route(role: Option<Role>) -> &'static str {
        match role {
            Some(Role::Admin) | Some(Role::Staff) => "/clients",
            Some(Role::Client) => "/portal",
            Some(Role::Technician) => "/campo",
            None => "/no-access",
        }
    }
}

// Representa um usuário (tabela `profiles`)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Option<Role>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "contato@empresa.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não conferem."))]
    pub password_confirmation: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "contato@empresa.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Option<Role>,
    #[schema(example = "/clients")]
    pub home: &'static str,
}

// Sessão atual: usuário, perfil e para onde o frontend deve ir
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub role: Option<Role>,
    #[schema(example = "/clients")]
    pub home: &'static str,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRolePayload {
    pub role: Option<Role>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // Subject (ID do usuário)
    pub role: Option<Role>, // Perfil no momento do login
    pub exp: usize,         // Expiration time
    pub iat: usize,         // Issued At
}

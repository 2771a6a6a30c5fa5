// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::auth::{Role, User},
};

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM profiles WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM profiles WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
        role: Option<Role>,
    ) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO profiles (email, password_hash, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(hashed_password)
            .bind(role)
            .fetch_one(&self.pool)
            .await
            // Violação de chave única vira um erro mais amigável
            .map_err(|e| map_constraint_error(e, Some(AppError::EmailAlreadyExists), None))
    }

    // Define (ou remove) o perfil de acesso de um usuário
    pub async fn update_role(&self, id: Uuid, role: Option<Role>) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AdminBootstrap,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, Role, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    // Novo usuário entra sem perfil; um admin define depois
    pub async fn register_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(password).await?;
        let new_user = self.user_repo.create_user(email, &hashed_password, None).await?;

        tracing::info!("👤 Novo usuário registrado: {}", new_user.email);
        self.auth_response(&new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.auth_response(&user)
    }

    /// Valida o token e recarrega o perfil. O perfil vale pelo banco, não pelo token.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn update_role(&self, user_id: Uuid, role: Option<Role>) -> Result<User, AppError> {
        let user = self
            .user_repo
            .update_role(user_id, role)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!("🔑 Perfil de {} alterado para {:?}", user.email, user.role);
        Ok(user)
    }

    // Garante que a conta configurada existe e é admin
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<(), AppError> {
        match self.user_repo.find_by_email(&admin.email).await? {
            Some(user) if user.role == Some(Role::Admin) => {}
            Some(user) => {
                self.user_repo.update_role(user.id, Some(Role::Admin)).await?;
                tracing::info!("✅ Usuário {} promovido a admin", admin.email);
            }
            None => {
                let hashed_password = hash_password(&admin.password).await?;
                self.user_repo
                    .create_user(&admin.email, &hashed_password, Some(Role::Admin))
                    .await?;
                tracing::info!("✅ Admin inicial criado: {}", admin.email);
            }
        }
        Ok(())
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponse, AppError> {
        let token = encode_token(&self.jwt_secret, user.id, user.role, Utc::now())?;
        Ok(AuthResponse {
            token,
            role: user.role,
            home: Role::home_route(user.role),
        })
    }
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub fn encode_token(
    secret: &str,
    user_id: Uuid,
    role: Option<Role>,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_carries_role() {
        let user_id = Uuid::new_v4();
        let token = encode_token("segredo", user_id, Some(Role::Staff), Utc::now()).unwrap();

        let claims = decode_token("segredo", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Some(Role::Staff));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token("segredo", Uuid::new_v4(), None, Utc::now()).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - chrono::Duration::days(30);
        let token = encode_token("segredo", Uuid::new_v4(), Some(Role::Admin), issued).unwrap();
        assert!(matches!(decode_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_token("segredo", "nao-e-um-jwt"), Err(AppError::InvalidToken)));
    }
}

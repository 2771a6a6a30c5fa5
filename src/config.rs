// src/config.rs

use crate::{
    db::{ClientRepository, IntegrationRepository, PowerPlantRepository, UserRepository},
    services::{
        address_lookup::{AddressLookup, ViaCepClient},
        auth::AuthService,
        client_service::ClientService,
        integration_service::IntegrationService,
        power_plant_service::PowerPlantService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_VIACEP_BASE_URL: &str = "https://viacep.com.br/ws";

// Conta de administrador criada na inicialização, se configurada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub viacep_base_url: String,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Lê `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Variável vazia conta como ausente
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_EMAIL e ADMIN_PASSWORD devem ser definidos juntos"),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            viacep_base_url: get("VIACEP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_VIACEP_BASE_URL.to_string()),
            admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub power_plant_service: PowerPlantService,
    pub integration_service: IntegrationService,
    pub address_lookup: Arc<dyn AddressLookup>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let client_service = ClientService::new(db_pool.clone(), ClientRepository::new());
        let power_plant_service = PowerPlantService::new(db_pool.clone(), PowerPlantRepository::new());
        let integration_service = IntegrationService::new(db_pool.clone(), IntegrationRepository::new());
        let address_lookup: Arc<dyn AddressLookup> =
            Arc::new(ViaCepClient::new(config.viacep_base_url.clone())?);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            client_service,
            power_plant_service,
            integration_service,
            address_lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults_for_optional_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/solar"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            Config {
                database_url: "postgres://localhost/solar".into(),
                jwt_secret: "segredo".into(),
                bind_addr: DEFAULT_BIND_ADDR.into(),
                db_max_connections: DEFAULT_MAX_CONNECTIONS,
                viacep_base_url: DEFAULT_VIACEP_BASE_URL.into(),
                admin: None,
            }
        );
    }

    #[test]
    fn required_keys_must_be_present() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "segredo")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/solar"),
            ("JWT_SECRET", "  "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/solar"),
            ("JWT_SECRET", "segredo"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("VIACEP_BASE_URL", "http://localhost:9000/ws/"),
            ("ADMIN_EMAIL", "admin@solar.com.br"),
            ("ADMIN_PASSWORD", "trocar123"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.viacep_base_url, "http://localhost:9000/ws");
        assert_eq!(
            config.admin,
            Some(AdminBootstrap { email: "admin@solar.com.br".into(), password: "trocar123".into() })
        );
    }

    #[test]
    fn rejects_bad_pool_size_and_half_admin() {
        let base = [("DATABASE_URL", "postgres://db/solar"), ("JWT_SECRET", "segredo")];

        let mut pairs = base.to_vec();
        pairs.push(("DB_MAX_CONNECTIONS", "muitas"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = base.to_vec();
        pairs.push(("ADMIN_EMAIL", "admin@solar.com.br"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}

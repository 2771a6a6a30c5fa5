//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(Config::from_env()?).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(admin) = &app_state.config.admin {
        app_state.auth_service.bootstrap_admin(admin).await?;
    }

    let config = app_state.config.clone();
    let app = router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Tudo aqui exige token; o perfil é conferido em cada handler
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/users/{id}/role", put(handlers::auth::update_user_role))
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route("/clients/preview", post(handlers::clients::preview_client))
        .route(
            "/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/power-plants",
            get(handlers::power_plants::list_power_plants)
                .post(handlers::power_plants::create_power_plant),
        )
        .route(
            "/power-plants/{id}",
            get(handlers::power_plants::get_power_plant)
                .put(handlers::power_plants::update_power_plant)
                .delete(handlers::power_plants::delete_power_plant),
        )
        .route(
            "/integrations",
            get(handlers::integrations::list_integrations)
                .post(handlers::integrations::create_integration),
        )
        .route(
            "/integrations/{id}",
            get(handlers::integrations::get_integration)
                .put(handlers::integrations::update_integration)
                .delete(handlers::integrations::delete_integration),
        )
        .route(
            "/integrations/{id}/toggle",
            post(handlers::integrations::toggle_integration),
        )
        .route("/address/{cep}", get(handlers::address::lookup_address))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::update_user_role,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::preview_client,

        // --- Power Plants ---
        handlers::power_plants::list_power_plants,
        handlers::power_plants::create_power_plant,
        handlers::power_plants::get_power_plant,
        handlers::power_plants::update_power_plant,
        handlers::power_plants::delete_power_plant,

        // --- Integrations ---
        handlers::integrations::list_integrations,
        handlers::integrations::create_integration,
        handlers::integrations::get_integration,
        handlers::integrations::update_integration,
        handlers::integrations::toggle_integration,
        handlers::integrations::delete_integration,

        // --- Address ---
        handlers::address::lookup_address,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::UpdateRolePayload,

            // --- Clients ---
            models::client::ClientDraft,
            models::client::ClientStatus,
            models::client::ClientType,
            models::client::LeadOrigin,
            models::client::ServiceCategory,
            models::client::PaymentMethod,
            models::client::Month,
            models::client::MonthlyConsumption,
            models::client::CostRow,
            models::client::PaymentRow,
            models::client::TextField,
            models::client::NumericText,
            services::client_editor::DraftEdit,
            services::client_filter::ClientKpis,
            services::client_service::ClientListItem,
            services::client_service::ClientListResponse,
            services::client_service::PreviewRequest,
            services::client_service::ClientPreview,
            services::derived_model::DerivedModel,
            services::derived_model::DisplayValues,

            // --- Power Plants / Integrations ---
            models::power_plant::PlantStatus,
            models::power_plant::PowerPlant,
            models::power_plant::PowerPlantPayload,
            models::integration::Integration,
            models::integration::IntegrationPayload,

            // --- Address ---
            models::address::AddressInfo,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, sessão e perfis"),
        (name = "Clients", description = "Cadastro de clientes e proposta financeira"),
        (name = "Power Plants", description = "Usinas monitoradas"),
        (name = "Integrations", description = "Credenciais de plataformas externas"),
        (name = "Address", description = "Consulta de endereço por CEP")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/clients/{id}"));
        assert!(doc.paths.paths.contains_key("/api/integrations/{id}/toggle"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(components.schemas.contains_key("ClientDraft"));
    }
}

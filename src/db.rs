pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod power_plant_repo;
pub use power_plant_repo::PowerPlantRepository;
pub mod integration_repo;
pub use integration_repo::IntegrationRepository;

pub mod address;
pub mod auth;
pub mod clients;
pub mod integrations;
pub mod power_plants;

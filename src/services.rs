pub mod address_lookup;
pub mod auth;
pub mod client_editor;
pub mod client_filter;
pub mod client_service;
pub mod derived_model;
pub mod integration_service;
pub mod power_plant_service;

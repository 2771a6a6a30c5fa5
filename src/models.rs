pub mod address;
pub mod auth;
pub mod client;
pub mod integration;
pub mod power_plant;

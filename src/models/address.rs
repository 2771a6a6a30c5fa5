// src/models/address.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Endereço resolvido a partir de um CEP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    #[schema(example = "01001000")]
    pub cep: String,
    #[schema(example = "Praça da Sé")]
    pub street: String,
    #[schema(example = "Sé")]
    pub neighborhood: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
}

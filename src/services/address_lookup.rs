// src/services/address_lookup.rs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::{common::error::AppError, models::address::AddressInfo};

/// Mantém só os dígitos. Qualquer coisa diferente de 8 dígitos é inválida.
pub fn normalize_cep(raw: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 8 {
        Ok(digits)
    } else {
        Err(AppError::InvalidCep)
    }
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Recebe um CEP já normalizado. `None` quando o CEP não existe.
    async fn lookup(&self, cep: &str) -> Result<Option<AddressInfo>, AppError>;
}

/// Normaliza, consulta e transforma "não encontrado" em erro.
pub async fn resolve_address(lookup: &dyn AddressLookup, raw_cep: &str) -> Result<AddressInfo, AppError> {
    let cep = normalize_cep(raw_cep)?;
    lookup.lookup(&cep).await?.ok_or(AppError::AddressNotFound)
}

// Resposta do ViaCEP. CEP inexistente vem como {"erro": true} (ou "true")
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViaCepResponse {
    erro: Option<Value>,
    logradouro: String,
    bairro: String,
    localidade: String,
    uf: String,
}

impl ViaCepResponse {
    fn into_address(self, cep: &str) -> Option<AddressInfo> {
        let not_found = match &self.erro {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        };
        if not_found {
            return None;
        }

        Some(AddressInfo {
            cep: cep.to_string(),
            street: self.logradouro,
            neighborhood: self.bairro,
            city: self.localidade,
            state: self.uf,
        })
    }
}

#[derive(Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { http, base_url: base_url.into() })
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn lookup(&self, cep: &str) -> Result<Option<AddressInfo>, AppError> {
        let url = format!("{}/{}/json/", self.base_url, cep);
        tracing::debug!("Consultando CEP em {}", url);

        let response: ViaCepResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.into_address(cep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("01001-000", "01001000")]
    #[case(" 01001000 ", "01001000")]
    #[case("01.001-000", "01001000")]
    fn normalizes_valid_ceps(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_cep(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("0100100")]
    #[case("010010000")]
    #[case("abcdefgh")]
    fn rejects_malformed_ceps(#[case] raw: &str) {
        assert!(matches!(normalize_cep(raw), Err(AppError::InvalidCep)));
    }

    #[test]
    fn maps_viacep_payload() {
        let response: ViaCepResponse = serde_json::from_value(json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        }))
        .unwrap();

        assert_eq!(
            response.into_address("01001000"),
            Some(AddressInfo {
                cep: "01001000".into(),
                street: "Praça da Sé".into(),
                neighborhood: "Sé".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            })
        );
    }

    #[rstest]
    #[case(json!({ "erro": true }))]
    #[case(json!({ "erro": "true" }))]
    fn viacep_error_flag_means_not_found(#[case] payload: Value) {
        let response: ViaCepResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.into_address("99999999"), None);
    }

    struct FakeLookup;

    #[async_trait]
    impl AddressLookup for FakeLookup {
        async fn lookup(&self, cep: &str) -> Result<Option<AddressInfo>, AppError> {
            Ok((cep == "50030230").then(|| AddressInfo {
                cep: cep.to_string(),
                street: "Rua do Bom Jesus".into(),
                neighborhood: "Recife".into(),
                city: "Recife".into(),
                state: "PE".into(),
            }))
        }
    }

    #[tokio::test]
    async fn resolve_normalizes_before_lookup() {
        let address = resolve_address(&FakeLookup, "50030-230").await.unwrap();
        assert_eq!(address.city, "Recife");
    }

    #[tokio::test]
    async fn resolve_reports_missing_and_invalid() {
        assert!(matches!(
            resolve_address(&FakeLookup, "00000-000").await,
            Err(AppError::AddressNotFound)
        ));
        assert!(matches!(
            resolve_address(&FakeLookup, "123").await,
            Err(AppError::InvalidCep)
        ));
    }
}

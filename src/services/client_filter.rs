// src/services/client_filter.rs

use serde::{
    de::{DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer, Serialize,
};
use utoipa::{IntoParams, ToSchema};

use crate::models::client::{ClientDraft, ClientStatus, ClientType, LeadOrigin};

// Filtros da listagem de clientes (query string)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilter {
    /// Busca por nome, e-mail, telefone, documento, origem, cidade ou estado
    pub q: Option<String>,
    #[serde(default, deserialize_with = "select_or_all")]
    pub status: Option<ClientStatus>,
    #[serde(rename = "type", default, deserialize_with = "select_or_all")]
    pub client_type: Option<ClientType>,
    #[serde(default, deserialize_with = "select_or_all")]
    pub origin: Option<LeadOrigin>,
}

// Os selects da listagem mandam "all" (ou vazio) quando não há filtro.
fn select_or_all<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => T::deserialize(s.trim().into_deserializer()).map(Some),
    }
}

impl ClientFilter {
    pub fn matches(&self, client: &ClientDraft) -> bool {
        let needle = self
            .q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();

        let origin_label = client.origin.map(|o| o.label()).unwrap_or("");
        let searchable = [
            client.name.as_str(),
            client.email.as_str(),
            client.contact_number.as_str(),
            client.document.as_str(),
            origin_label,
            client.city.as_str(),
            client.state.as_str(),
        ];

        let matches_q = needle.is_empty()
            || searchable
                .iter()
                .filter(|v| !v.is_empty())
                .any(|v| v.to_lowercase().contains(&needle));

        let matches_status = self.status.is_none_or(|s| s == client.status);
        let matches_type = self.client_type.is_none_or(|t| client.client_type == Some(t));
        let matches_origin = self.origin.is_none_or(|o| client.origin == Some(o));

        matches_q && matches_status && matches_type && matches_origin
    }

    pub fn apply<'a>(&self, clients: &'a [ClientDraft]) -> Vec<&'a ClientDraft> {
        clients.iter().filter(|c| self.matches(c)).collect()
    }
}

// Contadores exibidos acima da lista (sobre o resultado filtrado)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientKpis {
    pub total: usize,
    pub entradas: usize,
    pub fechados: usize,
    pub cancelados: usize,
}

impl ClientKpis {
    pub fn count<'a>(clients: impl IntoIterator<Item = &'a ClientDraft>) -> Self {
        clients.into_iter().fold(Self::default(), |mut kpis, c| {
            kpis.total += 1;
            match c.status {
                ClientStatus::Entrada => kpis.entradas += 1,
                ClientStatus::Fechado => kpis.fechados += 1,
                ClientStatus::Cancelado => kpis.cancelados += 1,
            }
            kpis
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(name: &str, city: &str, status: ClientStatus, origin: Option<LeadOrigin>) -> ClientDraft {
        ClientDraft {
            name: name.into(),
            city: city.into(),
            status,
            origin,
            ..ClientDraft::default()
        }
    }

    fn sample() -> Vec<ClientDraft> {
        vec![
            client("Ana Souza", "Recife", ClientStatus::Entrada, Some(LeadOrigin::Indicacao)),
            client("Posto Sol", "Natal", ClientStatus::Fechado, Some(LeadOrigin::Trafego)),
            client("Fazenda Boa Vista", "Recife", ClientStatus::Cancelado, None),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let clients = sample();
        assert_eq!(ClientFilter::default().apply(&clients).len(), 3);
    }

    #[test]
    fn text_search_is_case_insensitive_and_trimmed() {
        let clients = sample();
        let filter = ClientFilter { q: Some("  RECIFE ".into()), ..Default::default() };

        let names: Vec<&str> = filter.apply(&clients).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Souza", "Fazenda Boa Vista"]);
    }

    #[test]
    fn text_search_covers_origin_label() {
        let clients = sample();
        let filter = ClientFilter { q: Some("tráfego".into()), ..Default::default() };

        let found = filter.apply(&clients);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Posto Sol");
    }

    #[test]
    fn exact_filters_combine() {
        let clients = sample();
        let filter = ClientFilter {
            q: Some("recife".into()),
            status: Some(ClientStatus::Entrada),
            origin: Some(LeadOrigin::Indicacao),
            ..Default::default()
        };
        assert_eq!(filter.apply(&clients).len(), 1);

        let filter = ClientFilter { client_type: Some(ClientType::Rural), ..Default::default() };
        assert!(filter.apply(&clients).is_empty());
    }

    #[test]
    fn kpis_count_the_filtered_list() {
        let clients = sample();
        let filter = ClientFilter { q: Some("recife".into()), ..Default::default() };

        let kpis = ClientKpis::count(filter.apply(&clients));
        assert_eq!(
            kpis,
            ClientKpis { total: 2, entradas: 1, fechados: 0, cancelados: 1 }
        );
    }

    #[test]
    fn empty_and_all_selects_mean_no_filter() {
        let filter: ClientFilter =
            serde_json::from_value(serde_json::json!({ "status": "", "type": "all", "origin": "ALL" })).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.client_type, None);
        assert_eq!(filter.origin, None);

        let filter: ClientFilter = serde_json::from_value(serde_json::json!({ "q": "sol" })).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.client_type, None);
    }

    #[test]
    fn selected_values_still_filter() {
        let filter: ClientFilter = serde_json::from_value(serde_json::json!({
            "status": "FECHADO",
            "type": "RURAL",
            "origin": "TRÁFEGO"
        }))
        .unwrap();

        assert_eq!(filter.status, Some(ClientStatus::Fechado));
        assert_eq!(filter.client_type, Some(ClientType::Rural));
        assert_eq!(filter.origin, Some(LeadOrigin::Trafego));
    }
}

// src/services/client_service.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::format_brl},
    db::ClientRepository,
    models::client::ClientDraft,
    services::{
        client_editor::{ClientEditor, DraftEdit},
        client_filter::{ClientFilter, ClientKpis},
        derived_model::{DerivedModel, DisplayValues},
    },
};

// Linha da listagem: o cliente mais o valor total da proposta
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListItem {
    #[serde(flatten)]
    pub client: ClientDraft,
    pub total_value: Decimal,
    #[schema(example = "R$ 1.700,00")]
    pub total_value_display: String,
}

impl ClientListItem {
    fn from_draft(client: &ClientDraft) -> Self {
        let total_value = DerivedModel::compute(client).costs.total_value;
        Self {
            client: client.clone(),
            total_value,
            total_value_display: format_brl(total_value),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListResponse {
    pub kpis: ClientKpis,
    pub clients: Vec<ClientListItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// Rascunho atual (pode vir parcial; o que faltar recebe o padrão)
    #[serde(default)]
    #[schema(value_type = Object)]
    pub draft: serde_json::Value,
    #[serde(default)]
    pub edits: Vec<DraftEdit>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPreview {
    pub draft: ClientDraft,
    pub derived: DerivedModel,
    pub display: DisplayValues,
    pub can_submit: bool,
}

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(pool: PgPool, repo: ClientRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list(&self, filter: &ClientFilter) -> Result<ClientListResponse, AppError> {
        let clients: Vec<ClientDraft> = self
            .repo
            .list(&self.pool)
            .await?
            .into_iter()
            .map(ClientDraft::from)
            .collect();

        let filtered = filter.apply(&clients);
        Ok(ClientListResponse {
            kpis: ClientKpis::count(filtered.iter().copied()),
            clients: filtered.into_iter().map(ClientListItem::from_draft).collect(),
        })
    }

    pub async fn load(&self, id: Uuid) -> Result<ClientDraft, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .map(ClientDraft::from)
            .ok_or(AppError::ClientNotFound)
    }

    /// Grava o rascunho. Sem `editing_id` insere, com `editing_id` sobrescreve.
    /// Nada vai ao banco se os pagamentos não fecharem 100%.
    pub async fn save(
        &self,
        draft: ClientDraft,
        editing_id: Option<Uuid>,
        created_by: Uuid,
    ) -> Result<ClientDraft, AppError> {
        let mut draft = ClientEditor::from_draft(draft).submit()?;

        let row = match editing_id {
            Some(id) => {
                draft.id = id;
                self.repo
                    .update(&self.pool, id, &draft)
                    .await?
                    .ok_or(AppError::ClientNotFound)?
            }
            None => self.repo.insert(&self.pool, &draft, Some(created_by)).await?,
        };

        tracing::info!("💾 Cliente {} salvo ({})", row.id, if editing_id.is_some() { "edição" } else { "novo" });
        Ok(ClientDraft::from(row))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::ClientNotFound);
        }
        tracing::info!("🗑️ Cliente {} excluído", id);
        Ok(())
    }

    /// Recalcula o formulário sem tocar no banco.
    pub fn preview(request: PreviewRequest) -> Result<ClientPreview, AppError> {
        let draft = ClientDraft::hydrate(request.draft)?;
        let mut editor = ClientEditor::from_draft(draft);
        editor.apply_all(request.edits);

        let display = editor.derived().display();
        let can_submit = editor.can_submit();
        tracing::debug!("Prévia do cliente {} (pode salvar: {})", editor.draft().id, can_submit);

        let (draft, derived) = editor.into_parts();
        Ok(ClientPreview {
            draft,
            derived,
            display,
            can_submit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn preview_applies_edits_over_partial_draft() {
        let request: PreviewRequest = serde_json::from_value(json!({
            "draft": {
                "name": "Ana Souza",
                "plantPowerKwp": "10",
                "costs": [
                    { "id": "e", "category": "Equipamentos", "amount": "1000" },
                    { "id": "s", "category": "Serviços", "amount": "500" },
                    { "id": "g", "category": "Engenharia", "amount": "200" }
                ],
                "payments": [
                    { "id": "p1", "method": "PIX", "percent": "60" }
                ]
            },
            "edits": [
                { "op": "addPayment", "method": "BOLETO", "percent": "40" }
            ]
        }))
        .unwrap();

        let preview = ClientService::preview(request).unwrap();

        assert_eq!(preview.draft.name, "Ana Souza");
        assert_eq!(preview.derived.costs.total_value, dec!(1700));
        assert_eq!(preview.display.total_per_kwp, dec!(170));
        assert_eq!(preview.derived.payments.rows[1].value, dec!(680));
        assert!(preview.can_submit);
    }

    #[test]
    fn preview_of_empty_request_is_the_blank_form() {
        let request: PreviewRequest = serde_json::from_value(json!({})).unwrap();
        let preview = ClientService::preview(request).unwrap();

        assert_eq!(preview.draft.costs.len(), 3);
        assert_eq!(preview.draft.payments.len(), 1);
        assert!(!preview.can_submit);
    }

    #[test]
    fn list_item_carries_formatted_total() {
        let mut draft = ClientDraft::default();
        draft.plant_power_kwp = "10".into();
        let id = draft.costs[0].id.clone();
        draft.update_cost(&id, None, Some("1700".into()));

        let item = ClientListItem::from_draft(&draft);
        assert_eq!(item.total_value, dec!(1700));
        assert_eq!(item.total_value_display, "R$ 1.700,00");

        let body = serde_json::to_value(&item).unwrap();
        assert_eq!(body["totalValueDisplay"], "R$ 1.700,00");
        assert_eq!(body["id"], json!(draft.id));
    }
}

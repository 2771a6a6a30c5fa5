// src/services/client_editor.rs

use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::{
        address::AddressInfo,
        client::{
            ClientDraft, ClientStatus, ClientType, LeadOrigin, Month, NumericText, PaymentMethod,
            ServiceCategory, TextField,
        },
    },
    services::derived_model::DerivedModel,
};

/// Uma edição de campo do formulário de cliente.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DraftEdit {
    SetText { field: TextField, value: String },
    SetStatus { status: ClientStatus },
    SetType {
        #[serde(rename = "clientType")]
        client_type: Option<ClientType>,
    },
    SetOrigin { origin: Option<LeadOrigin> },
    SetServiceCategory { category: Option<ServiceCategory> },
    SetConsumption { month: Month, value: NumericText },
    SetPlantPower { value: NumericText },
    SetIrradiation { value: NumericText },
    ApplyAddress { address: AddressInfo },
    AddCost {
        #[serde(default)]
        category: String,
        #[serde(default)]
        amount: NumericText,
    },
    UpdateCost {
        id: String,
        category: Option<String>,
        amount: Option<NumericText>,
    },
    RemoveCost { id: String },
    AddPayment {
        #[serde(default)]
        method: PaymentMethod,
        #[serde(default)]
        percent: NumericText,
    },
    UpdatePayment {
        id: String,
        method: Option<PaymentMethod>,
        percent: Option<NumericText>,
    },
    RemovePayment { id: String },
}

/// Sessão de edição: dona de um rascunho e dos valores derivados dele.
/// Toda edição recalcula tudo na hora, antes da próxima.
#[derive(Debug, Clone)]
pub struct ClientEditor {
    draft: ClientDraft,
    derived: DerivedModel,
}

impl Default for ClientEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEditor {
    pub fn new() -> Self {
        Self::from_draft(ClientDraft::default())
    }

    pub fn from_draft(draft: ClientDraft) -> Self {
        let derived = DerivedModel::compute(&draft);
        Self { draft, derived }
    }

    pub fn draft(&self) -> &ClientDraft {
        &self.draft
    }

    pub fn derived(&self) -> &DerivedModel {
        &self.derived
    }

    pub fn can_submit(&self) -> bool {
        self.derived.payments.valid
    }

    pub fn apply(&mut self, edit: DraftEdit) -> &DerivedModel {
        let draft = &mut self.draft;
        match edit {
            DraftEdit::SetText { field, value } => *draft.text_mut(field) = value,
            DraftEdit::SetStatus { status } => draft.status = status,
            DraftEdit::SetType { client_type } => draft.client_type = client_type,
            DraftEdit::SetOrigin { origin } => draft.origin = origin,
            DraftEdit::SetServiceCategory { category } => draft.service_category = category,
            DraftEdit::SetConsumption { month, value } => draft.monthly_consumption.set(month, value),
            DraftEdit::SetPlantPower { value } => draft.plant_power_kwp = value,
            DraftEdit::SetIrradiation { value } => draft.irradiation = value,
            DraftEdit::ApplyAddress { address } => draft.apply_address(&address),
            DraftEdit::AddCost { category, amount } => {
                draft.add_cost(category, amount);
            }
            DraftEdit::UpdateCost { id, category, amount } => {
                if !draft.update_cost(&id, category, amount) {
                    tracing::debug!("Custo {} não existe mais no rascunho", id);
                }
            }
            DraftEdit::RemoveCost { id } => {
                draft.remove_cost(&id);
            }
            DraftEdit::AddPayment { method, percent } => {
                draft.add_payment(method, percent);
            }
            DraftEdit::UpdatePayment { id, method, percent } => {
                if !draft.update_payment(&id, method, percent) {
                    tracing::debug!("Pagamento {} não existe mais no rascunho", id);
                }
            }
            DraftEdit::RemovePayment { id } => {
                draft.remove_payment(&id);
            }
        }

        self.derived = DerivedModel::compute(&self.draft);
        &self.derived
    }

    pub fn apply_all(&mut self, edits: impl IntoIterator<Item = DraftEdit>) -> &DerivedModel {
        for edit in edits {
            self.apply(edit);
        }
        &self.derived
    }

    /// Libera o rascunho para gravação só se os pagamentos fecharem 100%.
    pub fn submit(self) -> Result<ClientDraft, AppError> {
        self.derived.payments.ensure_valid()?;
        Ok(self.draft)
    }

    pub fn into_parts(self) -> (ClientDraft, DerivedModel) {
        (self.draft, self.derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn cost_id(editor: &ClientEditor, category: &str) -> String {
        editor
            .draft()
            .costs
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.id.clone())
            .unwrap()
    }

    #[test]
    fn every_edit_recomputes() {
        let mut editor = ClientEditor::new();
        assert_eq!(editor.derived().costs.total_value, Decimal::ZERO);

        editor.apply(DraftEdit::SetPlantPower { value: "10".into() });
        let equipment = cost_id(&editor, "Equipamentos");
        let derived = editor.apply(DraftEdit::UpdateCost {
            id: equipment,
            category: None,
            amount: Some("1000".into()),
        });
        assert_eq!(derived.costs.total_value, dec!(1000));

        let derived = editor.apply(DraftEdit::SetIrradiation { value: "5".into() });
        assert_eq!(derived.generation.monthly, dec!(1500));
    }

    #[test]
    fn submit_blocked_until_split_closes() {
        let mut editor = ClientEditor::new();
        let pix = editor.draft().payments[0].id.clone();

        editor.apply(DraftEdit::UpdatePayment { id: pix.clone(), method: None, percent: Some("50".into()) });
        editor.apply(DraftEdit::AddPayment { method: PaymentMethod::Boleto, percent: "49".into() });
        assert!(!editor.can_submit());
        assert!(matches!(
            editor.clone().submit(),
            Err(AppError::PaymentSplitIncomplete { .. })
        ));

        editor.apply(DraftEdit::UpdatePayment { id: pix, method: None, percent: Some("51".into()) });
        assert!(editor.can_submit());
        assert!(editor.submit().is_ok());
    }

    #[test]
    fn editing_one_row_leaves_the_others_untouched() {
        let mut editor = ClientEditor::new();
        let before = editor.draft().costs[0].clone();
        let services = cost_id(&editor, "Serviços");

        editor.apply(DraftEdit::UpdateCost { id: services.clone(), category: None, amount: Some("500".into()) });
        editor.apply(DraftEdit::AddCost { category: "Frete".into(), amount: "10".into() });
        editor.apply(DraftEdit::RemoveCost { id: services });

        assert_eq!(editor.draft().costs[0], before);
        assert_eq!(editor.draft().costs.len(), 3);
    }

    #[test]
    fn unknown_row_ids_are_ignored() {
        let mut editor = ClientEditor::new();
        let snapshot = editor.draft().clone();

        editor.apply(DraftEdit::RemovePayment { id: "fantasma".into() });
        editor.apply(DraftEdit::UpdateCost { id: "fantasma".into(), category: Some("X".into()), amount: None });

        assert_eq!(editor.draft(), &snapshot);
    }

    #[test]
    fn edits_deserialize_from_tagged_json() {
        let edits: Vec<DraftEdit> = serde_json::from_value(json!([
            { "op": "setText", "field": "city", "value": "Recife" },
            { "op": "setConsumption", "month": "jan", "value": 320 },
            { "op": "setType", "clientType": "RURAL" },
            { "op": "addPayment", "method": "CARTAO", "percent": "100" }
        ]))
        .unwrap();

        let mut editor = ClientEditor::new();
        editor.apply_all(edits);

        assert_eq!(editor.draft().city, "Recife");
        assert_eq!(editor.draft().client_type, Some(ClientType::Rural));
        assert_eq!(editor.derived().consumption.annual, dec!(320));
        assert!(editor.can_submit());
    }

    #[test]
    fn raw_text_survives_coercion() {
        let mut editor = ClientEditor::new();
        editor.apply(DraftEdit::SetPlantPower { value: "10,5".into() });

        assert_eq!(editor.draft().plant_power_kwp.raw(), "10,5");
        assert_eq!(editor.derived().costs.total_per_kwp, Decimal::ZERO);
    }
}

// src/services/derived_model.rs
//
// Valores derivados do cadastro do cliente: consumo, geração estimada,
// custos por kWp e conferência das formas de pagamento. Tudo aqui é função
// pura do rascunho; nada toca o banco.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, money::round_display},
    models::client::{CanonicalCost, ClientDraft, PaymentMethod},
};

const MONTHS_PER_YEAR: i64 = 12;
const DAYS_PER_MONTH: i64 = 30;
const FULL_PERCENT: i64 = 100;

// Estouro vira 0, igual a qualquer outra entrada inválida.
fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

fn div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b).unwrap_or(Decimal::ZERO)
}

// Um estouro em qualquer parcela zera a soma inteira.
fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSummary {
    /// kWh no ano
    pub annual: Decimal,
    /// kWh por mês, precisão total
    pub average: Decimal,
}

impl ConsumptionSummary {
    pub fn from_draft(draft: &ClientDraft) -> Self {
        let annual = sum(draft.monthly_consumption.iter().map(|(_, v)| v.value()));
        let average = div(annual, Decimal::from(MONTHS_PER_YEAR));
        Self { annual, average }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEstimate {
    pub monthly: Decimal,
    pub annual: Decimal,
}

impl GenerationEstimate {
    pub fn from_draft(draft: &ClientDraft) -> Self {
        let monthly = mul(
            mul(draft.kwp(), draft.irradiation.value()),
            Decimal::from(DAYS_PER_MONTH),
        );
        let annual = mul(monthly, Decimal::from(MONTHS_PER_YEAR));
        Self { monthly, annual }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostAllocation {
    pub equipment_per_kwp: Decimal,
    pub services_per_kwp: Decimal,
    pub engineering_per_kwp: Decimal,
    pub total_per_kwp: Decimal,
    /// R$ total do sistema
    pub total_value: Decimal,
}

impl CostAllocation {
    pub fn from_draft(draft: &ClientDraft) -> Self {
        let kwp = draft.kwp();
        let per_kwp = |category: CanonicalCost| {
            if kwp > Decimal::ZERO {
                div(draft.canonical_cost(category), kwp)
            } else {
                Decimal::ZERO
            }
        };

        let equipment_per_kwp = per_kwp(CanonicalCost::Equipamentos);
        let services_per_kwp = per_kwp(CanonicalCost::Servicos);
        let engineering_per_kwp = per_kwp(CanonicalCost::Engenharia);

        // Linhas avulsas entram na lista de custos mas não no total por kWp.
        let total_per_kwp = sum([equipment_per_kwp, services_per_kwp, engineering_per_kwp]);
        let total_value = mul(total_per_kwp, kwp);

        Self {
            equipment_per_kwp,
            services_per_kwp,
            engineering_per_kwp,
            total_per_kwp,
            total_value,
        }
    }

    pub fn per_kwp(&self, category: CanonicalCost) -> Decimal {
        match category {
            CanonicalCost::Equipamentos => self.equipment_per_kwp,
            CanonicalCost::Servicos => self.services_per_kwp,
            CanonicalCost::Engenharia => self.engineering_per_kwp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentValue {
    pub id: String,
    pub method: PaymentMethod,
    pub percent: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReconciliation {
    pub total_percent: Decimal,
    pub remaining_percent: Decimal,
    /// Soma exatamente 100, sem tolerância.
    pub valid: bool,
    pub rows: Vec<PaymentValue>,
}

impl PaymentReconciliation {
    pub fn from_draft(draft: &ClientDraft, total_value: Decimal) -> Self {
        let hundred = Decimal::from(FULL_PERCENT);

        let rows: Vec<PaymentValue> = draft
            .payments
            .iter()
            .map(|p| {
                let percent = p.percent.value();
                PaymentValue {
                    id: p.id.clone(),
                    method: p.method,
                    percent,
                    value: div(mul(total_value, percent), hundred),
                }
            })
            .collect();

        let total_percent = sum(rows.iter().map(|r| r.percent));
        let remaining_percent = (hundred - total_percent).max(Decimal::ZERO);

        Self {
            total_percent,
            remaining_percent,
            valid: total_percent == hundred,
            rows,
        }
    }

    pub fn ensure_valid(&self) -> Result<(), AppError> {
        if self.valid {
            Ok(())
        } else {
            Err(AppError::PaymentSplitIncomplete {
                total_percent: self.total_percent,
            })
        }
    }
}

/// Valores arredondados para as telas (2 casas).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayValues {
    pub average_consumption: Decimal,
    pub monthly_generation: Decimal,
    pub annual_generation: Decimal,
    pub equipment_per_kwp: Decimal,
    pub services_per_kwp: Decimal,
    pub engineering_per_kwp: Decimal,
    pub total_per_kwp: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedModel {
    pub consumption: ConsumptionSummary,
    pub generation: GenerationEstimate,
    pub costs: CostAllocation,
    pub payments: PaymentReconciliation,
}

impl DerivedModel {
    pub fn compute(draft: &ClientDraft) -> Self {
        let consumption = ConsumptionSummary::from_draft(draft);
        let generation = GenerationEstimate::from_draft(draft);
        let costs = CostAllocation::from_draft(draft);
        let payments = PaymentReconciliation::from_draft(draft, costs.total_value);

        Self {
            consumption,
            generation,
            costs,
            payments,
        }
    }

    pub fn display(&self) -> DisplayValues {
        DisplayValues {
            average_consumption: round_display(self.consumption.average),
            monthly_generation: round_display(self.generation.monthly),
            annual_generation: round_display(self.generation.annual),
            equipment_per_kwp: round_display(self.costs.per_kwp(CanonicalCost::Equipamentos)),
            services_per_kwp: round_display(self.costs.per_kwp(CanonicalCost::Servicos)),
            engineering_per_kwp: round_display(self.costs.per_kwp(CanonicalCost::Engenharia)),
            total_per_kwp: round_display(self.costs.total_per_kwp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::{coerce_decimal, CostRow, Month, NumericText, PaymentRow};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn draft_with_costs(kwp: &str, equipment: &str, services: &str, engineering: &str) -> ClientDraft {
        let mut draft = ClientDraft::default();
        draft.plant_power_kwp = kwp.into();
        draft.costs = vec![
            CostRow { id: "e".into(), category: "Equipamentos".into(), amount: equipment.into() },
            CostRow { id: "s".into(), category: "Serviços".into(), amount: services.into() },
            CostRow { id: "g".into(), category: "Engenharia".into(), amount: engineering.into() },
        ];
        draft
    }

    fn payments(rows: &[(PaymentMethod, &str)]) -> Vec<PaymentRow> {
        rows.iter()
            .enumerate()
            .map(|(i, (method, pct))| PaymentRow {
                id: format!("p{i}"),
                method: *method,
                percent: NumericText::from(*pct),
            })
            .collect()
    }

    #[test]
    fn flat_consumption_sums_to_annual_and_average() {
        let mut draft = ClientDraft::default();
        for month in Month::ALL {
            draft.monthly_consumption.set(month, "100".into());
        }

        let consumption = ConsumptionSummary::from_draft(&draft);
        assert_eq!(consumption.annual, dec!(1200));
        assert_eq!(consumption.average, dec!(100));
        assert_eq!(round_display(consumption.average), dec!(100.00));
    }

    #[test]
    fn consumption_ignores_empty_and_garbage_months() {
        let mut draft = ClientDraft::default();
        draft.monthly_consumption.set(Month::Jan, "250".into());
        draft.monthly_consumption.set(Month::Fev, "abc".into());
        draft.monthly_consumption.set(Month::Mar, "50.5".into());

        let consumption = ConsumptionSummary::from_draft(&draft);
        assert_eq!(consumption.annual, dec!(300.5));
        assert_eq!(consumption.average, dec!(300.5) / dec!(12));
        assert_eq!(round_display(consumption.average), dec!(25.04));
    }

    #[test]
    fn generation_uses_thirty_day_months() {
        let mut draft = ClientDraft::default();
        draft.plant_power_kwp = "10".into();
        draft.irradiation = "5".into();

        let generation = GenerationEstimate::from_draft(&draft);
        assert_eq!(generation.monthly, dec!(1500));
        assert_eq!(generation.annual, dec!(18000));
    }

    #[test]
    fn cost_allocation_per_kwp() {
        let draft = draft_with_costs("10", "1000", "500", "200");
        let costs = CostAllocation::from_draft(&draft);

        assert_eq!(costs.per_kwp(CanonicalCost::Equipamentos), dec!(100));
        assert_eq!(costs.per_kwp(CanonicalCost::Servicos), dec!(50));
        assert_eq!(costs.per_kwp(CanonicalCost::Engenharia), dec!(20));
        assert_eq!(costs.total_per_kwp, dec!(170));
        assert_eq!(costs.total_value, dec!(1700));
    }

    #[rstest]
    #[case("0")]
    #[case("")]
    #[case("abc")]
    #[case("-5")]
    fn zero_or_invalid_kwp_gives_zero_per_kwp(#[case] kwp: &str) {
        let draft = draft_with_costs(kwp, "1000", "500", "200");
        let costs = CostAllocation::from_draft(&draft);

        for category in CanonicalCost::ALL {
            assert_eq!(costs.per_kwp(category), Decimal::ZERO);
        }
        assert_eq!(costs.total_value, Decimal::ZERO);
    }

    #[test]
    fn extra_cost_rows_stay_out_of_the_kwp_total() {
        let mut draft = draft_with_costs("10", "1000", "500", "200");
        draft.add_cost("Frete", "300".into());

        let costs = CostAllocation::from_draft(&draft);
        assert_eq!(costs.total_per_kwp, dec!(170));
        assert_eq!(costs.total_value, dec!(1700));
    }

    #[test]
    fn total_value_matches_per_kwp_sum_for_fractional_kwp() {
        let draft = draft_with_costs("7.5", "12345.67", "3210", "999.99");
        let costs = CostAllocation::from_draft(&draft);

        assert_eq!(
            costs.total_per_kwp,
            costs.equipment_per_kwp + costs.services_per_kwp + costs.engineering_per_kwp
        );
        assert_eq!(costs.total_value, costs.total_per_kwp * dec!(7.5));
    }

    #[test]
    fn payment_split_of_sixty_forty() {
        let mut draft = draft_with_costs("10", "1000", "500", "200");
        draft.payments = payments(&[(PaymentMethod::Pix, "60"), (PaymentMethod::Boleto, "40")]);

        let model = DerivedModel::compute(&draft);
        let values: Vec<Decimal> = model.payments.rows.iter().map(|r| r.value).collect();

        assert_eq!(values, vec![dec!(1020), dec!(680)]);
        assert_eq!(model.payments.total_percent, dec!(100));
        assert_eq!(model.payments.remaining_percent, Decimal::ZERO);
        assert!(model.payments.valid);
        assert!(model.payments.ensure_valid().is_ok());
    }

    #[test]
    fn incomplete_split_is_invalid() {
        let mut draft = ClientDraft::default();
        draft.payments = payments(&[(PaymentMethod::Pix, "50"), (PaymentMethod::Boleto, "49")]);

        let payments = DerivedModel::compute(&draft).payments;
        assert_eq!(payments.total_percent, dec!(99));
        assert_eq!(payments.remaining_percent, dec!(1));
        assert!(!payments.valid);
        assert!(matches!(
            payments.ensure_valid(),
            Err(AppError::PaymentSplitIncomplete { total_percent }) if total_percent == dec!(99)
        ));
    }

    #[rstest]
    #[case(&["33.33", "33.33", "33.34"], true)]
    #[case(&["33.3", "33.3", "33.3"], false)]
    #[case(&["100"], true)]
    #[case(&["100.00"], true)]
    #[case(&["70", "40"], false)]
    #[case(&["abc", "100"], true)]
    #[case(&[], false)]
    fn exact_equality_on_percent_total(#[case] percents: &[&str], #[case] valid: bool) {
        let mut draft = ClientDraft::default();
        draft.payments = payments(
            &percents
                .iter()
                .map(|p| (PaymentMethod::Pix, *p))
                .collect::<Vec<_>>(),
        );

        let payments = DerivedModel::compute(&draft).payments;
        assert_eq!(payments.valid, valid);
        assert_eq!(
            payments.remaining_percent,
            (dec!(100) - payments.total_percent).max(Decimal::ZERO)
        );
    }

    #[test]
    fn over_allocated_split_has_no_negative_remainder() {
        let mut draft = ClientDraft::default();
        draft.payments = payments(&[(PaymentMethod::Pix, "70"), (PaymentMethod::Cartao, "40")]);

        let payments = DerivedModel::compute(&draft).payments;
        assert_eq!(payments.total_percent, dec!(110));
        assert_eq!(payments.remaining_percent, Decimal::ZERO);
        assert!(!payments.valid);
    }

    #[test]
    fn overflow_degrades_to_zero() {
        let mut draft = ClientDraft::default();
        draft.plant_power_kwp = "79228162514264337593543950335".into();
        draft.irradiation = "10".into();

        let generation = GenerationEstimate::from_draft(&draft);
        assert_eq!(generation.monthly, Decimal::ZERO);
    }

    #[test]
    fn overflow_in_the_monthly_sum_zeroes_the_whole_sum() {
        let mut draft = ClientDraft::default();
        draft.monthly_consumption.set(Month::Jan, "79228162514264337593543950335".into());
        draft.monthly_consumption.set(Month::Fev, "1".into());
        draft.monthly_consumption.set(Month::Mar, "5".into());

        let consumption = ConsumptionSummary::from_draft(&draft);
        assert_eq!(consumption.annual, Decimal::ZERO);
        assert_eq!(consumption.average, Decimal::ZERO);
    }

    #[test]
    fn display_rounds_to_two_places() {
        let mut draft = draft_with_costs("3", "1000", "0", "0");
        draft.irradiation = "4.333".into();

        let display = DerivedModel::compute(&draft).display();
        assert_eq!(display.equipment_per_kwp, dec!(333.33));
        assert_eq!(display.monthly_generation, dec!(389.97));
    }

    // Texto de formulário: número, lixo ou vazio
    fn form_text() -> impl Strategy<Value = String> {
        prop_oneof![
            "-?[0-9]{1,6}(\\.[0-9]{1,4})?",
            "[a-z,_ ]{0,6}",
            Just(String::new()),
        ]
    }

    fn percent_text() -> impl Strategy<Value = String> {
        prop_oneof![
            "[0-9]{1,2}(\\.[0-9]{1,2})?",
            Just("100".to_string()),
            "[a-z]{0,3}",
        ]
    }

    proptest! {
        #[test]
        fn annual_is_the_sum_and_average_a_twelfth(values in prop::collection::vec(form_text(), 12)) {
            let mut draft = ClientDraft::default();
            for (month, raw) in Month::ALL.into_iter().zip(&values) {
                draft.monthly_consumption.set(month, raw.as_str().into());
            }

            let expected: Decimal = values.iter().map(|v| coerce_decimal(v)).sum();
            let consumption = ConsumptionSummary::from_draft(&draft);

            prop_assert_eq!(consumption.annual, expected);
            prop_assert_eq!(consumption.average, expected / dec!(12));
        }

        #[test]
        fn cost_allocation_is_consistent_with_kwp(
            kwp in form_text(),
            equipment in form_text(),
            services in form_text(),
            engineering in form_text(),
        ) {
            let draft = draft_with_costs(&kwp, &equipment, &services, &engineering);
            let costs = CostAllocation::from_draft(&draft);
            let kwp_value = coerce_decimal(&kwp);

            if kwp_value > Decimal::ZERO {
                prop_assert_eq!(costs.equipment_per_kwp, coerce_decimal(&equipment) / kwp_value);
                prop_assert_eq!(
                    costs.total_per_kwp,
                    costs.equipment_per_kwp + costs.services_per_kwp + costs.engineering_per_kwp
                );
                prop_assert_eq!(costs.total_value, costs.total_per_kwp * kwp_value);
            } else {
                for category in CanonicalCost::ALL {
                    prop_assert_eq!(costs.per_kwp(category), Decimal::ZERO);
                }
                prop_assert_eq!(costs.total_per_kwp, Decimal::ZERO);
                prop_assert_eq!(costs.total_value, Decimal::ZERO);
            }
        }

        #[test]
        fn reconciliation_tracks_the_percent_total(
            percents in prop::collection::vec(percent_text(), 0..6),
            amount in "[0-9]{1,6}",
        ) {
            let mut draft = draft_with_costs("10", &amount, "0", "0");
            draft.payments = payments(
                &percents.iter().map(|p| (PaymentMethod::Pix, p.as_str())).collect::<Vec<_>>(),
            );

            let model = DerivedModel::compute(&draft);
            let total: Decimal = percents.iter().map(|p| coerce_decimal(p)).sum();

            prop_assert_eq!(model.payments.total_percent, total);
            prop_assert_eq!(model.payments.remaining_percent, (dec!(100) - total).max(Decimal::ZERO));
            prop_assert_eq!(model.payments.valid, total == dec!(100));
            prop_assert_eq!(model.payments.ensure_valid().is_ok(), model.payments.valid);
            for row in &model.payments.rows {
                prop_assert_eq!(row.value, model.costs.total_value * row.percent / dec!(100));
            }
        }

        #[test]
        fn two_way_split_summing_to_hundred_is_valid(first in 0u32..=100) {
            let first_text = first.to_string();
            let second_text = (100 - first).to_string();

            let mut draft = ClientDraft::default();
            draft.payments = payments(&[
                (PaymentMethod::Pix, first_text.as_str()),
                (PaymentMethod::Boleto, second_text.as_str()),
            ]);

            let payments = DerivedModel::compute(&draft).payments;
            prop_assert!(payments.valid);
            prop_assert_eq!(payments.remaining_percent, Decimal::ZERO);
        }
    }
}

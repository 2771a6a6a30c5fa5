// src/models/client.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{
    de::{self, DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::address::AddressInfo;

// =============================================================================
//  TEXTO NUMÉRICO (campo "numérico ou vazio" do formulário)
// =============================================================================

/// Texto digitado num campo numérico. O texto cru é preservado para reedição;
/// a conversão para número acontece só na leitura (`value`), e qualquer coisa
/// vazia ou não numérica vale 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
#[schema(value_type = String, example = "150.5")]
pub struct NumericText(String);

impl NumericText {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> Decimal {
        coerce_decimal(&self.0)
    }
}

impl From<&str> for NumericText {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for NumericText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for NumericText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Aceita string ou número (o formulário manda os dois), null vira vazio.
        let raw = match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        };
        Ok(Self(raw))
    }
}

/// Converte o texto em número; vazio, texto inválido ou estouro viram 0.
pub fn coerce_decimal(raw: &str) -> Decimal {
    let text = raw.trim();
    if text.is_empty() || !is_decimal_literal(text) {
        return Decimal::ZERO;
    }

    let unsigned = text.strip_prefix('+').unwrap_or(text);
    let (sign, body) = match unsigned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", unsigned),
    };
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    // ".5" -> "0.5", "5." -> "5.0"
    let mut normalized = String::with_capacity(mantissa.len() + 2);
    normalized.push_str(sign);
    if mantissa.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(mantissa);
    if mantissa.ends_with('.') {
        normalized.push('0');
    }

    let parsed = match exponent {
        Some(exp) => Decimal::from_scientific(&format!("{normalized}e{exp}")),
        None => Decimal::from_str(&normalized),
    };
    parsed.unwrap_or(Decimal::ZERO)
}

// sinal opcional, dígitos, fração opcional, expoente opcional.
// Hexadecimal ("0x10") e "Infinity" não são aceitos de propósito: viram 0.
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

// =============================================================================
//  ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ClientStatus {
    #[default]
    Entrada,
    Fechado,
    Cancelado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ClientType {
    Residencial,
    Comercial,
    Industrial,
    Rural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_origin")]
pub enum LeadOrigin {
    #[serde(rename = "INDICAÇÃO")]
    #[sqlx(rename = "INDICAÇÃO")]
    Indicacao,
    #[serde(rename = "TRÁFEGO")]
    #[sqlx(rename = "TRÁFEGO")]
    Trafego,
    #[serde(rename = "DIRETO")]
    #[sqlx(rename = "DIRETO")]
    Direto,
    #[serde(rename = "OUTROS")]
    #[sqlx(rename = "OUTROS")]
    Outros,
}

impl LeadOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            LeadOrigin::Indicacao => "INDICAÇÃO",
            LeadOrigin::Trafego => "TRÁFEGO",
            LeadOrigin::Direto => "DIRETO",
            LeadOrigin::Outros => "OUTROS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Ufv,
    Manutencao,
    Eletropostos,
    Bess,
    MercadoLivre,
    Subestacao,
    Cftv,
    Ar,
    Iluminacao,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[default]
    Pix,
    Cartao,
    Boleto,
}

// =============================================================================
//  CONSUMO MENSAL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Jan,
    Fev,
    Mar,
    Abr,
    Mai,
    Jun,
    Jul,
    Ago,
    Set,
    Out,
    Nov,
    Dez,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Fev,
        Month::Mar,
        Month::Abr,
        Month::Mai,
        Month::Jun,
        Month::Jul,
        Month::Ago,
        Month::Set,
        Month::Out,
        Month::Nov,
        Month::Dez,
    ];
}

/// Consumo (kWh) por mês, nas 12 chaves fixas `jan..dez`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MonthlyConsumption {
    pub jan: NumericText,
    pub fev: NumericText,
    pub mar: NumericText,
    pub abr: NumericText,
    pub mai: NumericText,
    pub jun: NumericText,
    pub jul: NumericText,
    pub ago: NumericText,
    pub set: NumericText,
    pub out: NumericText,
    pub nov: NumericText,
    pub dez: NumericText,
}

impl MonthlyConsumption {
    pub fn get(&self, month: Month) -> &NumericText {
        match month {
            Month::Jan => &self.jan,
            Month::Fev => &self.fev,
            Month::Mar => &self.mar,
            Month::Abr => &self.abr,
            Month::Mai => &self.mai,
            Month::Jun => &self.jun,
            Month::Jul => &self.jul,
            Month::Ago => &self.ago,
            Month::Set => &self.set,
            Month::Out => &self.out,
            Month::Nov => &self.nov,
            Month::Dez => &self.dez,
        }
    }

    pub fn set(&mut self, month: Month, value: NumericText) {
        let slot = match month {
            Month::Jan => &mut self.jan,
            Month::Fev => &mut self.fev,
            Month::Mar => &mut self.mar,
            Month::Abr => &mut self.abr,
            Month::Mai => &mut self.mai,
            Month::Jun => &mut self.jun,
            Month::Jul => &mut self.jul,
            Month::Ago => &mut self.ago,
            Month::Set => &mut self.set,
            Month::Out => &mut self.out,
            Month::Nov => &mut self.nov,
            Month::Dez => &mut self.dez,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, &NumericText)> {
        Month::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

// =============================================================================
//  LINHAS DE CUSTO E PAGAMENTO
// =============================================================================

fn new_row_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostRow {
    #[serde(default = "new_row_id")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "Equipamentos")]
    pub category: String,
    #[serde(default)]
    pub amount: NumericText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    #[serde(default = "new_row_id")]
    pub id: String,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub percent: NumericText,
}

/// As três categorias que entram no total por kWp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CanonicalCost {
    Equipamentos,
    #[serde(rename = "Serviços")]
    Servicos,
    Engenharia,
}

impl CanonicalCost {
    pub const ALL: [CanonicalCost; 3] = [
        CanonicalCost::Equipamentos,
        CanonicalCost::Servicos,
        CanonicalCost::Engenharia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CanonicalCost::Equipamentos => "Equipamentos",
            CanonicalCost::Servicos => "Serviços",
            CanonicalCost::Engenharia => "Engenharia",
        }
    }
}

pub fn default_costs() -> Vec<CostRow> {
    CanonicalCost::ALL
        .iter()
        .map(|c| CostRow {
            id: new_row_id(),
            category: c.label().to_string(),
            amount: NumericText::default(),
        })
        .collect()
}

pub fn default_payments() -> Vec<PaymentRow> {
    vec![PaymentRow {
        id: new_row_id(),
        method: PaymentMethod::Pix,
        percent: NumericText::new("0"),
    }]
}

// Se o valor persistido não for uma lista, volta para as linhas padrão.
fn rows_or<T: DeserializeOwned>(value: Value, fallback: fn() -> Vec<T>) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        _ => Ok(fallback()),
    }
}

fn costs_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<CostRow>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    rows_or(value, default_costs).map_err(de::Error::custom)
}

fn payments_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PaymentRow>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    rows_or(value, default_payments).map_err(de::Error::custom)
}

fn consumption_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MonthlyConsumption, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(de::Error::custom),
        _ => Ok(MonthlyConsumption::default()),
    }
}

// Os selects do formulário mandam "" quando nada foi escolhido.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => T::deserialize(s.into_deserializer()).map(Some),
    }
}

// =============================================================================
//  CLIENTE (rascunho do formulário)
// =============================================================================

/// Campos de texto livre do cadastro, endereçáveis por nome nas edições.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    ContactNumber,
    Email,
    Document,
    BirthDate,
    Observations,
    Cep,
    Address,
    HouseNumber,
    Neighborhood,
    City,
    State,
    RoofType,
    Apportionment,
    Inverters,
    Modules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDraft {
    pub id: Uuid,
    pub status: ClientStatus,

    #[serde(rename = "type", deserialize_with = "empty_as_none")]
    pub client_type: Option<ClientType>,

    #[schema(example = "Maria da Silva")]
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub document: String,
    #[schema(example = "1990-05-20")]
    pub birth_date: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub origin: Option<LeadOrigin>,
    pub observations: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub service_category: Option<ServiceCategory>,

    // Endereço
    pub cep: String,
    pub address: String,
    pub house_number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,

    // UFV
    #[serde(deserialize_with = "consumption_or_default")]
    pub monthly_consumption: MonthlyConsumption,
    pub plant_power_kwp: NumericText,
    pub irradiation: NumericText,
    pub roof_type: String,
    pub apportionment: String,
    pub inverters: String,
    pub modules: String,

    // Financeiro
    #[serde(deserialize_with = "costs_or_default")]
    pub costs: Vec<CostRow>,
    #[serde(deserialize_with = "payments_or_default")]
    pub payments: Vec<PaymentRow>,

    #[serde(skip_deserializing)]
    pub created_by: Option<Uuid>,
    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for ClientDraft {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ClientStatus::default(),
            client_type: None,
            name: String::new(),
            contact_number: String::new(),
            email: String::new(),
            document: String::new(),
            birth_date: String::new(),
            origin: None,
            observations: String::new(),
            service_category: None,
            cep: String::new(),
            address: String::new(),
            house_number: String::new(),
            neighborhood: String::new(),
            city: String::new(),
            state: String::new(),
            monthly_consumption: MonthlyConsumption::default(),
            plant_power_kwp: NumericText::default(),
            irradiation: NumericText::default(),
            roof_type: String::new(),
            apportionment: String::new(),
            inverters: String::new(),
            modules: String::new(),
            costs: default_costs(),
            payments: default_payments(),
            created_by: None,
            created_at: None,
        }
    }
}

// Remove chaves com null para que caiam no valor padrão.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

impl ClientDraft {
    /// Monta um rascunho a partir de um JSON parcial, preenchendo o que faltar
    /// (ou vier nulo) com o valor padrão.
    pub fn hydrate(value: Value) -> Result<Self, serde_json::Error> {
        match strip_nulls(value) {
            Value::Null => Ok(Self::default()),
            value => serde_json::from_value(value),
        }
    }

    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Name => &mut self.name,
            TextField::ContactNumber => &mut self.contact_number,
            TextField::Email => &mut self.email,
            TextField::Document => &mut self.document,
            TextField::BirthDate => &mut self.birth_date,
            TextField::Observations => &mut self.observations,
            TextField::Cep => &mut self.cep,
            TextField::Address => &mut self.address,
            TextField::HouseNumber => &mut self.house_number,
            TextField::Neighborhood => &mut self.neighborhood,
            TextField::City => &mut self.city,
            TextField::State => &mut self.state,
            TextField::RoofType => &mut self.roof_type,
            TextField::Apportionment => &mut self.apportionment,
            TextField::Inverters => &mut self.inverters,
            TextField::Modules => &mut self.modules,
        }
    }

    pub fn kwp(&self) -> Decimal {
        self.plant_power_kwp.value()
    }

    /// Primeira linha cujo rótulo bate exatamente com a categoria.
    pub fn canonical_cost(&self, category: CanonicalCost) -> Decimal {
        self.costs
            .iter()
            .find(|c| c.category == category.label())
            .map(|c| c.amount.value())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn apply_address(&mut self, info: &AddressInfo) {
        self.cep = info.cep.clone();
        self.address = info.street.clone();
        self.neighborhood = info.neighborhood.clone();
        self.city = info.city.clone();
        self.state = info.state.clone();
    }

    // --- Custos (endereçados por id, nunca por posição) ---

    #[cfg(test)]
    pub fn cost(&self, id: &str) -> Option<&CostRow> {
        self.costs.iter().find(|c| c.id == id)
    }

    pub fn add_cost(&mut self, category: impl Into<String>, amount: NumericText) -> String {
        let id = new_row_id();
        self.costs.push(CostRow { id: id.clone(), category: category.into(), amount });
        id
    }

    pub fn update_cost(&mut self, id: &str, category: Option<String>, amount: Option<NumericText>) -> bool {
        let Some(row) = self.costs.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(category) = category {
            row.category = category;
        }
        if let Some(amount) = amount {
            row.amount = amount;
        }
        true
    }

    pub fn remove_cost(&mut self, id: &str) -> bool {
        let before = self.costs.len();
        self.costs.retain(|c| c.id != id);
        self.costs.len() != before
    }

    // --- Pagamentos ---

    #[cfg(test)]
    pub fn payment(&self, id: &str) -> Option<&PaymentRow> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn add_payment(&mut self, method: PaymentMethod, percent: NumericText) -> String {
        let id = new_row_id();
        self.payments.push(PaymentRow { id: id.clone(), method, percent });
        id
    }

    pub fn update_payment(&mut self, id: &str, method: Option<PaymentMethod>, percent: Option<NumericText>) -> bool {
        let Some(row) = self.payments.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if let Some(method) = method {
            row.method = method;
        }
        if let Some(percent) = percent {
            row.percent = percent;
        }
        true
    }

    pub fn remove_payment(&mut self, id: &str) -> bool {
        let before = self.payments.len();
        self.payments.retain(|p| p.id != id);
        self.payments.len() != before
    }
}

// =============================================================================
//  LINHA DO BANCO
// =============================================================================

// O que sai da tabela `clients`. As partes variáveis do formulário ficam em JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub status: ClientStatus,
    pub client_type: Option<ClientType>,
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub document: String,
    pub birth_date: String,
    pub origin: Option<LeadOrigin>,
    pub observations: String,
    pub service_category: Option<ServiceCategory>,
    pub cep: String,
    pub address: String,
    pub house_number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub monthly_consumption: Value,
    pub plant_power_kwp: String,
    pub irradiation: String,
    pub roof_type: String,
    pub apportionment: String,
    pub inverters: String,
    pub modules: String,
    pub costs: Value,
    pub payments: Value,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ClientRow> for ClientDraft {
    fn from(row: ClientRow) -> Self {
        let monthly_consumption = serde_json::from_value(strip_nulls(row.monthly_consumption)).unwrap_or_default();
        let costs = rows_or(strip_nulls(row.costs), default_costs).unwrap_or_else(|e| {
            tracing::warn!("Custos inválidos no cliente {}: {}", row.id, e);
            default_costs()
        });
        let payments = rows_or(strip_nulls(row.payments), default_payments).unwrap_or_else(|e| {
            tracing::warn!("Pagamentos inválidos no cliente {}: {}", row.id, e);
            default_payments()
        });

        Self {
            id: row.id,
            status: row.status,
            client_type: row.client_type,
            name: row.name,
            contact_number: row.contact_number,
            email: row.email,
            document: row.document,
            birth_date: row.birth_date,
            origin: row.origin,
            observations: row.observations,
            service_category: row.service_category,
            cep: row.cep,
            address: row.address,
            house_number: row.house_number,
            neighborhood: row.neighborhood,
            city: row.city,
            state: row.state,
            monthly_consumption,
            plant_power_kwp: NumericText::new(row.plant_power_kwp),
            irradiation: NumericText::new(row.irradiation),
            roof_type: row.roof_type,
            apportionment: row.apportionment,
            inverters: row.inverters,
            modules: row.modules,
            costs,
            payments,
            created_by: row.created_by,
            created_at: Some(row.created_at),
        }
    }
}

// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Arredonda para exibição (2 casas). O valor interno continua com precisão total.
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formata um valor em reais no padrão brasileiro: `R$ 1.700,00`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_display(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // "1700.00" -> inteiro "1700", centavos "00"
    let plain = format!("{:.2}", rounded.abs());
    let (integer, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents}")
}

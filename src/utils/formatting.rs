//! Formateo de valores para presentación
//!
//! Funciones puras: no dependen de ningún locale global.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formatea un importe con separador de miles y dos decimales: `10,000.00`
pub fn format_grouped(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Formatea un teléfono numérico como `xxx-xxx-xxxx`
///
/// Valores con menos de 7 dígitos se devuelven tal cual.
pub fn format_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 {
        return value.to_string();
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(Decimal::new(1000000, 2)), "10,000.00");
        assert_eq!(format_grouped(Decimal::from(50000)), "50,000.00");
        assert_eq!(format_grouped(Decimal::ZERO), "0.00");
        assert_eq!(format_grouped(Decimal::new(999, 0)), "999.00");
        assert_eq!(format_grouped(Decimal::new(123456789, 1)), "12,345,678.90");
        assert_eq!(format_grouped(Decimal::new(-150000, 2)), "-1,500.00");
    }

    #[test]
    fn test_format_grouped_rounds_half_even() {
        assert_eq!(format_grouped(Decimal::new(10125, 3)), "10.12");
        assert_eq!(format_grouped(Decimal::new(10135, 3)), "10.14");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("1234567890"), "123-456-7890");
        assert_eq!(format_phone("12345"), "12345");
    }
}

//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos. Los formularios del panel de administración
//! envían todo como texto, así que los campos numéricos se convierten
//! aquí: la entrada vacía o inválida se convierte en `None`, nunca en error.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Normalizar texto opcional: recorta espacios y descarta vacíos
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Convertir texto a entero no negativo (`"7"` -> `Some(7)`, `"abc"`/`"-1"` -> `None`)
pub fn coerce_non_negative_int(value: Option<&str>) -> Option<i32> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    // Aceptar "5.0" como 5, igual que un formulario HTML de tipo number
    let parsed = text
        .parse::<i32>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0 && *v <= i32::MAX as f64)
                .map(|v| v as i32)
        })?;

    (parsed >= 0).then_some(parsed)
}

/// Límite exclusivo de las columnas `NUMERIC(10, 2)` de precios
pub const MAX_PRICE_EXCLUSIVE: i64 = 100_000_000;

/// Convertir texto a decimal no negativo (`"120.50"` -> `Some(120.50)`);
/// lo que no cabe en la columna se descarta
pub fn coerce_price(value: Option<&str>) -> Option<Decimal> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())?
        .round_dp(2);

    (!parsed.is_sign_negative() && parsed < Decimal::from(MAX_PRICE_EXCLUSIVE)).then_some(parsed)
}

/// Parsear el año; `None` si no es numérico
pub fn parse_year(value: Option<&str>) -> Option<i32> {
    value?.trim().parse::<i32>().ok()
}

/// Interpretar flags de formulario (`"true"`, `"1"`, `"on"`)
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    let text = value?.trim().to_ascii_lowercase();
    match text.as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Deserializar un campo que puede llegar como string, número, booleano o null.
///
/// El formulario JSON de propiedades envía `"seats": "5"` o `"seats": 5`
/// indistintamente; ambos terminan como `Some("5")`.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_non_negative_int(Some("5")), Some(5));
        assert_eq!(coerce_non_negative_int(Some(" 640 ")), Some(640));
        assert_eq!(coerce_non_negative_int(Some("4.0")), Some(4));
        assert_eq!(coerce_non_negative_int(Some("")), None);
        assert_eq!(coerce_non_negative_int(Some("abc")), None);
        assert_eq!(coerce_non_negative_int(Some("-3")), None);
        assert_eq!(coerce_non_negative_int(Some("NaN")), None);
        assert_eq!(coerce_non_negative_int(None), None);
    }

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price(Some("120.50")), Some(Decimal::new(12050, 2)));
        assert_eq!(coerce_price(Some("100")), Some(Decimal::from(100)));
        assert_eq!(coerce_price(Some("")), None);
        assert_eq!(coerce_price(Some("free")), None);
        assert_eq!(coerce_price(Some("-10")), None);
        assert_eq!(coerce_price(Some("99999999.99")), Some(Decimal::new(9_999_999_999, 2)));
        assert_eq!(coerce_price(Some("123456789")), None);
        assert_eq!(coerce_price(Some("1e12")), None);
        assert_eq!(coerce_price(Some("99999999.999")), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("2024")), Some(2024));
        assert_eq!(parse_year(Some(" 1999 ")), Some(1999));
        assert_eq!(parse_year(Some("twenty")), None);
        assert_eq!(parse_year(None), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(Some("true")), Some(true));
        assert_eq!(parse_flag(Some("FALSE")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Red ")), Some("Red".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
    }

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_lenient_string")]
        seats: Option<String>,
    }

    #[test]
    fn test_lenient_string() {
        let p: Probe = serde_json::from_str(r#"{"seats": 5}"#).unwrap();
        assert_eq!(p.seats.as_deref(), Some("5"));
        let p: Probe = serde_json::from_str(r#"{"seats": "5"}"#).unwrap();
        assert_eq!(p.seats.as_deref(), Some("5"));
        let p: Probe = serde_json::from_str(r#"{"seats": null}"#).unwrap();
        assert_eq!(p.seats, None);
        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.seats, None);
    }
}

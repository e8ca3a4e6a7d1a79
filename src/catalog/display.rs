//! Helpers de presentación de las fichas del catálogo

use rust_decimal::Decimal;

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_SWATCH: &str = "#888";

/// Color CSS de la muestra: el nombre en minúsculas o gris
pub fn color_swatch(color: Option<&str>) -> String {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_SWATCH.to_string())
}

pub fn format_color(color: Option<&str>) -> String {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn format_horsepower(horsepower: Option<i32>) -> String {
    format!("{} HP", horsepower.unwrap_or(0))
}

pub fn format_seats(seats: Option<i32>) -> String {
    seats.map_or_else(|| NOT_AVAILABLE.to_string(), |s| s.to_string())
}

pub fn format_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.round_dp(2).normalize().to_string())
}

/// Las rutas relativas se sirven desde el backend
pub fn resolve_image_url(api_base: &str, url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", api_base.trim_end_matches('/'), url)
    }
}

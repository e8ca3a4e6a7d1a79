//! Pipeline del catálogo: búsqueda, filtros, orden y paginación
//!
//! Orden de aplicación: búsqueda, marca, tipo, orden por precio. El orden es
//! estable; los empates conservan el orden del listado original (por id).

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::models::vehicle::Vehicle;

/// Valor de un filtro de selección: "all" o un valor concreto
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"all"` o vacío -> `All`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Default,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "price_low" => SortOrder::PriceLow,
            "price_high" => SortOrder::PriceHigh,
            _ => SortOrder::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Default => "default",
            SortOrder::PriceLow => "price_low",
            SortOrder::PriceHigh => "price_high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    pub search: String,
    pub brand: Selection,
    pub vehicle_type: Selection,
    pub sort: SortOrder,
}

fn matches_search(vehicle: &Vehicle, needle: &str) -> bool {
    vehicle.brand.to_lowercase().contains(needle)
        || vehicle.model.to_lowercase().contains(needle)
        || vehicle.year.to_string().contains(needle)
        || vehicle.vehicle_type.to_lowercase().contains(needle)
}

// Precio ausente siempre al final, en ambos sentidos
fn compare_prices(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_vehicles(vehicles: &mut [Vehicle], order: SortOrder) {
    match order {
        SortOrder::Default => {}
        SortOrder::PriceLow => {
            vehicles.sort_by(|a, b| compare_prices(a.price_per_day, b.price_per_day, false))
        }
        SortOrder::PriceHigh => {
            vehicles.sort_by(|a, b| compare_prices(a.price_per_day, b.price_per_day, true))
        }
    }
}

/// Aplicar búsqueda, filtros y orden sobre el listado completo
pub fn apply_filters(vehicles: &[Vehicle], query: &CatalogQuery) -> Vec<Vehicle> {
    let needle = query.search.trim().to_lowercase();

    let mut filtered: Vec<Vehicle> = vehicles
        .iter()
        .filter(|v| needle.is_empty() || matches_search(v, &needle))
        .filter(|v| match &query.brand {
            Selection::All => true,
            Selection::Only(brand) => v.brand == *brand,
        })
        .filter(|v| match &query.vehicle_type {
            Selection::All => true,
            Selection::Only(kind) => v.vehicle_type.eq_ignore_ascii_case(kind),
        })
        .cloned()
        .collect();

    sort_vehicles(&mut filtered, query.sort);
    filtered
}

/// Marcas distintas, ordenadas, para el desplegable
pub fn distinct_brands(vehicles: &[Vehicle]) -> Vec<String> {
    vehicles
        .iter()
        .map(|v| v.brand.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tamaño de página según el ancho de pantalla
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    #[default]
    Desktop,
    Narrow,
}

impl Viewport {
    pub const NARROW_BREAKPOINT_PX: u32 = 768;

    pub fn from_width(width_px: u32) -> Self {
        if width_px < Self::NARROW_BREAKPOINT_PX {
            Viewport::Narrow
        } else {
            Viewport::Desktop
        }
    }

    pub fn page_size(&self) -> usize {
        match self {
            Viewport::Desktop => 20,
            Viewport::Narrow => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
    /// Números de página a mostrar; vacío si todo cabe en una página
    pub window: Vec<usize>,
}

/// Ventana del paginador: primera, vecinas de la actual y última
pub fn page_window(page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let mut pages = vec![1];
    let start = page.saturating_sub(1).max(2);
    let end = (page + 1).min(total_pages - 1);
    pages.extend(start..=end);
    pages.push(total_pages);
    pages.dedup();
    pages
}

/// Página `page` (1-based, acotada al rango válido)
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * page_size;
    let items = items.iter().skip(start).take(page_size).cloned().collect();

    Page {
        items,
        total,
        total_pages,
        page,
        window: page_window(page, total_pages),
    }
}

/// Estado de la vista del catálogo; cualquier cambio de filtros vuelve a la página 1
#[derive(Debug, Clone, Default)]
pub struct CatalogBrowser {
    vehicles: Vec<Vehicle>,
    query: CatalogQuery,
    viewport: Viewport,
    page: usize,
    filtered: Vec<Vehicle>,
}

impl CatalogBrowser {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            page: 1,
            ..Default::default()
        }
    }

    fn recompute(&mut self) {
        self.filtered = apply_filters(&self.vehicles, &self.query);
        self.page = 1;
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) {
        self.vehicles = vehicles;
        self.recompute();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.recompute();
    }

    pub fn set_brand(&mut self, brand: Selection) {
        self.query.brand = brand;
        self.recompute();
    }

    pub fn set_type(&mut self, vehicle_type: Selection) {
        self.query.vehicle_type = vehicle_type;
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
        self.recompute();
    }

    /// Cambiar de breakpoint no reinicia la página, solo la acota
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.page = self.current_page().page;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.page = self.current_page().page;
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    pub fn filtered(&self) -> &[Vehicle] {
        &self.filtered
    }

    pub fn brands(&self) -> Vec<String> {
        distinct_brands(&self.vehicles)
    }

    pub fn current_page(&self) -> Page<Vehicle> {
        paginate(&self.filtered, self.page, self.viewport.page_size())
    }
}

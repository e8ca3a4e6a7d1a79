//! Pipeline de catálogo del cliente
//!
//! Todo lo que convierte el listado plano de `/api/cars` en lo que ve el
//! visitante: caché con TTL, cliente cancelable, filtros, orden, paginación,
//! carrusel de imágenes y enlace de reserva.

pub mod booking;
pub mod cache;
pub mod carousel;
pub mod client;
pub mod display;
pub mod pipeline;

pub use cache::{CatalogCache, TtlCache, CATALOG_KEY};
pub use carousel::ImageCarousel;
pub use client::{CatalogClient, ClientError};
pub use pipeline::{apply_filters, paginate, CatalogBrowser, CatalogQuery, Page, Selection, SortOrder, Viewport};

//! Catalog domain module.
//!
//! This crate contains business rules for products and categories, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod product;
pub mod stock;
pub mod timestamp;

pub use category::{Category, NewCategory};
pub use product::{DEFAULT_STOCK_COUNT, LOW_STOCK_THRESHOLD, Product, ProductDraft, Variant};
pub use stock::{RemovalOutcome, StockDisposition};
pub use timestamp::{RawTimestamp, parse_timestamp};

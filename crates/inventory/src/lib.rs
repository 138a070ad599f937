//! Inventory read side for reservation.
//!
//! This crate exposes on-hand stock (quants) through the [`QuantitySource`]
//! seam and the product/packaging catalog the packaging strategy reads from.
//! It never reserves anything itself: reservation bookkeeping stays with the
//! caller's inventory system.

pub mod catalog;
pub mod quant;
pub mod source;

pub use catalog::{Packaging, PackagingType, Product, ProductCatalog};
pub use quant::Quant;
pub use source::{InMemoryQuantStore, QuantitySource};

//! `stockres-engine` — the stock reservation allocation engine.
//!
//! For one [`Demand`], the [`Allocator`] walks the applicable reserve rules in
//! order, expands each removal rule's location into concrete locations, asks
//! the [`QuantitySource`](stockres_inventory::QuantitySource) what is free
//! there and lets the removal strategy decide which locations to take from
//! and how much. Whatever is left is routed to a fallback location or left
//! unreserved.
//!
//! The engine is pure decision logic: it never writes stock, moves or
//! reservations back anywhere.

pub mod allocator;
pub mod config;
pub mod result;
pub mod strategy;


pub use allocator::Allocator;
pub use config::{EngineConfig, FallbackPolicy};
pub use result::{
    AllocationLine, AllocationResult, LineKind, MoveState, OutboundRecord, Outcome, RecordState,
};
pub use stockres_rules::Demand;
pub use strategy::{Bin, PackagingSize, Selection, select};

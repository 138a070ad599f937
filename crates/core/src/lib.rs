//! `stockres-core` — building blocks shared by every reservation crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error model, non-negative quantities and the
//! attribute/predicate machinery used by rule and quant filters.

pub mod error;
pub mod id;
pub mod predicate;
pub mod quantity;
pub mod record;

pub use error::{DomainError, DomainResult};
pub use id::{LocationId, PackagingTypeId, ProductId, RuleId};
pub use predicate::{Condition, Operator, Predicate};
pub use quantity::Quantity;
pub use record::{AttrValue, Attributes, Record};

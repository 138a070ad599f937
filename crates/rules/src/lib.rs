//! Reservation rule configuration.
//!
//! A [`ReserveRule`] says *where* to look for stock (its location and ordered
//! [`RemovalRule`]s) and *how* to take it (a [`RemovalStrategy`] per removal
//! rule). Rules are validated against the location tree when they are created
//! or updated, never while allocating.

pub mod book;
pub mod demand;
pub mod matching;
pub mod rule;
pub mod validation;

pub use book::RuleBook;
pub use demand::Demand;
pub use matching::applicable_rules;
pub use rule::{RemovalRule, RemovalStrategy, ReserveRule};
pub use validation::validate_rule;

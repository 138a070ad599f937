//! Location tree resolver.
//!
//! Stock locations form a forest (warehouse → zone → bin). Reservation rules
//! name abstract locations; this crate expands them into the concrete
//! locations underneath, in a stable canonical order, and answers
//! "is `a` inside `b`" in constant time.

pub mod tree;

pub use tree::{Location, LocationTree, LocationTreeBuilder};

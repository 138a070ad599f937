//! Scenario files and reporting for the `stockres` command line.
//!
//! A scenario describes a warehouse (locations, products, stock), the reserve
//! rules configured on it and the demands to allocate, all referenced by
//! human-readable names instead of identifiers.

pub mod report;
pub mod scenario;

pub use report::{DemandReport, render};
pub use scenario::{NamedDemand, Scenario, ScenarioError, ScenarioFile};

//! JSON output of allocation results, with identifiers replaced by names.

use serde::Serialize;

use stockres_core::Quantity;
use stockres_engine::{AllocationResult, LineKind, MoveState, Outcome, RecordState};

use crate::scenario::Scenario;

#[derive(Debug, Serialize)]
pub struct DemandReport {
    pub demand: String,
    pub product: String,
    pub source: String,
    pub requested: Quantity,
    pub outcome: Outcome,
    pub move_state: MoveState,
    pub reserved: Quantity,
    pub covered: Quantity,
    pub remainder: Quantity,
    pub lines: Vec<LineReport>,
    pub records: Vec<RecordReport>,
}

#[derive(Debug, Serialize)]
pub struct LineReport {
    pub location: String,
    pub quantity: Quantity,
    pub rule: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_at_fallback: Option<Quantity>,
}

#[derive(Debug, Serialize)]
pub struct RecordReport {
    pub location: String,
    pub quantity: Quantity,
    pub state: RecordState,
}

impl DemandReport {
    pub fn new(scenario: &Scenario, demand: &str, result: &AllocationResult) -> Self {
        let lines = result
            .lines()
            .iter()
            .map(|line| {
                let available_at_fallback = match line.kind {
                    LineKind::Reserved => None,
                    LineKind::Fallback { available } => Some(available),
                };
                LineReport {
                    location: scenario.location_name(line.location),
                    quantity: line.quantity,
                    rule: scenario.rule_name(line.rule),
                    fallback: available_at_fallback.is_some(),
                    available_at_fallback,
                }
            })
            .collect();
        let records = result
            .outbound_records()
            .into_iter()
            .map(|record| RecordReport {
                location: scenario.location_name(record.location),
                quantity: record.quantity,
                state: record.state,
            })
            .collect();

        Self {
            demand: demand.to_string(),
            product: scenario.product_name(result.product()),
            source: scenario.location_name(result.source()),
            requested: result.requested(),
            outcome: result.outcome(),
            move_state: result.move_state(),
            reserved: result.reserved(),
            covered: result.covered(),
            remainder: result.remainder(),
            lines,
            records,
        }
    }
}

pub fn render(reports: &[DemandReport], pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(reports)
    } else {
        serde_json::to_string(reports)
    }
}

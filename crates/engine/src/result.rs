//! Allocation results and the records callers materialize from them.

use serde::{Deserialize, Serialize};

use stockres_core::{LocationId, ProductId, Quantity, RuleId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    /// Quantity found on hand and reserved.
    Reserved,
    /// Remainder routed to a rule's fallback location without a stock check.
    /// `available` is what the quantity source reported inside that location
    /// at decision time, capped at the line quantity.
    Fallback { available: Quantity },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub location: LocationId,
    pub quantity: Quantity,
    pub rule: RuleId,
    #[serde(flatten)]
    pub kind: LineKind,
}

impl AllocationLine {
    pub fn is_fallback(&self) -> bool {
        matches!(self.kind, LineKind::Fallback { .. })
    }
}

/// Terminal state of one allocation pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Fallback,
    Partial,
}

/// Reservation state the caller should give the demand's move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    FullyReserved,
    PartiallyReserved,
    Unreserved,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    Reserved,
    Waiting,
}

/// One outbound record to materialize: a move (or move line) from `location`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub location: LocationId,
    pub quantity: Quantity,
    pub state: RecordState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    product: ProductId,
    source: LocationId,
    requested: Quantity,
    lines: Vec<AllocationLine>,
    remainder: Quantity,
    outcome: Outcome,
}

impl AllocationResult {
    pub(crate) fn new(
        product: ProductId,
        source: LocationId,
        requested: Quantity,
        lines: Vec<AllocationLine>,
        remainder: Quantity,
    ) -> Self {
        let outcome = if lines.iter().any(AllocationLine::is_fallback) {
            Outcome::Fallback
        } else if remainder.is_zero() {
            Outcome::Satisfied
        } else {
            Outcome::Partial
        };
        Self {
            product,
            source,
            requested,
            lines,
            remainder,
            outcome,
        }
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn source(&self) -> LocationId {
        self.source
    }

    pub fn requested(&self) -> Quantity {
        self.requested
    }

    pub fn lines(&self) -> &[AllocationLine] {
        &self.lines
    }

    pub fn remainder(&self) -> Quantity {
        self.remainder
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Quantity actually reserved on hand (fallback excluded).
    pub fn reserved(&self) -> Quantity {
        self.lines
            .iter()
            .filter(|l| !l.is_fallback())
            .map(|l| l.quantity)
            .sum()
    }

    /// Everything assigned somewhere, fallback included.
    pub fn assigned(&self) -> Quantity {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn fallback(&self) -> Option<&AllocationLine> {
        self.lines.iter().find(|l| l.is_fallback())
    }

    /// Quantity reservable once the demand is split: reserved lines plus what
    /// was free at the fallback location.
    pub fn covered(&self) -> Quantity {
        self.reserved() + self.fallback_available()
    }

    fn fallback_available(&self) -> Quantity {
        match self.fallback().map(|l| l.kind) {
            Some(LineKind::Fallback { available }) => available,
            _ => Quantity::ZERO,
        }
    }

    pub fn move_state(&self) -> MoveState {
        let covered = self.covered();
        if covered >= self.requested {
            MoveState::FullyReserved
        } else if covered.is_zero() {
            MoveState::Unreserved
        } else {
            MoveState::PartiallyReserved
        }
    }

    /// Split the demand into outbound records.
    ///
    /// Reserved lines are merged per location (first-seen order). The stock
    /// free at the fallback location is reserved there too, and only the rest
    /// of the fallback line waits there. Without a fallback the remainder
    /// waits at the demand's source location.
    pub fn outbound_records(&self) -> Vec<OutboundRecord> {
        let mut records: Vec<OutboundRecord> = Vec::new();
        for line in self.lines.iter().filter(|l| !l.is_fallback()) {
            reserve_at(&mut records, line.location, line.quantity);
        }

        let (waiting_at, waiting) = match self.fallback() {
            Some(fallback) => {
                let available = self.fallback_available();
                reserve_at(&mut records, fallback.location, available);
                (fallback.location, fallback.quantity.saturating_sub(available))
            }
            None => (self.source, self.remainder),
        };
        if !waiting.is_zero() {
            records.push(OutboundRecord {
                location: waiting_at,
                quantity: waiting,
                state: RecordState::Waiting,
            });
        }
        records
    }
}

fn reserve_at(records: &mut Vec<OutboundRecord>, location: LocationId, quantity: Quantity) {
    if quantity.is_zero() {
        return;
    }
    match records
        .iter_mut()
        .find(|r| r.location == location && r.state == RecordState::Reserved)
    {
        Some(record) => record.quantity += quantity,
        None => records.push(OutboundRecord {
            location,
            quantity,
            state: RecordState::Reserved,
        }),
    }
}

//! Transfer validator.
//!
//! Decides whether a transfer may commit, given the live placements the store
//! found for the requested primary ids. Unit attributes always come from those
//! placements, never from the caller.
//!
//! Every requested primary id must be matched by exactly one placement at the
//! claimed source warehouse. Anything else rejects the whole transfer:
//!
//! - unit not live anywhere
//! - unit live at a different warehouse
//! - primary id listed more than once in the request
//! - transfer dated before the unit arrived (would archive `date_in > date_out`)

use std::collections::{HashMap, HashSet};

use stockledger_core::{DocumentId, DomainError, DomainResult, PrimaryId};

use crate::command::TransferStock;
use crate::document::NewDocument;
use crate::stock::{HistoryEntry, LiveStockEntry, PlacedEntry};
use crate::unit::Unit;

/// Number of offending ids spelled out in a rejection message.
const MAX_LISTED: usize = 10;

/// Writes a validated transfer will perform, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub document: NewDocument,
    pub archived: Vec<HistoryEntry>,
    pub relocated: Vec<Unit>,
}

impl TransferPlan {
    pub fn primary_ids(&self) -> Vec<PrimaryId> {
        self.relocated.iter().map(|u| u.primary_id.clone()).collect()
    }

    /// New live entries, once the store has assigned the transfer document its id.
    pub fn live_entries(&self, document_id: DocumentId) -> Vec<LiveStockEntry> {
        self.relocated
            .iter()
            .cloned()
            .map(|unit| LiveStockEntry::place(document_id, unit))
            .collect()
    }
}

/// Validate a transfer against the placements found for its units.
///
/// `candidates` may contain placements at any warehouse; only those at the
/// command's source count as present.
pub fn plan_transfer(
    cmd: &TransferStock,
    candidates: &[PlacedEntry],
) -> DomainResult<TransferPlan> {
    let mut requested: HashSet<&PrimaryId> = HashSet::with_capacity(cmd.units.len());
    let repeated: Vec<&PrimaryId> = cmd.units.iter().filter(|id| !requested.insert(*id)).collect();
    if !repeated.is_empty() {
        return Err(DomainError::invalid_transfer(format!(
            "units listed more than once: {}",
            list_ids(&repeated)
        )));
    }

    let mut at_source: HashMap<&PrimaryId, &PlacedEntry> = HashMap::with_capacity(cmd.units.len());
    for placed in candidates
        .iter()
        .filter(|p| p.warehouse_id == cmd.source && requested.contains(&p.entry.primary_id))
    {
        if at_source.insert(&placed.entry.primary_id, placed).is_some() {
            return Err(DomainError::invalid_transfer(format!(
                "unit {} has more than one live placement",
                placed.entry.primary_id
            )));
        }
    }

    let missing: Vec<&PrimaryId> = cmd
        .units
        .iter()
        .filter(|id| !at_source.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::invalid_transfer(format!(
            "{} of {} units not in stock at warehouse {}: {}",
            missing.len(),
            cmd.units.len(),
            cmd.source,
            list_ids(&missing)
        )));
    }

    let mut archived = Vec::with_capacity(cmd.units.len());
    let mut relocated = Vec::with_capacity(cmd.units.len());
    for id in &cmd.units {
        let placed = at_source[id];
        if placed.date_in > cmd.effective_date {
            return Err(DomainError::invalid_transfer(format!(
                "unit {id} arrived at {} after the transfer date {}",
                placed.date_in, cmd.effective_date
            )));
        }
        archived.push(placed.archive(cmd.effective_date));
        relocated.push(placed.entry.unit());
    }

    Ok(TransferPlan {
        document: cmd.document(),
        archived,
        relocated,
    })
}

fn list_ids(ids: &[&PrimaryId]) -> String {
    let mut out = ids
        .iter()
        .take(MAX_LISTED)
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if ids.len() > MAX_LISTED {
        out.push_str(&format!(" (+{} more)", ids.len() - MAX_LISTED));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;
    use stockledger_core::{DocumentTypeId, ModelId, WarehouseId};

    fn pid(s: &str) -> PrimaryId {
        PrimaryId::parse(s).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(n)
    }

    fn placed(id: &str, warehouse: i64, date_in: DateTime<Utc>) -> PlacedEntry {
        PlacedEntry {
            entry: LiveStockEntry {
                document_id: DocumentId::new(10),
                model_id: ModelId::new(5),
                primary_id: pid(id),
                secondary_id: format!("S-{id}"),
                price: 100,
            },
            warehouse_id: WarehouseId::new(warehouse),
            date_in,
        }
    }

    fn transfer(from: i64, to: i64, date: DateTime<Utc>, ids: &[&str]) -> TransferStock {
        TransferStock {
            destination: WarehouseId::new(to),
            source: WarehouseId::new(from),
            effective_date: date,
            document_type: DocumentTypeId::new(2),
            units: ids.iter().map(|s| pid(s)).collect(),
        }
    }

    #[test]
    fn plans_archive_and_relocation_from_store_attributes() {
        let cmd = transfer(1, 2, day(3), &["A1"]);
        let plan = plan_transfer(&cmd, &[placed("A1", 1, day(1))]).unwrap();

        assert_eq!(plan.archived.len(), 1);
        let h = &plan.archived[0];
        assert_eq!(h.primary_id, pid("A1"));
        assert_eq!(h.document_id, DocumentId::new(10));
        assert_eq!(h.date_in, day(1));
        assert_eq!(h.date_out, day(3));

        let live = plan.live_entries(DocumentId::new(11));
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].document_id, DocumentId::new(11));
        assert_eq!(live[0].model_id, ModelId::new(5));
        assert_eq!(live[0].secondary_id, "S-A1");
        assert_eq!(live[0].price, 100);

        assert_eq!(plan.document.warehouse_id, WarehouseId::new(2));
        assert_eq!(plan.document.from_warehouse_id, Some(WarehouseId::new(1)));
    }

    #[test]
    fn unknown_unit_rejects_whole_transfer() {
        let cmd = transfer(1, 2, day(3), &["A1", "B9"]);
        let err = plan_transfer(&cmd, &[placed("A1", 1, day(1))]).unwrap_err();
        match err {
            DomainError::InvalidTransfer(msg) => {
                assert!(msg.contains("1 of 2"));
                assert!(msg.contains("B9"));
            }
            other => panic!("expected invalid transfer, got {other:?}"),
        }
    }

    #[test]
    fn unit_at_other_warehouse_is_not_present() {
        let cmd = transfer(3, 2, day(3), &["A1"]);
        let err = plan_transfer(&cmd, &[placed("A1", 1, day(1))]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransfer(_)));
    }

    #[test]
    fn repeated_unit_is_rejected_even_when_present() {
        let cmd = transfer(1, 2, day(3), &["A1", "A1"]);
        let err = plan_transfer(&cmd, &[placed("A1", 1, day(1))]).unwrap_err();
        match err {
            DomainError::InvalidTransfer(msg) => assert!(msg.contains("more than once")),
            other => panic!("expected invalid transfer, got {other:?}"),
        }
    }

    #[test]
    fn backdated_transfer_is_rejected() {
        let cmd = transfer(1, 2, day(0), &["A1"]);
        let err = plan_transfer(&cmd, &[placed("A1", 1, day(1))]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransfer(_)));
    }

    #[test]
    fn same_day_transfer_is_allowed() {
        let cmd = transfer(1, 2, day(1), &["A1"]);
        assert!(plan_transfer(&cmd, &[placed("A1", 1, day(1))]).is_ok());
    }

    #[test]
    fn double_placement_at_source_is_rejected() {
        let cmd = transfer(1, 2, day(3), &["A1"]);
        let stock = [placed("A1", 1, day(1)), placed("A1", 1, day(2))];
        let err = plan_transfer(&cmd, &stock).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransfer(_)));
    }

    #[test]
    fn long_rejections_are_truncated() {
        let ids: Vec<String> = (0..15).map(|i| format!("X{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let err = plan_transfer(&transfer(1, 2, day(3), &refs), &[]).unwrap_err();
        assert!(err.to_string().contains("(+5 more)"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a transfer commits iff every requested unit is live at the
        /// source exactly once, and then archives and relocates exactly those units.
        #[test]
        fn plan_matches_units_one_to_one(
            warehouses in prop::collection::vec(1i64..=3, 1..20),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
        ) {
            let stock: Vec<PlacedEntry> = warehouses
                .iter()
                .enumerate()
                .map(|(i, w)| placed(&format!("U{i}"), *w, day(0)))
                .collect();
            let requested: Vec<String> = picks
                .iter()
                .map(|ix| format!("U{}", ix.index(stock.len())))
                .collect();
            let refs: Vec<&str> = requested.iter().map(String::as_str).collect();
            let cmd = transfer(1, 2, day(1), &refs);

            let unique: HashSet<&String> = requested.iter().collect();
            let all_at_source = requested.iter().all(|id| {
                stock.iter().any(|p| {
                    p.entry.primary_id.as_str() == id && p.warehouse_id == WarehouseId::new(1)
                })
            });
            let should_commit = unique.len() == requested.len() && all_at_source;

            match plan_transfer(&cmd, &stock) {
                Ok(plan) => {
                    prop_assert!(should_commit);
                    prop_assert_eq!(plan.archived.len(), requested.len());
                    prop_assert_eq!(plan.relocated.len(), requested.len());
                    for (unit, id) in plan.relocated.iter().zip(&requested) {
                        prop_assert_eq!(unit.primary_id.as_str(), id.as_str());
                    }
                    for h in &plan.archived {
                        prop_assert!(h.date_in <= h.date_out);
                    }
                }
                Err(e) => {
                    prop_assert!(!should_commit);
                    prop_assert!(
                        matches!(e, DomainError::InvalidTransfer(_)),
                        "unexpected error kind: {:?}",
                        e
                    );
                }
            }
        }
    }
}

//! Ledger scenarios against the in-memory store.
//!
//! Tests: Command → StockLedger → StockStore → StockQuery
//!
//! Verifies:
//! - Receipts and transfers write the expected documents and placements
//! - Rejected transfers leave every table untouched
//! - Transfers conserve live stock and archive exactly one row per unit
//! - History is newest-first with `date_in <= date_out`
//! - Concurrent transfers of one unit serialise

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use stockledger_core::{DocumentTypeId, ModelId, PrimaryId, WarehouseId};
use stockledger_inventory::{GOODS_IN, ReceiveGoods, TRANSFER, TransferStock, Unit};

use crate::ledger::{LedgerError, StockLedger};
use crate::stock_store::{InMemoryStockStore, StockQuery};

const MAIN: WarehouseId = WarehouseId::new(1);
const SHOP: WarehouseId = WarehouseId::new(2);
const OUTLET: WarehouseId = WarehouseId::new(3);
const PHONE: ModelId = ModelId::new(5);
const TABLET: ModelId = ModelId::new(6);

fn d1() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
}

fn d2() -> DateTime<Utc> {
    d1() + Duration::days(10)
}

fn pid(s: &str) -> PrimaryId {
    PrimaryId::parse(s).unwrap()
}

fn setup() -> StockLedger<InMemoryStockStore> {
    StockLedger::new(
        InMemoryStockStore::new()
            .with_warehouse(MAIN, "Main")
            .with_warehouse(SHOP, "Shop")
            .with_warehouse(OUTLET, "Outlet")
            .with_model(PHONE, "Phone X")
            .with_model(TABLET, "Tablet Y"),
    )
}

fn receipt(
    warehouse: WarehouseId,
    date: DateTime<Utc>,
    units: &[(ModelId, &str, &str, i64)],
) -> ReceiveGoods {
    ReceiveGoods {
        destination: warehouse,
        source: None,
        effective_date: date,
        units: units
            .iter()
            .map(|(model, primary, secondary, price)| {
                Unit::new(*model, pid(primary), *secondary, *price)
            })
            .collect(),
    }
}

fn transfer(
    source: WarehouseId,
    destination: WarehouseId,
    date: DateTime<Utc>,
    ids: &[&str],
) -> TransferStock {
    TransferStock {
        destination,
        source,
        effective_date: date,
        document_type: TRANSFER,
        units: ids.iter().map(|id| pid(id)).collect(),
    }
}

async fn receive_a1(ledger: &StockLedger<InMemoryStockStore>) {
    ledger
        .receive_goods(receipt(MAIN, d1(), &[(PHONE, "A1", "S1", 100)]))
        .await
        .unwrap();
}

fn live_ids_at(ledger: &StockLedger<InMemoryStockStore>, warehouse: WarehouseId) -> Vec<String> {
    let store = ledger.projections();
    let docs = store.documents();
    let mut ids: Vec<String> = store
        .live_entries()
        .into_iter()
        .filter(|e| docs.iter().any(|d| d.id == e.document_id && d.warehouse_id == warehouse))
        .map(|e| e.primary_id.to_string())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn goods_in_creates_document_and_live_entry() {
    let ledger = setup();

    let doc = ledger
        .receive_goods(receipt(MAIN, d1(), &[(PHONE, "A1", "S1", 100)]))
        .await
        .unwrap();

    assert_eq!(doc.document_type_id, GOODS_IN);
    assert_eq!(doc.warehouse_id, MAIN);
    assert_eq!(doc.date, d1());

    let live = ledger.projections().live_entries();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].primary_id, pid("A1"));
    assert_eq!(live[0].document_id, doc.id);
}

#[tokio::test]
async fn transfer_relocates_unit_and_archives_previous_placement() {
    let ledger = setup();
    receive_a1(&ledger).await;

    let doc = ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["A1"]))
        .await
        .unwrap();
    assert_eq!(doc.warehouse_id, SHOP);
    assert_eq!(doc.from_warehouse_id, Some(MAIN));
    assert_eq!(doc.document_type_id, TRANSFER);

    assert!(live_ids_at(&ledger, MAIN).is_empty());
    assert_eq!(live_ids_at(&ledger, SHOP), vec!["A1".to_string()]);

    let live = ledger.projections().live_entries();
    assert_eq!(live[0].model_id, PHONE);
    assert_eq!(live[0].secondary_id, "S1");
    assert_eq!(live[0].price, 100);
    assert_eq!(live[0].document_id, doc.id);

    let history = ledger.projections().history_entries();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].primary_id, pid("A1"));
    assert_eq!(history[0].date_in, d1());
    assert_eq!(history[0].date_out, d2());
}

#[tokio::test]
async fn transfer_of_never_received_unit_changes_nothing() {
    let ledger = setup();
    receive_a1(&ledger).await;
    let docs_before = ledger.projections().documents();

    let err = ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["B9"]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidTransfer(_)));
    assert_eq!(ledger.projections().documents(), docs_before);
    assert_eq!(live_ids_at(&ledger, MAIN), vec!["A1".to_string()]);
    assert!(ledger.projections().history_entries().is_empty());
}

#[tokio::test]
async fn transfer_from_wrong_source_is_rejected() {
    let ledger = setup();
    receive_a1(&ledger).await;

    let err = ledger
        .transfer_stock(transfer(OUTLET, SHOP, d2(), &["A1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidTransfer(_)));
    assert_eq!(live_ids_at(&ledger, MAIN), vec!["A1".to_string()]);
    assert_eq!(ledger.projections().documents().len(), 1);
}

#[tokio::test]
async fn partial_transfer_is_all_or_nothing() {
    let ledger = setup();
    ledger
        .receive_goods(receipt(
            MAIN,
            d1(),
            &[(PHONE, "A1", "S1", 100), (PHONE, "A2", "S2", 100), (TABLET, "T1", "S3", 250)],
        ))
        .await
        .unwrap();
    let store = ledger.projections();
    let (live, history, docs) = (store.live_entries(), store.history_entries(), store.documents());

    let err = ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["A1", "A2", "ZZ"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransfer(_)));

    assert_eq!(store.live_entries(), live);
    assert_eq!(store.history_entries(), history);
    assert_eq!(store.documents(), docs);
}

#[tokio::test]
async fn repeated_unit_cannot_mask_a_missing_one() {
    let ledger = setup();
    ledger
        .receive_goods(receipt(MAIN, d1(), &[(PHONE, "A1", "S1", 100), (PHONE, "A2", "S2", 100)]))
        .await
        .unwrap();

    // Two ids listed, two live at source, but only one distinct unit requested.
    let err = ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["A1", "A1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransfer(_)));
    assert!(ledger.projections().history_entries().is_empty());
}

#[tokio::test]
async fn transfers_conserve_live_stock() {
    let ledger = setup();
    ledger
        .receive_goods(receipt(
            MAIN,
            d1(),
            &[(PHONE, "A1", "S1", 100), (PHONE, "A2", "S2", 100), (TABLET, "T1", "S3", 250)],
        ))
        .await
        .unwrap();

    let before = ledger.projections().live_entries().len();
    ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["A1", "T1"]))
        .await
        .unwrap();

    assert_eq!(ledger.projections().live_entries().len(), before);
    assert_eq!(ledger.projections().history_entries().len(), 2);
    assert_eq!(live_ids_at(&ledger, MAIN), vec!["A2".to_string()]);
    assert_eq!(live_ids_at(&ledger, SHOP), vec!["A1".to_string(), "T1".to_string()]);
}

#[tokio::test]
async fn unit_history_is_newest_first_with_ordered_dates() {
    let ledger = setup();
    receive_a1(&ledger).await;
    ledger
        .transfer_stock(transfer(MAIN, SHOP, d2(), &["A1"]))
        .await
        .unwrap();
    ledger
        .transfer_stock(transfer(SHOP, OUTLET, d2() + Duration::days(5), &["A1"]))
        .await
        .unwrap();

    let as_of = d2() + Duration::days(30);
    let history = ledger.projections().unit_history(&pid("A1"), as_of).await.unwrap();

    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].date_in >= w[1].date_in));
    for item in &history {
        if let Some(out) = item.date_out {
            assert!(item.date_in <= out);
        }
    }

    // Live placement first, open-ended.
    assert_eq!(history[0].warehouse_id, OUTLET);
    assert!(history[0].date_out.is_none());
    assert_eq!(history[0].in_stock_for, 25);
    assert_eq!(history[2].warehouse, "Main");
    assert_eq!(history[2].delivery_document_type, "Goods In");
    assert_eq!(history[2].in_stock_for, 10);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let ledger = setup();
    receive_a1(&ledger).await;
    ledger
        .receive_goods(receipt(SHOP, d2(), &[(TABLET, "T1", "S3", 250)]))
        .await
        .unwrap();

    let store = ledger.projections();
    let as_of = d2() + Duration::days(1);

    assert_eq!(
        store.warehouse_stock(MAIN, as_of).await.unwrap(),
        store.warehouse_stock(MAIN, as_of).await.unwrap()
    );
    assert_eq!(store.search("").await.unwrap(), store.search("").await.unwrap());
    assert_eq!(
        store.stock_by_model().await.unwrap(),
        store.stock_by_model().await.unwrap()
    );
    assert_eq!(
        store.recent_documents(10).await.unwrap(),
        store.recent_documents(10).await.unwrap()
    );
}

#[tokio::test]
async fn projections_report_live_stock() {
    let ledger = setup();
    ledger
        .receive_goods(receipt(
            MAIN,
            d1(),
            &[(PHONE, "A1", "S1", 100), (PHONE, "A2", "S2", 100)],
        ))
        .await
        .unwrap();
    ledger
        .receive_goods(receipt(SHOP, d2(), &[(TABLET, "T1", "IMEI-77", 250)]))
        .await
        .unwrap();
    let store = ledger.projections();
    let as_of = d2() + Duration::days(3);

    let main = store.warehouse_stock(MAIN, as_of).await.unwrap();
    assert_eq!(main.len(), 2);
    assert_eq!(main[0].primary_id, pid("A1"));
    assert_eq!(main[0].in_stock_for, 13);
    assert_eq!(main[0].model, "Phone X");

    // Phones have been in stock 13 days, nothing else qualifies.
    let aged = store.age_wise(PHONE, 7, as_of).await.unwrap();
    assert_eq!(aged.len(), 2);
    assert!(store.age_wise(TABLET, 7, as_of).await.unwrap().is_empty());

    let hits = store.search("imei-7").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].warehouse, "Shop");
    assert_eq!(store.search("shop").await.unwrap().len(), 1);
    assert_eq!(store.search("  ").await.unwrap().len(), 3);
    assert!(store.search("%").await.unwrap().is_empty());

    let by_model = store.stock_by_model().await.unwrap();
    assert_eq!(by_model.len(), 2);
    assert_eq!((by_model[0].name.as_str(), by_model[0].count), ("Phone X", 2));
    assert_eq!((by_model[1].name.as_str(), by_model[1].count), ("Tablet Y", 1));

    let by_warehouse = store.stock_by_warehouse().await.unwrap();
    assert_eq!(by_warehouse.len(), 2);
    assert_eq!(by_warehouse[0].name, "Main");

    let recent = store.recent_documents(1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].to_warehouse, "Shop");
    assert!(recent[0].from_warehouse.is_none());
}

#[tokio::test]
async fn unknown_document_type_is_a_validation_error() {
    let ledger = setup();
    receive_a1(&ledger).await;

    let mut cmd = transfer(MAIN, SHOP, d2(), &["A1"]);
    cmd.document_type = DocumentTypeId::new(42);
    let err = ledger.transfer_stock(cmd).await.unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(live_ids_at(&ledger, MAIN), vec!["A1".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_of_one_unit_serialise() {
    let ledger = Arc::new(setup());
    receive_a1(&ledger).await;

    let to_shop = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger.transfer_stock(transfer(MAIN, SHOP, d2(), &["A1"])).await
        })
    };
    let to_outlet = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger.transfer_stock(transfer(MAIN, OUTLET, d2(), &["A1"])).await
        })
    };

    let results = [to_shop.await.unwrap(), to_outlet.await.unwrap()];
    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(LedgerError::InvalidTransfer(_))))
    );

    assert_eq!(ledger.projections().live_entries().len(), 1);
    assert_eq!(ledger.projections().history_entries().len(), 1);
}

#[tokio::test]
async fn receipt_with_one_live_unit_is_all_or_nothing() {
    let ledger = setup();
    receive_a1(&ledger).await;

    let err = ledger
        .receive_goods(receipt(
            SHOP,
            d2(),
            &[(PHONE, "N1", "S9", 80), (PHONE, "A1", "S1", 100)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    let store = ledger.projections();
    assert_eq!(store.documents().len(), 1);
    assert_eq!(store.live_entries().len(), 1);
    assert_eq!(live_ids_at(&ledger, MAIN), vec!["A1"]);
    assert!(live_ids_at(&ledger, SHOP).is_empty());
    assert!(matches!(
        ledger.lookup_secondary_and_model(&pid("N1")).await,
        Err(LedgerError::NotFound)
    ));
}

#[tokio::test]
async fn age_beyond_calendar_range_matches_nothing() {
    let ledger = setup();
    receive_a1(&ledger).await;

    let aged = ledger
        .projections()
        .age_wise(PHONE, 1_000_000_000, d2())
        .await
        .unwrap();
    assert!(aged.is_empty());

    let aged = ledger.projections().age_wise(PHONE, i64::MAX, d2()).await.unwrap();
    assert!(aged.is_empty());
}

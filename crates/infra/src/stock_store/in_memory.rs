use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockledger_core::{DocumentId, DocumentTypeId, DomainError, ModelId, PrimaryId, WarehouseId};
use stockledger_inventory::{
    Document, GOODS_IN, HistoryEntry, LiveStockEntry, NewDocument, PlacedEntry, ReceiveGoods,
    TRANSFER, TransferStock, plan_transfer,
};

use super::query::{
    DocumentSummary, HistoryItem, SearchResultItem, StockCount, StockItem, StockQuery,
    age_cutoff, days_between,
};
use super::reference::{NamedRef, ReferenceStore, normalize_name};
use super::r#trait::{SecondaryAndModel, StockStore, StockStoreError};

#[derive(Debug, Default)]
struct Tables {
    documents: Vec<Document>,
    main_stock: Vec<LiveStockEntry>,
    stock_history: Vec<HistoryEntry>,
    models: BTreeMap<ModelId, String>,
    warehouses: BTreeMap<WarehouseId, String>,
    document_types: BTreeMap<DocumentTypeId, String>,
}

impl Tables {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        // Ids are assigned densely from 1.
        usize::try_from(id.get() - 1)
            .ok()
            .and_then(|ix| self.documents.get(ix))
            .filter(|d| d.id == id)
    }

    fn insert_document(&mut self, new: NewDocument) -> Document {
        let id = DocumentId::new(self.documents.len() as i64 + 1);
        let doc = new.with_id(id);
        self.documents.push(doc.clone());
        doc
    }

    fn placed(&self, entry: &LiveStockEntry) -> Result<PlacedEntry, StockStoreError> {
        let doc = self.document(entry.document_id).ok_or_else(|| {
            StockStoreError::Database(format!(
                "main_stock row {} references missing document {}",
                entry.primary_id, entry.document_id
            ))
        })?;
        Ok(PlacedEntry {
            entry: entry.clone(),
            warehouse_id: doc.warehouse_id,
            date_in: doc.date,
        })
    }

    fn check_references(&self, doc: &NewDocument) -> Result<(), DomainError> {
        if !self.document_types.contains_key(&doc.document_type_id) {
            return Err(DomainError::validation(format!(
                "unknown document type {}",
                doc.document_type_id
            )));
        }
        for warehouse in std::iter::once(doc.warehouse_id).chain(doc.from_warehouse_id) {
            if !self.warehouses.contains_key(&warehouse) {
                return Err(DomainError::validation(format!("unknown warehouse {warehouse}")));
            }
        }
        Ok(())
    }

    fn name_of<K: Ord>(map: &BTreeMap<K, String>, key: &K) -> String {
        map.get(key).cloned().unwrap_or_default()
    }

    fn stock_item(
        &self,
        placed: &PlacedEntry,
        as_of: DateTime<Utc>,
    ) -> Result<StockItem, StockStoreError> {
        let doc = self
            .document(placed.entry.document_id)
            .ok_or_else(|| StockStoreError::Database("dangling document reference".to_string()))?;
        Ok(StockItem {
            document_id: placed.entry.document_id,
            primary_id: placed.entry.primary_id.clone(),
            secondary_id: placed.entry.secondary_id.clone(),
            in_stock_for: days_between(placed.date_in, as_of),
            price: placed.entry.price,
            model: Self::name_of(&self.models, &placed.entry.model_id),
            date: placed.date_in,
            delivery_document_type: Self::name_of(&self.document_types, &doc.document_type_id),
        })
    }

    fn live_placements(&self) -> Result<Vec<PlacedEntry>, StockStoreError> {
        self.main_stock.iter().map(|e| self.placed(e)).collect()
    }
}

/// In-memory stock store.
///
/// Intended for tests/dev. Holds the write lock across validate + mutate,
/// so concurrent transfers of the same unit serialise. Writes are applied
/// only after every check has passed, which gives all-or-nothing commits.
///
/// Mirrors the Postgres schema's rules: unique live `primary_id`, and
/// documents/entries must reference known warehouses, models and document types.
#[derive(Debug)]
pub struct InMemoryStockStore {
    tables: RwLock<Tables>,
}

impl Default for InMemoryStockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStockStore {
    /// Empty store with the goods-in and transfer document types seeded.
    pub fn new() -> Self {
        let mut tables = Tables::default();
        tables.document_types.insert(GOODS_IN, "Goods In".to_string());
        tables.document_types.insert(TRANSFER, "Transfer".to_string());
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn with_warehouse(self, id: WarehouseId, name: impl Into<String>) -> Self {
        self.write_tables_unchecked().warehouses.insert(id, name.into());
        self
    }

    pub fn with_model(self, id: ModelId, name: impl Into<String>) -> Self {
        self.write_tables_unchecked().models.insert(id, name.into());
        self
    }

    pub fn with_document_type(self, id: DocumentTypeId, name: impl Into<String>) -> Self {
        self.write_tables_unchecked().document_types.insert(id, name.into());
        self
    }

    /// Snapshot of `main_stock`.
    pub fn live_entries(&self) -> Vec<LiveStockEntry> {
        self.read_tables().map(|t| t.main_stock.clone()).unwrap_or_default()
    }

    /// Snapshot of `stock_history`.
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.read_tables().map(|t| t.stock_history.clone()).unwrap_or_default()
    }

    /// Snapshot of `document`.
    pub fn documents(&self) -> Vec<Document> {
        self.read_tables().map(|t| t.documents.clone()).unwrap_or_default()
    }

    fn read_tables(&self) -> Result<RwLockReadGuard<'_, Tables>, StockStoreError> {
        self.tables
            .read()
            .map_err(|_| StockStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write_tables(&self) -> Result<RwLockWriteGuard<'_, Tables>, StockStoreError> {
        self.tables
            .write()
            .map_err(|_| StockStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write_tables_unchecked(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn receive_goods(&self, cmd: &ReceiveGoods) -> Result<Document, StockStoreError> {
        let mut tables = self.write_tables()?;

        let new_doc = cmd.document();
        tables.check_references(&new_doc)?;

        // Units of this receipt join the set as they are checked, so a repeat
        // within one command conflicts like an already-live unit.
        let mut live: HashSet<&PrimaryId> =
            tables.main_stock.iter().map(|e| &e.primary_id).collect();
        for unit in &cmd.units {
            if !tables.models.contains_key(&unit.model_id) {
                return Err(
                    DomainError::validation(format!("unknown model {}", unit.model_id)).into(),
                );
            }
            if !live.insert(&unit.primary_id) {
                return Err(DomainError::conflict(format!(
                    "unit {} is already in stock",
                    unit.primary_id
                ))
                .into());
            }
        }
        drop(live);

        let doc = tables.insert_document(new_doc);
        tables.main_stock.extend(
            cmd.units
                .iter()
                .cloned()
                .map(|unit| LiveStockEntry::place(doc.id, unit)),
        );
        Ok(doc)
    }

    async fn transfer_stock(&self, cmd: &TransferStock) -> Result<Document, StockStoreError> {
        let mut tables = self.write_tables()?;

        let requested: HashSet<&PrimaryId> = cmd.units.iter().collect();
        let candidates = tables
            .main_stock
            .iter()
            .filter(|e| requested.contains(&e.primary_id))
            .map(|e| tables.placed(e))
            .collect::<Result<Vec<_>, _>>()?;

        let plan = plan_transfer(cmd, &candidates)?;
        tables.check_references(&plan.document)?;

        let moved: HashSet<PrimaryId> = plan.primary_ids().into_iter().collect();
        tables.stock_history.extend(plan.archived.iter().cloned());
        let doc = tables.insert_document(plan.document.clone());
        tables.main_stock.retain(|e| !moved.contains(&e.primary_id));
        tables.main_stock.extend(plan.live_entries(doc.id));
        Ok(doc)
    }

    async fn lookup_secondary_and_model(
        &self,
        primary_id: &PrimaryId,
    ) -> Result<SecondaryAndModel, StockStoreError> {
        let tables = self.read_tables()?;
        let entry = tables
            .main_stock
            .iter()
            .find(|e| &e.primary_id == primary_id)
            .ok_or(StockStoreError::NotFound)?;
        let model_name = tables
            .models
            .get(&entry.model_id)
            .cloned()
            .ok_or_else(|| StockStoreError::Database(format!("unknown model {}", entry.model_id)))?;
        Ok(SecondaryAndModel {
            secondary_id: entry.secondary_id.clone(),
            model_name,
        })
    }
}

#[async_trait]
impl StockQuery for InMemoryStockStore {
    async fn warehouse_stock(
        &self,
        warehouse_id: WarehouseId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        let tables = self.read_tables()?;
        let mut placed: Vec<PlacedEntry> = tables
            .live_placements()?
            .into_iter()
            .filter(|p| p.warehouse_id == warehouse_id)
            .collect();
        placed.sort_by(|a, b| {
            (a.date_in, &a.entry.primary_id).cmp(&(b.date_in, &b.entry.primary_id))
        });
        placed.iter().map(|p| tables.stock_item(p, as_of)).collect()
    }

    async fn age_wise(
        &self,
        model_id: ModelId,
        min_age_days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        let Some(cutoff) = age_cutoff(as_of, min_age_days) else {
            return Ok(Vec::new());
        };
        let tables = self.read_tables()?;
        let mut placed: Vec<PlacedEntry> = tables
            .live_placements()?
            .into_iter()
            .filter(|p| p.entry.model_id == model_id && p.date_in <= cutoff)
            .collect();
        placed.sort_by(|a, b| {
            (a.date_in, &a.entry.primary_id).cmp(&(b.date_in, &b.entry.primary_id))
        });
        placed.iter().map(|p| tables.stock_item(p, as_of)).collect()
    }

    async fn search(&self, token: &str) -> Result<Vec<SearchResultItem>, StockStoreError> {
        let needle = token.trim().to_lowercase();
        let tables = self.read_tables()?;
        let mut out: Vec<SearchResultItem> = tables
            .live_placements()?
            .into_iter()
            .map(|p| SearchResultItem {
                document_id: p.entry.document_id,
                model: Tables::name_of(&tables.models, &p.entry.model_id),
                warehouse: Tables::name_of(&tables.warehouses, &p.warehouse_id),
                primary_id: p.entry.primary_id,
                secondary_id: p.entry.secondary_id,
                price: p.entry.price,
                warehouse_id: p.warehouse_id,
            })
            .filter(|item| {
                needle.is_empty()
                    || [
                        item.primary_id.as_str(),
                        item.secondary_id.as_str(),
                        item.model.as_str(),
                        item.warehouse.as_str(),
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();
        out.sort_by(|a, b| (&a.model, &a.primary_id).cmp(&(&b.model, &b.primary_id)));
        Ok(out)
    }

    async fn unit_history(
        &self,
        primary_id: &PrimaryId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<HistoryItem>, StockStoreError> {
        let tables = self.read_tables()?;
        let item = |document_id: DocumentId,
                    model_id: ModelId,
                    secondary_id: &str,
                    price: i64,
                    date_in: DateTime<Utc>,
                    date_out: Option<DateTime<Utc>>|
         -> Result<HistoryItem, StockStoreError> {
            let doc = tables.document(document_id).ok_or_else(|| {
                StockStoreError::Database(format!(
                    "history references missing document {document_id}"
                ))
            })?;
            Ok(HistoryItem {
                document_id,
                primary_id: primary_id.clone(),
                secondary_id: secondary_id.to_string(),
                in_stock_for: days_between(date_in, date_out.unwrap_or(as_of)),
                price,
                date_in,
                date_out,
                delivery_document_type: Tables::name_of(
                    &tables.document_types,
                    &doc.document_type_id,
                ),
                warehouse: Tables::name_of(&tables.warehouses, &doc.warehouse_id),
                warehouse_id: doc.warehouse_id,
                model: Tables::name_of(&tables.models, &model_id),
            })
        };

        let mut out = Vec::new();
        for e in tables.main_stock.iter().filter(|e| &e.primary_id == primary_id) {
            let date_in = tables.placed(e)?.date_in;
            out.push(item(e.document_id, e.model_id, &e.secondary_id, e.price, date_in, None)?);
        }
        for h in tables.stock_history.iter().filter(|h| &h.primary_id == primary_id) {
            out.push(item(
                h.document_id,
                h.model_id,
                &h.secondary_id,
                h.price,
                h.date_in,
                Some(h.date_out),
            )?);
        }
        out.sort_by(|a, b| (b.date_in, b.document_id).cmp(&(a.date_in, a.document_id)));
        Ok(out)
    }

    async fn stock_by_model(&self) -> Result<Vec<StockCount>, StockStoreError> {
        let tables = self.read_tables()?;
        let mut counts: BTreeMap<ModelId, i64> = BTreeMap::new();
        for e in &tables.main_stock {
            *counts.entry(e.model_id).or_default() += 1;
        }
        let mut out: Vec<StockCount> = counts
            .into_iter()
            .map(|(id, count)| StockCount {
                id: id.get(),
                name: Tables::name_of(&tables.models, &id),
                count,
            })
            .collect();
        out.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(out)
    }

    async fn stock_by_warehouse(&self) -> Result<Vec<StockCount>, StockStoreError> {
        let tables = self.read_tables()?;
        let mut counts: BTreeMap<WarehouseId, i64> = BTreeMap::new();
        for p in tables.live_placements()? {
            *counts.entry(p.warehouse_id).or_default() += 1;
        }
        let mut out: Vec<StockCount> = counts
            .into_iter()
            .map(|(id, count)| StockCount {
                id: id.get(),
                name: Tables::name_of(&tables.warehouses, &id),
                count,
            })
            .collect();
        out.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(out)
    }

    async fn recent_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>, StockStoreError> {
        let tables = self.read_tables()?;
        let mut docs: Vec<&Document> = tables.documents.iter().collect();
        docs.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(docs
            .into_iter()
            .take(limit as usize)
            .map(|d| DocumentSummary {
                document_id: d.id,
                document_type: Tables::name_of(&tables.document_types, &d.document_type_id),
                date: d.date,
                to_warehouse_id: d.warehouse_id,
                to_warehouse: Tables::name_of(&tables.warehouses, &d.warehouse_id),
                from_warehouse_id: d.from_warehouse_id,
                from_warehouse: d
                    .from_warehouse_id
                    .map(|w| Tables::name_of(&tables.warehouses, &w)),
            })
            .collect())
    }
}

#[async_trait]
impl ReferenceStore for InMemoryStockStore {
    async fn create_warehouse(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        let name = normalize_name(name)?;
        let mut tables = self.write_tables()?;
        let id = tables.warehouses.keys().last().map_or(1, |w| w.get() + 1);
        tables.warehouses.insert(WarehouseId::new(id), name.clone());
        Ok(NamedRef { id, name })
    }

    async fn create_model(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        let name = normalize_name(name)?;
        let mut tables = self.write_tables()?;
        let id = tables.models.keys().last().map_or(1, |m| m.get() + 1);
        tables.models.insert(ModelId::new(id), name.clone());
        Ok(NamedRef { id, name })
    }

    async fn warehouses(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        let tables = self.read_tables()?;
        Ok(sorted_refs(tables.warehouses.iter().map(|(id, name)| (id.get(), name))))
    }

    async fn models(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        let tables = self.read_tables()?;
        Ok(sorted_refs(tables.models.iter().map(|(id, name)| (id.get(), name))))
    }
}

fn sorted_refs<'a>(rows: impl Iterator<Item = (i64, &'a String)>) -> Vec<NamedRef> {
    let mut out: Vec<NamedRef> = rows
        .map(|(id, name)| NamedRef {
            id,
            name: name.clone(),
        })
        .collect();
    out.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
    out
}

//! Postgres-backed stock store.
//!
//! Every mutating operation runs in one `sqlx::Transaction`. A transaction
//! that is dropped without `commit()` (early return, error, cancelled future)
//! is rolled back by sqlx, so no partial write is ever observable.
//!
//! ## Transfer locking
//!
//! `transfer_stock` reads the candidate `main_stock` rows with
//! `SELECT ... FOR UPDATE OF ms`. A concurrent transfer of the same unit blocks
//! on that lock; once the first commits, the unit's row is gone and the second
//! transfer sees it as missing at the source, failing validation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StockStoreError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Rejected(Conflict)` |
//! | Database (foreign key violation) | `23503` | `Rejected(Validation)` |
//! | Database (query canceled / statement timeout) | `57014` | `Unavailable` |
//! | Database (other) | any other | `Database` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | Other | N/A | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Executor, FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{Span, field, instrument};

use stockledger_core::{DocumentId, DomainError, ModelId, PrimaryId, WarehouseId};
use stockledger_inventory::{
    Document, LiveStockEntry, NewDocument, PlacedEntry, ReceiveGoods, TransferStock, plan_transfer,
};

use crate::config::StoreConfig;

use super::query::{
    DocumentSummary, HistoryItem, SearchResultItem, StockCount, StockItem, StockQuery,
    age_cutoff, days_between,
};
use super::reference::{NamedRef, ReferenceStore, normalize_name};
use super::r#trait::{SecondaryAndModel, StockStore, StockStoreError};

/// Postgres-backed stock store.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: Arc<PgPool>,
}

impl PostgresStockStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool as described by `config`.
    ///
    /// Every pooled session gets `statement_timeout` applied so that a stuck
    /// statement aborts (and rolls back) instead of holding row locks forever.
    pub async fn connect(
        config: &StoreConfig,
        database_url: &str,
    ) -> Result<Self, StockStoreError> {
        let statement_timeout_ms = config.statement_timeout.as_millis();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(format!("SET statement_timeout = {statement_timeout_ms}").as_str())
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StockStoreError> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| StockStoreError::Database(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StockStore for PostgresStockStore {
    #[instrument(
        skip(self, cmd),
        fields(
            destination = %cmd.destination,
            unit_count = cmd.units.len(),
            document_id = field::Empty,
        ),
        err
    )]
    async fn receive_goods(&self, cmd: &ReceiveGoods) -> Result<Document, StockStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let doc = insert_document(&mut tx, cmd.document()).await?;

        for unit in &cmd.units {
            insert_live_entry(&mut tx, &LiveStockEntry::place(doc.id, unit.clone()))
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StockStoreError::Rejected(DomainError::conflict(format!(
                            "unit {} is already in stock",
                            unit.primary_id
                        )))
                    } else {
                        map_sqlx_error("insert_main_stock", e)
                    }
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("document_id", doc.id.get());
        Ok(doc)
    }

    #[instrument(
        skip(self, cmd),
        fields(
            source = %cmd.source,
            destination = %cmd.destination,
            unit_count = cmd.units.len(),
            document_id = field::Empty,
        ),
        err
    )]
    async fn transfer_stock(&self, cmd: &TransferStock) -> Result<Document, StockStoreError> {
        let ids: Vec<String> = cmd.units.iter().map(|p| p.as_str().to_owned()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // 1) Candidates at the source, locked until commit/rollback.
        let rows = sqlx::query(
            r#"
            SELECT
                ms.document_id,
                ms.model_id,
                ms.primary_id,
                ms.secondary_id,
                ms.price,
                d.warehouse_id,
                d.date
            FROM main_stock ms
            JOIN document d ON d.id = ms.document_id
            WHERE ms.primary_id = ANY($1)
              AND d.warehouse_id = $2
            FOR UPDATE OF ms
            "#,
        )
        .bind(&ids)
        .bind(cmd.source.get())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("select_candidates", e))?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let placed = PlacedRow::from_row(row).map_err(decode_error)?;
            candidates.push(PlacedEntry::try_from(placed)?);
        }

        // 2) Decide. Nothing has been written yet.
        let plan = match plan_transfer(cmd, &candidates) {
            Ok(plan) => plan,
            Err(rejection) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(rejection.into());
            }
        };

        // 3) Archive current placements.
        for h in &plan.archived {
            sqlx::query(
                r#"
                INSERT INTO stock_history (
                    document_id,
                    model_id,
                    primary_id,
                    secondary_id,
                    price,
                    date_in,
                    date_out
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(h.document_id.get())
            .bind(h.model_id.get())
            .bind(h.primary_id.as_str())
            .bind(&h.secondary_id)
            .bind(h.price)
            .bind(h.date_in)
            .bind(h.date_out)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_stock_history", e))?;
        }

        // 4) New placement document.
        let doc = insert_document(&mut tx, plan.document.clone()).await?;

        // 5) Relocate.
        let deleted = sqlx::query("DELETE FROM main_stock WHERE primary_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_main_stock", e))?
            .rows_affected();
        if deleted != plan.relocated.len() as u64 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StockStoreError::Database(format!(
                "expected to remove {} main_stock rows, removed {deleted}",
                plan.relocated.len()
            )));
        }

        for entry in plan.live_entries(doc.id) {
            insert_live_entry(&mut tx, &entry)
                .await
                .map_err(|e| map_sqlx_error("insert_main_stock", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("document_id", doc.id.get());
        Ok(doc)
    }

    #[instrument(skip(self), err)]
    async fn lookup_secondary_and_model(
        &self,
        primary_id: &PrimaryId,
    ) -> Result<SecondaryAndModel, StockStoreError> {
        let row = sqlx::query(
            r#"
            SELECT ms.secondary_id, m.name AS model_name
            FROM main_stock ms
            JOIN model m ON m.id = ms.model_id
            WHERE ms.primary_id = $1
            "#,
        )
        .bind(primary_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("lookup_secondary_and_model", e))?
        .ok_or(StockStoreError::NotFound)?;

        Ok(SecondaryAndModel {
            secondary_id: row.try_get("secondary_id").map_err(decode_error)?,
            model_name: row.try_get("model_name").map_err(decode_error)?,
        })
    }
}

#[async_trait]
impl StockQuery for PostgresStockStore {
    #[instrument(skip(self), err)]
    async fn warehouse_stock(
        &self,
        warehouse_id: WarehouseId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        let rows = sqlx::query(&format!(
            "{STOCK_ITEM_SELECT} WHERE d.warehouse_id = $1 ORDER BY d.date ASC, ms.primary_id ASC"
        ))
        .bind(warehouse_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("warehouse_stock", e))?;

        decode_stock_items(&rows, as_of)
    }

    #[instrument(skip(self), err)]
    async fn age_wise(
        &self,
        model_id: ModelId,
        min_age_days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        let Some(cutoff) = age_cutoff(as_of, min_age_days) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(&format!(
            "{STOCK_ITEM_SELECT} WHERE ms.model_id = $1 AND d.date <= $2 \
             ORDER BY d.date ASC, ms.primary_id ASC"
        ))
        .bind(model_id.get())
        .bind(cutoff)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("age_wise", e))?;

        decode_stock_items(&rows, as_of)
    }

    #[instrument(skip(self), err)]
    async fn search(&self, token: &str) -> Result<Vec<SearchResultItem>, StockStoreError> {
        let token = token.trim();
        // strpos() rather than LIKE: the token is matched literally, never as a pattern.
        let rows = sqlx::query(
            r#"
            SELECT
                ms.document_id,
                m.name AS model,
                w.name AS warehouse,
                ms.primary_id,
                ms.secondary_id,
                ms.price,
                d.warehouse_id
            FROM main_stock ms
            JOIN document d ON d.id = ms.document_id
            JOIN model m ON m.id = ms.model_id
            JOIN warehouse w ON w.id = d.warehouse_id
            WHERE $1 = ''
               OR strpos(lower(ms.primary_id), lower($1)) > 0
               OR strpos(lower(ms.secondary_id), lower($1)) > 0
               OR strpos(lower(m.name), lower($1)) > 0
               OR strpos(lower(w.name), lower($1)) > 0
            ORDER BY m.name ASC, ms.primary_id ASC
            "#,
        )
        .bind(token)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search", e))?;

        rows.iter()
            .map(|row| {
                Ok(SearchResultItem {
                    document_id: DocumentId::new(row.try_get("document_id").map_err(decode_error)?),
                    model: row.try_get("model").map_err(decode_error)?,
                    warehouse: row.try_get("warehouse").map_err(decode_error)?,
                    primary_id: decode_primary_id(row)?,
                    secondary_id: row.try_get("secondary_id").map_err(decode_error)?,
                    price: row.try_get("price").map_err(decode_error)?,
                    warehouse_id: WarehouseId::new(
                        row.try_get("warehouse_id").map_err(decode_error)?,
                    ),
                })
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn unit_history(
        &self,
        primary_id: &PrimaryId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<HistoryItem>, StockStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM (
                SELECT
                    ms.document_id,
                    ms.primary_id,
                    ms.secondary_id,
                    ms.price,
                    d.date AS date_in,
                    NULL::timestamptz AS date_out,
                    dt.name AS document_type,
                    w.name AS warehouse,
                    d.warehouse_id,
                    m.name AS model
                FROM main_stock ms
                JOIN document d ON d.id = ms.document_id
                JOIN document_type dt ON dt.id = d.document_type_id
                JOIN warehouse w ON w.id = d.warehouse_id
                JOIN model m ON m.id = ms.model_id
                WHERE ms.primary_id = $1
                UNION ALL
                SELECT
                    sh.document_id,
                    sh.primary_id,
                    sh.secondary_id,
                    sh.price,
                    sh.date_in,
                    sh.date_out,
                    dt.name AS document_type,
                    w.name AS warehouse,
                    d.warehouse_id,
                    m.name AS model
                FROM stock_history sh
                JOIN document d ON d.id = sh.document_id
                JOIN document_type dt ON dt.id = d.document_type_id
                JOIN warehouse w ON w.id = d.warehouse_id
                JOIN model m ON m.id = sh.model_id
                WHERE sh.primary_id = $1
            ) h
            ORDER BY h.date_in DESC, h.document_id DESC
            "#,
        )
        .bind(primary_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("unit_history", e))?;

        rows.iter()
            .map(|row| {
                let date_in: DateTime<Utc> = row.try_get("date_in").map_err(decode_error)?;
                let date_out: Option<DateTime<Utc>> =
                    row.try_get("date_out").map_err(decode_error)?;
                Ok(HistoryItem {
                    document_id: DocumentId::new(row.try_get("document_id").map_err(decode_error)?),
                    primary_id: decode_primary_id(row)?,
                    secondary_id: row.try_get("secondary_id").map_err(decode_error)?,
                    in_stock_for: days_between(date_in, date_out.unwrap_or(as_of)),
                    price: row.try_get("price").map_err(decode_error)?,
                    date_in,
                    date_out,
                    delivery_document_type: row.try_get("document_type").map_err(decode_error)?,
                    warehouse: row.try_get("warehouse").map_err(decode_error)?,
                    warehouse_id: WarehouseId::new(
                        row.try_get("warehouse_id").map_err(decode_error)?,
                    ),
                    model: row.try_get("model").map_err(decode_error)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn stock_by_model(&self) -> Result<Vec<StockCount>, StockStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.name, COUNT(*) AS count
            FROM main_stock ms
            JOIN model m ON m.id = ms.model_id
            GROUP BY m.id, m.name
            ORDER BY m.name ASC, m.id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("stock_by_model", e))?;

        decode_counts(&rows)
    }

    #[instrument(skip(self), err)]
    async fn stock_by_warehouse(&self) -> Result<Vec<StockCount>, StockStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.name, COUNT(*) AS count
            FROM main_stock ms
            JOIN document d ON d.id = ms.document_id
            JOIN warehouse w ON w.id = d.warehouse_id
            GROUP BY w.id, w.name
            ORDER BY w.name ASC, w.id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("stock_by_warehouse", e))?;

        decode_counts(&rows)
    }

    #[instrument(skip(self), err)]
    async fn recent_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>, StockStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                d.id,
                dt.name AS document_type,
                d.date,
                d.warehouse_id,
                tw.name AS to_warehouse,
                d.from_warehouse_id,
                fw.name AS from_warehouse
            FROM document d
            JOIN document_type dt ON dt.id = d.document_type_id
            JOIN warehouse tw ON tw.id = d.warehouse_id
            LEFT JOIN warehouse fw ON fw.id = d.from_warehouse_id
            ORDER BY d.date DESC, d.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_documents", e))?;

        rows.iter()
            .map(|row| {
                let from: Option<i64> = row.try_get("from_warehouse_id").map_err(decode_error)?;
                Ok(DocumentSummary {
                    document_id: DocumentId::new(row.try_get("id").map_err(decode_error)?),
                    document_type: row.try_get("document_type").map_err(decode_error)?,
                    date: row.try_get("date").map_err(decode_error)?,
                    to_warehouse_id: WarehouseId::new(
                        row.try_get("warehouse_id").map_err(decode_error)?,
                    ),
                    to_warehouse: row.try_get("to_warehouse").map_err(decode_error)?,
                    from_warehouse_id: from.map(WarehouseId::new),
                    from_warehouse: row.try_get("from_warehouse").map_err(decode_error)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ReferenceStore for PostgresStockStore {
    #[instrument(skip(self), err)]
    async fn create_warehouse(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        self.insert_named("warehouse", &normalize_name(name)?).await
    }

    #[instrument(skip(self), err)]
    async fn create_model(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        self.insert_named("model", &normalize_name(name)?).await
    }

    async fn warehouses(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        self.list_named("warehouse").await
    }

    async fn models(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        self.list_named("model").await
    }
}

impl PostgresStockStore {
    // `table` is always one of the fixed reference table names above.
    async fn insert_named(
        &self,
        table: &'static str,
        name: &str,
    ) -> Result<NamedRef, StockStoreError> {
        let row = sqlx::query(&format!("INSERT INTO {table} (name) VALUES ($1) RETURNING id, name"))
            .bind(name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;
        decode_named(&row)
    }

    async fn list_named(&self, table: &'static str) -> Result<Vec<NamedRef>, StockStoreError> {
        let rows = sqlx::query(&format!("SELECT id, name FROM {table} ORDER BY name ASC, id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;
        rows.iter().map(decode_named).collect()
    }
}

const STOCK_ITEM_SELECT: &str = r#"
    SELECT
        ms.document_id,
        ms.primary_id,
        ms.secondary_id,
        ms.price,
        m.name AS model,
        d.date,
        dt.name AS document_type
    FROM main_stock ms
    JOIN document d ON d.id = ms.document_id
    JOIN document_type dt ON dt.id = d.document_type_id
    JOIN model m ON m.id = ms.model_id
"#;

async fn insert_document(
    tx: &mut Transaction<'_, Postgres>,
    new: NewDocument,
) -> Result<Document, StockStoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO document (
            document_type_id,
            warehouse_id,
            from_warehouse_id,
            date
        )
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(new.document_type_id.get())
    .bind(new.warehouse_id.get())
    .bind(new.from_warehouse_id.map(WarehouseId::get))
    .bind(new.date)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_document", e))?;

    let id: i64 = row.try_get("id").map_err(decode_error)?;
    Ok(new.with_id(DocumentId::new(id)))
}

async fn insert_live_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: &LiveStockEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO main_stock (
            document_id,
            model_id,
            primary_id,
            secondary_id,
            price
        )
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(entry.document_id.get())
    .bind(entry.model_id.get())
    .bind(entry.primary_id.as_str())
    .bind(&entry.secondary_id)
    .bind(entry.price)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn decode_stock_items(
    rows: &[PgRow],
    as_of: DateTime<Utc>,
) -> Result<Vec<StockItem>, StockStoreError> {
    rows.iter()
        .map(|row| {
            let date: DateTime<Utc> = row.try_get("date").map_err(decode_error)?;
            Ok(StockItem {
                document_id: DocumentId::new(row.try_get("document_id").map_err(decode_error)?),
                primary_id: decode_primary_id(row)?,
                secondary_id: row.try_get("secondary_id").map_err(decode_error)?,
                in_stock_for: days_between(date, as_of),
                price: row.try_get("price").map_err(decode_error)?,
                model: row.try_get("model").map_err(decode_error)?,
                date,
                delivery_document_type: row.try_get("document_type").map_err(decode_error)?,
            })
        })
        .collect()
}

fn decode_counts(rows: &[PgRow]) -> Result<Vec<StockCount>, StockStoreError> {
    rows.iter()
        .map(|row| {
            Ok(StockCount {
                id: row.try_get("id").map_err(decode_error)?,
                name: row.try_get("name").map_err(decode_error)?,
                count: row.try_get("count").map_err(decode_error)?,
            })
        })
        .collect()
}

fn decode_named(row: &PgRow) -> Result<NamedRef, StockStoreError> {
    Ok(NamedRef {
        id: row.try_get("id").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
    })
}

fn decode_primary_id(row: &PgRow) -> Result<PrimaryId, StockStoreError> {
    let raw: String = row.try_get("primary_id").map_err(decode_error)?;
    PrimaryId::parse(raw).map_err(|e| StockStoreError::Decode(e.to_string()))
}

fn decode_error(err: sqlx::Error) -> StockStoreError {
    StockStoreError::Decode(err.to_string())
}

/// Map SQLx errors to StockStoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StockStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StockStoreError::Rejected(DomainError::conflict(msg)),
                Some("23503") => StockStoreError::Rejected(DomainError::validation(format!(
                    "unknown reference in {operation}: {}",
                    db_err.constraint().unwrap_or("foreign key")
                ))),
                Some("57014") => StockStoreError::Unavailable(msg),
                _ => StockStoreError::Database(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StockStoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StockStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => StockStoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::RowNotFound => {
            StockStoreError::Database(format!("unexpected row not found in {operation}"))
        }
        _ => StockStoreError::Database(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23505");
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct PlacedRow {
    document_id: i64,
    model_id: i64,
    primary_id: String,
    secondary_id: String,
    price: i64,
    warehouse_id: i64,
    date: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PlacedRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PlacedRow {
            document_id: row.try_get("document_id")?,
            model_id: row.try_get("model_id")?,
            primary_id: row.try_get("primary_id")?,
            secondary_id: row.try_get("secondary_id")?,
            price: row.try_get("price")?,
            warehouse_id: row.try_get("warehouse_id")?,
            date: row.try_get("date")?,
        })
    }
}

impl TryFrom<PlacedRow> for PlacedEntry {
    type Error = StockStoreError;

    fn try_from(row: PlacedRow) -> Result<Self, Self::Error> {
        Ok(PlacedEntry {
            entry: LiveStockEntry {
                document_id: DocumentId::new(row.document_id),
                model_id: ModelId::new(row.model_id),
                primary_id: PrimaryId::parse(row.primary_id)
                    .map_err(|e| StockStoreError::Decode(e.to_string()))?,
                secondary_id: row.secondary_id,
                price: row.price,
            },
            warehouse_id: WarehouseId::new(row.warehouse_id),
            date_in: row.date,
        })
    }
}

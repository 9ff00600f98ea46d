//! # Food Repository
//!
//! Database operations for inventory items.
//!
//! ## Key Operations
//! - Insert a new record (id and timestamp assigned here), or a batch in
//!   one transaction
//! - Filtered, paged search with a total count
//! - Delete by id, or every record sharing a barcode
//! - Expiring-soon and low-stock views
//!
//! ## List Columns
//! ```text
//! FoodRecord.category  ["Spreads", "Sweet spreads"]
//!        │  serde_json::to_string
//!        ▼
//! food_items.category  '["Spreads","Sweet spreads"]'
//! ```
//! `category` and `allergens` are stored as JSON arrays and decoded on the
//! way out. A value that no longer parses surfaces as [`DbError::Decode`].

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::query::{FoodQuery, FOOD_COLUMNS};
use pantry_core::{
    build_search_key, DeleteSelector, FoodRecord, NewFoodRecord, SearchFilters, SearchPage,
};

/// Storage format for `created_at`. Fixed width, so text order is time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Storage format for `expiry_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Row Mapping
// =============================================================================

/// A `food_items` row as SQLite returns it.
#[derive(Debug, sqlx::FromRow)]
struct FoodRow {
    id: String,
    barcode: String,
    name: String,
    brand: Option<String>,
    category: String,
    calories: Option<i64>,
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
    fiber: Option<f64>,
    sugars: Option<f64>,
    sodium: Option<f64>,
    allergens: String,
    image_url: Option<String>,
    expiry_date: Option<String>,
    quantity: i64,
    location: Option<String>,
    created_at: String,
}

impl TryFrom<FoodRow> for FoodRecord {
    type Error = DbError;

    fn try_from(row: FoodRow) -> DbResult<Self> {
        let category: Vec<String> =
            serde_json::from_str(&row.category).map_err(|e| DbError::decode("category", e))?;
        let allergens: Vec<String> =
            serde_json::from_str(&row.allergens).map_err(|e| DbError::decode("allergens", e))?;

        let expiry_date = row
            .expiry_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()
            .map_err(|e| DbError::decode("expiry_date", e))?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| DbError::decode("created_at", e))?
            .with_timezone(&Utc);

        Ok(FoodRecord {
            id: row.id,
            barcode: row.barcode,
            name: row.name,
            brand: row.brand,
            category,
            calories: row.calories,
            protein: row.protein,
            fat: row.fat,
            carbs: row.carbs,
            fiber: row.fiber,
            sugars: row.sugars,
            sodium: row.sodium,
            allergens,
            image_url: row.image_url,
            expiry_date,
            quantity: row.quantity,
            location: row.location,
            created_at,
        })
    }
}

fn into_records(rows: Vec<FoodRow>) -> DbResult<Vec<FoodRecord>> {
    rows.into_iter().map(FoodRecord::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = FoodRepository::new(pool);
///
/// let record = repo.insert(new_record).await?;
/// let page = repo.search(&SearchFilters::default()).await?;
/// let removed = repo.delete(&DeleteSelector::ById(record.id)).await?;
/// ```
///
/// Callers validate with [`NewFoodRecord::validate`] first. The table's
/// CHECK constraints reject whatever slips past.
#[derive(Debug, Clone)]
pub struct FoodRepository {
    pool: SqlitePool,
}

impl FoodRepository {
    /// Creates a new FoodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FoodRepository { pool }
    }

    /// Inserts a new record and returns it as stored.
    ///
    /// Assigns a fresh UUID and the current time (microsecond precision,
    /// matching what is written).
    pub async fn insert(&self, new: NewFoodRecord) -> DbResult<FoodRecord> {
        insert_row(&self.pool, new).await
    }

    /// Inserts several records in one transaction.
    ///
    /// All or nothing: if any row is rejected, none are stored.
    pub async fn insert_many(&self, records: Vec<NewFoodRecord>) -> DbResult<Vec<FoodRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(records.len());

        for new in records {
            inserted.push(insert_row(&mut *tx, new).await?);
        }

        tx.commit().await?;
        info!(count = inserted.len(), "Inserted food records");
        Ok(inserted)
    }

    /// Fills `search_key` for rows written before the column existed.
    ///
    /// Returns how many rows were updated.
    pub async fn backfill_search_keys(&self) -> DbResult<u64> {
        let rows: Vec<(String, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, name, brand, category FROM food_items WHERE search_key = ''",
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for (id, name, brand, category) in rows {
            let categories: Vec<String> = serde_json::from_str(&category).unwrap_or_else(|e| {
                warn!(id = %id, error = %e, "Unreadable category list, indexing name and brand only");
                Vec::new()
            });
            let key = build_search_key(&name, brand.as_deref(), &categories);

            let result = sqlx::query("UPDATE food_items SET search_key = ? WHERE id = ?")
                .bind(key)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        info!(updated = updated, "Backfilled search keys");
        Ok(updated)
    }

    /// Returns one page of records matching `filters`, newest first, with
    /// the total match count.
    pub async fn search(&self, filters: &SearchFilters) -> DbResult<SearchPage> {
        let query = FoodQuery::from_filters(filters);

        debug!(
            barcode = ?filters.barcode,
            search = ?filters.search_text,
            limit = filters.limit,
            offset = filters.offset,
            "Searching inventory"
        );

        let count_sql = query.count_sql();
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in query.binds() {
            count = count.bind(value);
        }
        let total_count = count.fetch_one(&self.pool).await?;

        let select_sql = query.select_sql();
        let mut select = sqlx::query_as::<_, FoodRow>(&select_sql);
        for value in query.binds() {
            select = select.bind(value);
        }
        let rows = select
            .bind(filters.limit)
            .bind(filters.offset)
            .fetch_all(&self.pool)
            .await?;

        let records = into_records(rows)?;
        debug!(count = records.len(), total = total_count, "Search returned records");

        Ok(SearchPage {
            records,
            total_count,
            limit: filters.limit,
            offset: filters.offset,
        })
    }

    /// Gets a record by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(FoodRecord))` - Record found
    /// * `Ok(None)` - No record with that id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<FoodRecord>> {
        let sql = format!("SELECT {} FROM food_items WHERE id = ?", FOOD_COLUMNS);
        let row = sqlx::query_as::<_, FoodRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(FoodRecord::try_from).transpose()
    }

    /// Deletes the records a selector names and returns how many went.
    ///
    /// Zero is not an error here; the caller decides what "nothing
    /// deleted" means.
    pub async fn delete(&self, selector: &DeleteSelector) -> DbResult<u64> {
        match selector {
            DeleteSelector::ById(id) => self.delete_by_id(id).await,
            DeleteSelector::ByBarcode(barcode) => self.delete_by_barcode(barcode).await,
        }
    }

    /// Deletes a single record by id.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting food record");

        let result = sqlx::query("DELETE FROM food_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every record with this barcode.
    pub async fn delete_by_barcode(&self, barcode: &str) -> DbResult<u64> {
        debug!(barcode = %barcode, "Deleting food records by barcode");

        let result = sqlx::query("DELETE FROM food_items WHERE barcode = ?")
            .bind(barcode)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Records whose expiry date falls in `[today, today + days]`, soonest
    /// first. Records without an expiry date never match.
    pub async fn expiring_within(&self, days: i64, today: NaiveDate) -> DbResult<Vec<FoodRecord>> {
        let until = today + chrono::Duration::days(days);

        debug!(from = %today, until = %until, "Listing expiring records");

        let sql = format!(
            "SELECT {} FROM food_items \
             WHERE expiry_date IS NOT NULL AND expiry_date >= ? AND expiry_date <= ? \
             ORDER BY expiry_date ASC, created_at DESC",
            FOOD_COLUMNS
        );
        let rows = sqlx::query_as::<_, FoodRow>(&sql)
            .bind(today.format(DATE_FORMAT).to_string())
            .bind(until.format(DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    /// Records with `quantity < threshold`, lowest quantity first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<FoodRecord>> {
        debug!(threshold = threshold, "Listing low-stock records");

        let sql = format!(
            "SELECT {} FROM food_items WHERE quantity < ? \
             ORDER BY quantity ASC, created_at DESC",
            FOOD_COLUMNS
        );
        let rows = sqlx::query_as::<_, FoodRow>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    /// Counts all records (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM food_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Writes one record through any executor (pool or open transaction).
async fn insert_row<'e, E>(executor: E, new: NewFoodRecord) -> DbResult<FoodRecord>
where
    E: SqliteExecutor<'e>,
{
    let id = generate_food_id();
    let created_at = Utc::now().trunc_subsecs(6);

    debug!(id = %id, barcode = %new.barcode, "Inserting food record");

    let category =
        serde_json::to_string(&new.category).map_err(|e| DbError::Internal(e.to_string()))?;
    let allergens =
        serde_json::to_string(&new.allergens).map_err(|e| DbError::Internal(e.to_string()))?;
    let expiry_date = new
        .expiry_date
        .map(|d| d.format(DATE_FORMAT).to_string());

    sqlx::query(
        r#"
        INSERT INTO food_items (
            id, barcode, name, brand, category, calories,
            protein, fat, carbs, fiber, sugars, sodium,
            allergens, image_url, expiry_date, quantity, location, created_at,
            search_key
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.barcode)
    .bind(&new.name)
    .bind(&new.brand)
    .bind(category)
    .bind(new.calories)
    .bind(new.protein)
    .bind(new.fat)
    .bind(new.carbs)
    .bind(new.fiber)
    .bind(new.sugars)
    .bind(new.sodium)
    .bind(allergens)
    .bind(&new.image_url)
    .bind(expiry_date)
    .bind(new.quantity)
    .bind(&new.location)
    .bind(created_at.format(TIMESTAMP_FORMAT).to_string())
    .bind(new.search_key())
    .execute(executor)
    .await?;

    Ok(FoodRecord::from_new(new, id, created_at))
}

/// Generates a new record ID (UUID v4).
pub fn generate_food_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

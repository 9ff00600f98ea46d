//! # Food Query Builder
//!
//! Turns [`SearchFilters`] into a WHERE clause plus an ordered list of
//! values to bind.
//!
//! ## Shape
//! ```text
//! SearchFilters { barcode: Some("123..."), search_text: Some("apple") }
//!       │
//!       ▼
//! WHERE barcode = ?
//!   AND search_key LIKE ? ESCAPE '\'
//!       │
//!       ▼
//! binds = ["123...", "%apple%"]
//! ```
//!
//! `search_key` holds name, brand and categories already folded with
//! [`fold_search_text`]; the pattern is folded the same way here.
//!
//! Caller text only ever travels in `binds`. The SQL string is built from
//! fixed fragments, so the same filters always produce the same statement.

use pantry_core::{fold_search_text, SearchFilters};

/// Columns selected for a [`FoodRecord`](pantry_core::FoodRecord).
pub const FOOD_COLUMNS: &str = "id, barcode, name, brand, category, calories, protein, fat, \
     carbs, fiber, sugars, sodium, allergens, image_url, expiry_date, quantity, location, \
     created_at";

/// Newest first. `rowid` breaks ties between rows inserted in the same
/// microsecond.
const ORDER_BY: &str = "ORDER BY created_at DESC, rowid DESC";

const TEXT_MATCH: &str = "search_key LIKE ? ESCAPE '\\'";

/// A filtered query over `food_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodQuery {
    conditions: Vec<&'static str>,
    binds: Vec<String>,
}

impl FoodQuery {
    /// Builds the query for a set of filters.
    pub fn from_filters(filters: &SearchFilters) -> Self {
        let mut query = FoodQuery {
            conditions: Vec::new(),
            binds: Vec::new(),
        };

        if let Some(barcode) = &filters.barcode {
            query.conditions.push("barcode = ?");
            query.binds.push(barcode.clone());
        }

        if let Some(text) = &filters.search_text {
            let pattern = format!("%{}%", escape_like(&fold_search_text(text)));
            query.conditions.push(TEXT_MATCH);
            query.binds.push(pattern);
        }

        query
    }

    /// The WHERE clause, or an empty string when nothing is filtered.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Page query. Bind [`binds`](Self::binds), then limit, then offset.
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM food_items{} {} LIMIT ? OFFSET ?",
            FOOD_COLUMNS,
            self.where_clause(),
            ORDER_BY
        )
    }

    /// Total match count for the same filters.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM food_items{}", self.where_clause())
    }

    /// Values to bind, in placeholder order.
    pub fn binds(&self) -> &[String] {
        &self.binds
    }
}

/// Escapes LIKE wildcards so `50%` matches a literal percent sign.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

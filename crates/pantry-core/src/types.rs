//! # Domain Types
//!
//! Core types used throughout the pantry scanner.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   From    ┌─────────────────┐   insert            │
//! │  │ProcessedProduct │ ────────► │  NewFoodRecord  │ ─────────►  store   │
//! │  │  ─────────────  │           │  ─────────────  │                     │
//! │  │  barcode        │           │  barcode, name  │   ┌──────────────┐  │
//! │  │  name?  brand?  │           │  category[]     │   │  FoodRecord  │  │
//! │  │  categories?    │           │  calories? ...  │   │  + id        │  │
//! │  │  nutrition      │           │  quantity = 1   │   │  + created_at│  │
//! │  │  labels?        │           └─────────────────┘   └──────────────┘  │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    ScanMode     │   │  SearchFilters  │   │ DeleteSelector  │       │
//! │  │  scan           │   │  barcode?       │   │  ById           │       │
//! │  │  save           │   │  search_text?   │   │  ByBarcode      │       │
//! │  │  scan_and_save  │   │  limit, offset  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optional vs Empty
//! A [`ProcessedProduct`] keeps "unknown" (`None`, omitted from JSON) apart
//! from "known to be empty". A [`FoodRecord`] collapses both into an empty
//! list because the inventory has no use for the distinction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::{
    clamp_limit, clamp_offset, validate_barcode, validate_calories, validate_food_name,
    validate_nutrient, validate_quantity, validate_search_text, ValidationResult,
};
use crate::normalize::split_categories;
use crate::{DEFAULT_FOOD_NAME, DEFAULT_SEARCH_LIMIT, MAX_FOOD_NAME_LEN};

// =============================================================================
// Scan Mode
// =============================================================================

/// What a scan request should do with the looked-up product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Look up and normalize only. Never writes.
    #[default]
    Scan,
    /// Persist the product (resubmitted by the client, or looked up).
    Save,
    /// Look up, normalize, and persist in one call.
    ScanAndSave,
}

impl ScanMode {
    /// Returns true if this mode inserts a record.
    pub fn persists(&self) -> bool {
        matches!(self, ScanMode::Save | ScanMode::ScanAndSave)
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Scan => write!(f, "scan"),
            ScanMode::Save => write!(f, "save"),
            ScanMode::ScanAndSave => write!(f, "scan_and_save"),
        }
    }
}

// =============================================================================
// Processed Product
// =============================================================================

/// Nutrition facts per 100g, as reported upstream.
///
/// Every value is optional. `Some(0.0)` is a real measurement and is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NutritionFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl NutritionFacts {
    /// Returns true if no nutrient is known.
    pub fn is_empty(&self) -> bool {
        *self == NutritionFacts::default()
    }
}

/// A product after normalization, before (optional) persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcessedProduct {
    pub barcode: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// `None` when upstream had no category string at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(flatten)]
    pub nutrition: NutritionFacts,

    /// Allow-listed dietary labels ("vegan", "gluten free", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
}

impl ProcessedProduct {
    /// A product that carries nothing but its barcode.
    pub fn bare(barcode: impl Into<String>) -> Self {
        ProcessedProduct {
            barcode: barcode.into(),
            name: None,
            brand: None,
            categories: None,
            nutrition: NutritionFacts::default(),
            labels: None,
            allergens: None,
            image_url: None,
            expiration_date: None,
        }
    }

    /// Returns true if any field beyond the barcode is set.
    pub fn has_details(&self) -> bool {
        *self != ProcessedProduct::bare(self.barcode.clone())
    }
}

// =============================================================================
// Food Record
// =============================================================================

/// A persisted inventory entry.
///
/// Created once by the inventory store and never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FoodRecord {
    /// Unique identifier (UUID v4), assigned at insert.
    pub id: String,

    pub barcode: String,

    /// Display name; `"Unknown Product"` when upstream had none.
    pub name: String,

    pub brand: Option<String>,

    pub category: Vec<String>,

    /// kcal per 100g.
    pub calories: Option<i64>,

    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,

    pub allergens: Vec<String>,

    pub image_url: Option<String>,

    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,

    pub quantity: i64,

    /// Free-text shelf location ("fridge", "pantry top shelf").
    pub location: Option<String>,

    /// When the record was inserted.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FoodRecord {
    /// Builds the stored form of a new record.
    pub fn from_new(new: NewFoodRecord, id: String, created_at: DateTime<Utc>) -> Self {
        FoodRecord {
            id,
            barcode: new.barcode,
            name: new.name,
            brand: new.brand,
            category: new.category,
            calories: new.calories,
            protein: new.protein,
            fat: new.fat,
            carbs: new.carbs,
            fiber: new.fiber,
            sugars: new.sugars,
            sodium: new.sodium,
            allergens: new.allergens,
            image_url: new.image_url,
            expiry_date: new.expiry_date,
            quantity: new.quantity,
            location: new.location,
            created_at,
        }
    }
}

// =============================================================================
// New Food Record
// =============================================================================

fn default_quantity() -> i64 {
    1
}

/// Insert payload for the inventory store.
///
/// Deserializable so clients can create items by hand (bulk imports,
/// products the upstream database does not know).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewFoodRecord {
    pub barcode: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// A JSON list, or one comma-separated string.
    #[serde(default, deserialize_with = "string_or_list")]
    pub category: Vec<String>,
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugars: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewFoodRecord {
    /// Trims the free-text fields. Blank optional fields become `None`.
    pub fn trim_fields(mut self) -> Self {
        self.barcode = self.barcode.trim().to_string();
        self.name = self.name.trim().to_string();
        self.brand = trimmed_option(self.brand);
        self.location = trimmed_option(self.location);
        self.image_url = trimmed_option(self.image_url);
        self
    }

    /// Lowercased name, brand and categories, matched by text search.
    ///
    /// Folded here rather than in SQL so non-ASCII text compares the same
    /// way on both sides. See [`fold_search_text`].
    pub fn search_key(&self) -> String {
        build_search_key(&self.name, self.brand.as_deref(), &self.category)
    }

    /// Checks the record invariants before it reaches the store.
    ///
    /// ## Rules
    /// - Barcode is 8-14 digits (→ [`CoreError::BadBarcode`])
    /// - Name is present
    /// - Calories and nutrients are not negative
    /// - Quantity is not negative
    pub fn validate(&self) -> CoreResult<()> {
        validate_barcode(&self.barcode).map_err(|e| CoreError::BadBarcode {
            barcode: self.barcode.clone(),
            reason: e.to_string(),
        })?;

        validate_food_name(&self.name)?;
        validate_calories(self.calories)?;

        for (field, value) in [
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
            ("fiber", self.fiber),
            ("sugars", self.sugars),
            ("sodium", self.sodium),
        ] {
            validate_nutrient(field, value)?;
        }

        validate_quantity(self.quantity)?;
        Ok(())
    }
}

impl From<ProcessedProduct> for NewFoodRecord {
    fn from(p: ProcessedProduct) -> Self {
        let nutrition = p.nutrition;
        NewFoodRecord {
            barcode: p.barcode,
            name: p
                .name
                .map(clamp_name)
                .unwrap_or_else(|| DEFAULT_FOOD_NAME.to_string()),
            brand: p.brand,
            category: p.categories.unwrap_or_default(),
            calories: nutrition.calories.map(|kcal| kcal.round() as i64),
            protein: nutrition.protein,
            fat: nutrition.fat,
            carbs: nutrition.carbs,
            fiber: nutrition.fiber,
            sugars: nutrition.sugars,
            sodium: nutrition.sodium,
            allergens: p.allergens.unwrap_or_default(),
            image_url: p.image_url,
            expiry_date: p.expiration_date,
            quantity: default_quantity(),
            location: None,
        }
    }
}

/// Cuts a name down to [`MAX_FOOD_NAME_LEN`] characters.
fn clamp_name(name: String) -> String {
    if name.chars().count() <= MAX_FOOD_NAME_LEN {
        return name;
    }
    name.chars()
        .take(MAX_FOOD_NAME_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn trimmed_option(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `["a", "b"]`, `"a, b"` or `null` for a list field.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(text)) => split_categories(&text),
    })
}

// =============================================================================
// Search
// =============================================================================

/// Separates the fields of a search key so a pattern cannot span two.
const SEARCH_KEY_SEPARATOR: char = '\u{1f}';

/// Case folding shared by stored search keys and search patterns.
///
/// Unicode-aware, so `"ÉVIAN"` and `"évian"` fold to the same text.
pub fn fold_search_text(text: &str) -> String {
    text.to_lowercase()
}

/// Builds the stored search key for a record's searchable fields.
pub fn build_search_key(name: &str, brand: Option<&str>, categories: &[String]) -> String {
    let mut key = fold_search_text(name);
    key.push(SEARCH_KEY_SEPARATOR);
    key.push_str(&fold_search_text(brand.unwrap_or_default()));
    for category in categories {
        key.push(SEARCH_KEY_SEPARATOR);
        key.push_str(&fold_search_text(category));
    }
    key
}

/// Filters for an inventory search. All present filters must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    /// Exact barcode match.
    pub barcode: Option<String>,
    /// Case-insensitive substring of name, brand or category.
    pub search_text: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            barcode: None,
            search_text: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

impl SearchFilters {
    /// Builds filters from raw query parameters.
    ///
    /// Blank strings count as absent; limit and offset are clamped.
    pub fn from_params(
        barcode: Option<&str>,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ValidationResult<Self> {
        let barcode = barcode
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        let search_text = match search {
            Some(text) => validate_search_text(text)?,
            None => None,
        };

        Ok(SearchFilters {
            barcode,
            search_text,
            limit: clamp_limit(limit),
            offset: clamp_offset(offset),
        })
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub records: Vec<FoodRecord>,
    /// Matches for the filters, ignoring limit and offset.
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

impl SearchPage {
    /// Returns true if rows remain past this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.records.len() as i64) < self.total_count
    }
}

// =============================================================================
// Delete Selector
// =============================================================================

/// Which rows a delete removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteSelector {
    /// Exactly one record.
    ById(String),
    /// Every record sharing the barcode.
    ByBarcode(String),
}

impl DeleteSelector {
    /// Picks a selector from optional request parameters.
    ///
    /// `id` takes precedence when both are given. Blank values count as
    /// absent.
    pub fn from_params(id: Option<&str>, barcode: Option<&str>) -> CoreResult<Self> {
        let id = id.map(str::trim).filter(|s| !s.is_empty());
        let barcode = barcode.map(str::trim).filter(|s| !s.is_empty());

        match (id, barcode) {
            (Some(id), _) => Ok(DeleteSelector::ById(id.to_string())),
            (None, Some(barcode)) => Ok(DeleteSelector::ByBarcode(barcode.to_string())),
            (None, None) => Err(CoreError::MissingSelector),
        }
    }
}

impl std::fmt::Display for DeleteSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteSelector::ById(id) => write!(f, "id {}", id),
            DeleteSelector::ByBarcode(barcode) => write!(f, "barcode {}", barcode),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new() -> NewFoodRecord {
        NewFoodRecord::from(ProcessedProduct {
            name: Some("Nutella".to_string()),
            brand: Some("Ferrero".to_string()),
            nutrition: NutritionFacts {
                calories: Some(539.0),
                fat: Some(30.9),
                ..Default::default()
            },
            ..ProcessedProduct::bare("3017620422003")
        })
    }

    #[test]
    fn test_scan_mode_default_and_persists() {
        assert_eq!(ScanMode::default(), ScanMode::Scan);
        assert!(!ScanMode::Scan.persists());
        assert!(ScanMode::Save.persists());
        assert!(ScanMode::ScanAndSave.persists());
    }

    #[test]
    fn test_scan_mode_wire_names() {
        let mode: ScanMode = serde_json::from_str("\"scan_and_save\"").unwrap();
        assert_eq!(mode, ScanMode::ScanAndSave);
        assert_eq!(ScanMode::ScanAndSave.to_string(), "scan_and_save");
        assert!(serde_json::from_str::<ScanMode>("\"delete\"").is_err());
    }

    #[test]
    fn test_bare_product_serializes_only_barcode() {
        let product = ProcessedProduct::bare("12345678");
        assert!(!product.has_details());

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json, serde_json::json!({ "barcode": "12345678" }));
    }

    #[test]
    fn test_nutrition_is_flattened() {
        let json = serde_json::to_value(sample_processed()).unwrap();
        assert_eq!(json["calories"].as_f64(), Some(539.0));
        assert!(json.get("nutrition").is_none());
    }

    fn sample_processed() -> ProcessedProduct {
        ProcessedProduct {
            nutrition: NutritionFacts {
                calories: Some(539.0),
                ..Default::default()
            },
            ..ProcessedProduct::bare("3017620422003")
        }
    }

    #[test]
    fn test_new_record_from_processed_product() {
        let new = sample_new();
        assert_eq!(new.name, "Nutella");
        assert_eq!(new.calories, Some(539));
        assert_eq!(new.fat, Some(30.9));
        assert_eq!(new.quantity, 1);
        assert!(new.category.is_empty());
        assert!(new.allergens.is_empty());
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_record_defaults_name() {
        let new = NewFoodRecord::from(ProcessedProduct::bare("12345678"));
        assert_eq!(new.name, DEFAULT_FOOD_NAME);
    }

    #[test]
    fn test_new_record_validation() {
        let mut bad = sample_new();
        bad.barcode = "12ab".to_string();
        assert!(matches!(bad.validate(), Err(CoreError::BadBarcode { .. })));

        let mut bad = sample_new();
        bad.protein = Some(-1.0);
        assert!(matches!(bad.validate(), Err(CoreError::Validation(_))));

        let mut bad = sample_new();
        bad.quantity = -2;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_new_record_deserialize_defaults() {
        let new: NewFoodRecord =
            serde_json::from_str(r#"{"barcode":"12345678","name":"Rice"}"#).unwrap();
        assert_eq!(new.quantity, 1);
        assert!(new.category.is_empty());
        assert_eq!(new.expiry_date, None);
    }

    #[test]
    fn test_new_record_clamps_long_upstream_name() {
        let new = NewFoodRecord::from(ProcessedProduct {
            name: Some("X".repeat(MAX_FOOD_NAME_LEN + 1)),
            ..ProcessedProduct::bare("12345678")
        });
        assert_eq!(new.name.chars().count(), MAX_FOOD_NAME_LEN);
        assert!(new.validate().is_ok());

        let accented = NewFoodRecord::from(ProcessedProduct {
            name: Some("é".repeat(MAX_FOOD_NAME_LEN + 5)),
            ..ProcessedProduct::bare("12345678")
        });
        assert_eq!(accented.name.chars().count(), MAX_FOOD_NAME_LEN);
    }

    #[test]
    fn test_new_record_trim_fields() {
        let new: NewFoodRecord = serde_json::from_str(
            r#"{"barcode":" 12345678 ","name":"  Rice ","brand":" ","location":" pantry "}"#,
        )
        .unwrap();
        let new = new.trim_fields();

        assert_eq!(new.barcode, "12345678");
        assert_eq!(new.name, "Rice");
        assert_eq!(new.brand, None);
        assert_eq!(new.location.as_deref(), Some("pantry"));
    }

    #[test]
    fn test_new_record_lists_accept_strings() {
        let new: NewFoodRecord = serde_json::from_str(
            r#"{"barcode":"12345678","name":"Apple","category":"Fruits, Fresh","allergens":null}"#,
        )
        .unwrap();
        assert_eq!(new.category, vec!["Fruits", "Fresh"]);
        assert!(new.allergens.is_empty());

        let new: NewFoodRecord = serde_json::from_str(
            r#"{"barcode":"12345678","name":"Apple","category":["Fruits"]}"#,
        )
        .unwrap();
        assert_eq!(new.category, vec!["Fruits"]);
    }

    #[test]
    fn test_search_key_folds_unicode() {
        let mut new = NewFoodRecord::from(ProcessedProduct {
            name: Some("Évian Eau Minérale".to_string()),
            brand: Some("DANONE".to_string()),
            ..ProcessedProduct::bare("3068320114453")
        });
        new.category = vec!["Eaux".to_string()];

        let key = new.search_key();
        assert!(key.contains(&fold_search_text("ÉVIAN")));
        assert!(key.contains("danone"));
        assert!(key.contains("eaux"));
        assert!(!key.contains("minérale danone"));
    }

    #[test]
    fn test_search_filters_from_params() {
        let filters =
            SearchFilters::from_params(Some(" "), Some(" apple "), Some(5000), Some(-1)).unwrap();
        assert_eq!(filters.barcode, None);
        assert_eq!(filters.search_text.as_deref(), Some("apple"));
        assert_eq!(filters.limit, 1000);
        assert_eq!(filters.offset, 0);

        assert_eq!(
            SearchFilters::from_params(None, None, None, None).unwrap(),
            SearchFilters::default()
        );
    }

    #[test]
    fn test_search_page_has_more() {
        let page = SearchPage {
            records: vec![],
            total_count: 2,
            limit: 1,
            offset: 2,
        };
        assert!(!page.has_more());

        let page = SearchPage {
            records: vec![],
            total_count: 3,
            limit: 1,
            offset: 1,
        };
        assert!(page.has_more());
    }

    #[test]
    fn test_delete_selector() {
        assert_eq!(
            DeleteSelector::from_params(Some("abc"), Some("12345678")).unwrap(),
            DeleteSelector::ById("abc".to_string())
        );
        assert_eq!(
            DeleteSelector::from_params(None, Some("12345678")).unwrap(),
            DeleteSelector::ByBarcode("12345678".to_string())
        );
        assert!(matches!(
            DeleteSelector::from_params(Some(""), None),
            Err(CoreError::MissingSelector)
        ));
    }
}

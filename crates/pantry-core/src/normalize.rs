//! # Product Normalization
//!
//! Maps the loosely-typed upstream product payload onto [`ProcessedProduct`].
//!
//! ## Field Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ExternalProduct (upstream)          ProcessedProduct                   │
//! │  ──────────────────────────          ────────────────                   │
//! │  product_name ─────────────────────► name                               │
//! │  brands ───────────────────────────► brand                              │
//! │  categories "A, B,  ,C" ──split────► categories ["A","B","C"]           │
//! │  nutriments                                                             │
//! │  ├── energy-kcal_100g ─────────────► calories                           │
//! │  ├── proteins_100g ────────────────► protein                            │
//! │  ├── fat_100g ─────────────────────► fat                                │
//! │  ├── carbohydrates_100g ───────────► carbs                              │
//! │  ├── fiber_100g ───────────────────► fiber                              │
//! │  ├── sugars_100g ──────────────────► sugars                             │
//! │  └── sodium_100g ──────────────────► sodium                             │
//! │  labels_tags "en:gluten-free" ─────► labels ["gluten free"]             │
//! │  allergens_tags "en:milk" ─────────► allergens ["milk"]                 │
//! │  image_url ?? image_front_url ─────► image_url                          │
//! │  expiration_date (strict ISO) ─────► expiration_date                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absent vs Zero
//! A nutrient key that is present with the value `0` is a measurement and is
//! kept as `Some(0.0)`. Only missing keys (and values that are null,
//! non-numeric or negative) are omitted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{NutritionFacts, ProcessedProduct};
use crate::validation::parse_iso_date;
use crate::LABEL_ALLOW_LIST;

/// Language namespace kept from upstream tag lists.
const ENGLISH_TAG_PREFIX: &str = "en:";

// =============================================================================
// External Product
// =============================================================================

/// Product as returned by the external product database.
///
/// Every field is optional: upstream records range from fully curated to a
/// bare barcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Brand name(s), as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands: Option<String>,

    /// Comma-joined category names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,

    /// Nutrient name → value. Values are usually numbers but may be strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutriments: Option<Map<String, Value>>,

    /// Namespaced label tags (`en:organic`, `fr:bio`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels_tags: Option<Vec<String>>,

    /// Namespaced allergen tags (`en:milk`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens_tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_front_url: Option<String>,

    /// Free text; not guaranteed to be a date at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalizes an upstream product for `barcode`.
///
/// Pure and deterministic: the same input always yields the same output.
pub fn normalize(barcode: &str, external: ExternalProduct) -> ProcessedProduct {
    let nutrition = external
        .nutriments
        .as_ref()
        .map(normalize_nutrition)
        .unwrap_or_default();

    ProcessedProduct {
        barcode: barcode.to_string(),
        name: non_blank(external.product_name),
        brand: non_blank(external.brands),
        categories: external.categories.as_deref().map(split_categories),
        nutrition,
        labels: external
            .labels_tags
            .as_deref()
            .map(normalize_labels)
            .filter(|labels| !labels.is_empty()),
        allergens: external
            .allergens_tags
            .as_deref()
            .map(normalize_allergens)
            .filter(|allergens| !allergens.is_empty()),
        image_url: non_blank(external.image_url).or_else(|| non_blank(external.image_front_url)),
        expiration_date: external
            .expiration_date
            .as_deref()
            .and_then(parse_iso_date),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Splits a comma-joined category string.
///
/// A present-but-blank string yields an empty list, which is different from
/// an absent one.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_nutrition(nutriments: &Map<String, Value>) -> NutritionFacts {
    let read = |key: &str| nutriments.get(key).and_then(nutrient_value);

    NutritionFacts {
        calories: read("energy-kcal_100g"),
        protein: read("proteins_100g"),
        fat: read("fat_100g"),
        carbs: read("carbohydrates_100g"),
        fiber: read("fiber_100g"),
        sugars: read("sugars_100g"),
        sodium: read("sodium_100g"),
    }
}

/// Reads one nutrient value. `0` is a value; null and junk are not.
fn nutrient_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (number.is_finite() && number >= 0.0).then_some(number)
}

/// Strips the `en:` namespace and turns tag separators into spaces.
fn english_tags(tags: &[String]) -> impl Iterator<Item = String> + '_ {
    tags.iter()
        .filter_map(|tag| tag.trim().strip_prefix(ENGLISH_TAG_PREFIX))
        .map(|tag| tag.replace(['-', '_'], " "))
        .filter(|tag| !tag.trim().is_empty())
}

/// Keeps English, allow-listed dietary labels.
///
/// `en:gluten-free` becomes `"gluten free"`; matching treats spaces and
/// hyphens alike and ignores case.
pub fn normalize_labels(tags: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in english_tags(tags) {
        if is_allowed_label(&label) && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

fn is_allowed_label(label: &str) -> bool {
    let key = label.trim().to_lowercase().replace(' ', "-");
    LABEL_ALLOW_LIST.contains(&key.as_str())
}

fn normalize_allergens(tags: &[String]) -> Vec<String> {
    let mut allergens: Vec<String> = Vec::new();
    for allergen in english_tags(tags) {
        if !allergens.contains(&allergen) {
            allergens.push(allergen);
        }
    }
    allergens
}

// =============================================================================
// Unit Tests
// =============================================================================

// Turns a raw recommendation response into a de-duplicated list of canonical products

use crate::canonical::{currency_symbol, first_present, non_empty};
use crate::models::{Product, RawProductRecord, UserContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use utoipa::ToSchema;

pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=300&width=300";
pub const PLACEHOLDER_BUY_URL: &str = "#";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to get recommendations";

/// Added to the position of AI-sourced entries before deriving a synthetic id.
/// Holds only while the primary list stays under this many entries.
pub const SECONDARY_ID_OFFSET: usize = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("{0}")]
    RequestFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Products,
    AiRecommendations,
}

/// An entry that could not be turned into a product.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiscardedEntry {
    pub source: RecommendationSource,
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Normalized {
    pub products: Vec<Product>,
    pub discarded: Vec<DiscardedEntry>,
}

/**
 * normalize
 * Validates the response status, converts both product lists, then keeps the first
 * occurrence of every (name, price) pair. Only a non-success status is an error.
 */
pub fn normalize(raw: &Value, ctx: &UserContext) -> Result<Normalized, NormalizeError> {
    if raw.get("status").and_then(Value::as_str) != Some("success") {
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE);
        return Err(NormalizeError::RequestFailed(message.to_string()));
    }

    let currency = currency_symbol(ctx.location.as_deref());
    let mut out = Normalized::default();
    let mut seen = HashSet::new();

    let primary = raw
        .get("products")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let secondary = secondary_entries(raw.get("ai_recommendations"));

    let batches = [
        (RecommendationSource::Products, primary, 0),
        (
            RecommendationSource::AiRecommendations,
            secondary.as_slice(),
            SECONDARY_ID_OFFSET,
        ),
    ];

    for (source, entries, offset) in batches {
        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(entry) {
                Ok(record) => {
                    let product = to_product(record, index + offset, currency);
                    if seen.insert(dedup_key(&product)) {
                        out.products.push(product);
                    }
                }
                Err(reason) => {
                    log::warn!(
                        "Skipping malformed {:?} entry index={} reason={}",
                        source,
                        index,
                        reason
                    );
                    out.discarded.push(DiscardedEntry {
                        source,
                        index,
                        reason,
                    });
                }
            }
        }
    }

    Ok(out)
}

/// AI recommendations arrive either as an array or as a JSON string holding one.
fn secondary_entries(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(encoded)) if !encoded.trim().is_empty() => {
            match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Array(items)) => items,
                Ok(other) => {
                    log::warn!("ai_recommendations decoded to a non-list value: {}", other);
                    Vec::new()
                }
                Err(e) => {
                    log::warn!("Failed to parse ai_recommendations: {}", e);
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    }
}

/// Only non-objects and objects without any recognised key are rejected; odd field
/// types fall back to defaults in `to_product`.
fn parse_entry(entry: &Value) -> Result<RawProductRecord, String> {
    let Some(map) = entry.as_object() else {
        return Err(format!("expected an object, got {}", entry));
    };
    if !RawProductRecord::has_recognised_field(map) {
        return Err("no recognised product fields".to_string());
    }
    RawProductRecord::deserialize(entry).map_err(|e| e.to_string())
}

/// Maps a loose record onto the canonical shape. Never fails.
pub fn to_product(record: RawProductRecord, position: usize, default_currency: &str) -> Product {
    let id = record
        .id
        .as_ref()
        .and_then(|id| id.as_id())
        .unwrap_or_else(|| format!("product-{}", position));

    Product {
        id,
        name: first_present(&[record.name.as_ref(), record.title.as_ref()])
            .unwrap_or(UNKNOWN_PRODUCT_NAME)
            .to_string(),
        price: record.price.as_ref().map_or(0.0, |p| p.as_number()),
        currency: non_empty(record.currency.as_ref())
            .unwrap_or(default_currency)
            .to_string(),
        image: first_present(&[record.image.as_ref(), record.image_url.as_ref()])
            .unwrap_or(PLACEHOLDER_IMAGE)
            .to_string(),
        buy_url: first_present(&[record.buy_url.as_ref(), record.url.as_ref()])
            .unwrap_or(PLACEHOLDER_BUY_URL)
            .to_string(),
        category: non_empty(record.category.as_ref())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        rating: record.rating.as_ref().map_or(0.0, |r| r.as_number()),
        reasoning: non_empty(record.reasoning.as_ref()).map(str::to_string),
    }
}

fn dedup_key(product: &Product) -> (String, u64) {
    // 0.0 and -0.0 compare equal
    let price = if product.price == 0.0 { 0.0 } else { product.price };
    (product.name.clone(), price.to_bits())
}

use crate::canonical::{lenient_scalar, lenient_string, Scalar};
use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Canonical product record handed to the presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub image: String,
    pub buy_url: String,
    pub category: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Product entry as sent by either recommendation source. Every field is optional and
/// several have alternate spellings. A field of an unexpected JSON type reads as absent.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RawProductRecord {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(rename = "buyUrl", default, deserialize_with = "lenient_string")]
    pub buy_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub rating: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reasoning: Option<String>,
}

impl RawProductRecord {
    pub const FIELDS: [&'static str; 12] = [
        "id",
        "name",
        "title",
        "price",
        "currency",
        "image",
        "image_url",
        "buyUrl",
        "url",
        "category",
        "rating",
        "reasoning",
    ];

    /// True when the object carries at least one recognised key, whatever its value.
    pub fn has_recognised_field(entry: &serde_json::Map<String, serde_json::Value>) -> bool {
        Self::FIELDS.iter().any(|f| entry.contains_key(*f))
    }
}

/// Read-only session inputs owned by the form layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserContext {
    pub session_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingInput {
    #[serde(default)]
    pub occasion: String,
    #[serde(default)]
    pub brands_preferred: String,
    #[serde(default)]
    pub shopping_input: String,
    #[serde(default)]
    pub budget_min: String,
    #[serde(default)]
    pub budget_max: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub shopping_input: ShoppingInput,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TranslateQuery {
    pub key: String,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateBatchRequest {
    #[serde(default)]
    pub locale: Option<String>,
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct TranslationResult {
    pub locale: Locale,
    pub key: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

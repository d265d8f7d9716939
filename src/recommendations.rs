// Client for the remote recommendation service

use crate::config::AppConfig;
use crate::models::{ShoppingInput, UserContext};
use crate::normalizer::{normalize, NormalizeError, Normalized};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// The service answered but reported a non-success status.
    #[error("{0}")]
    RequestFailed(String),
    #[error("recommendation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("recommendation service returned an unreadable body: {0}")]
    Decode(String),
}

impl From<NormalizeError> for RecommendError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::RequestFailed(message) => RecommendError::RequestFailed(message),
        }
    }
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Raw response body, before any normalization.
    async fn fetch(&self, ctx: &UserContext, input: &ShoppingInput) -> Result<Value, RecommendError>;
}

pub struct HttpRecommendationClient {
    client: Client,
    base_url: String,
}

impl HttpRecommendationClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.recommend_api_url.clone(),
        })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationClient {
    async fn fetch(&self, ctx: &UserContext, input: &ShoppingInput) -> Result<Value, RecommendError> {
        let payload = serde_json::json!({
            "session_id": ctx.session_id,
            "shopping_input": input,
        });

        let resp = self
            .client
            .post(format!("{}/api/shopping-recommendations", self.base_url))
            .json(&payload)
            .send()
            .await?;

        // Error statuses still carry a {status, message} body.
        let status = resp.status();
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            log::warn!(
                "Recommendation response not JSON status={} err={}",
                status,
                e
            );
            RecommendError::Decode(format!("{} ({})", e, status))
        })
    }
}

/**
 * recommend
 * Fetches recommendations for the session and normalizes them into canonical products.
 */
pub async fn recommend(
    service: &dyn RecommendationService,
    ctx: &UserContext,
    input: &ShoppingInput,
) -> Result<Normalized, RecommendError> {
    let raw = service.fetch(ctx, input).await?;
    let normalized = normalize(&raw, ctx)?;

    log::info!(
        "Normalized recommendations session={} products={} discarded={}",
        ctx.session_id,
        normalized.products.len(),
        normalized.discarded.len()
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedService(Value);

    #[async_trait]
    impl RecommendationService for CannedService {
        async fn fetch(&self, ctx: &UserContext, input: &ShoppingInput) -> Result<Value, RecommendError> {
            assert_eq!(ctx.session_id, "s-9");
            assert_eq!(input.occasion, "birthday");
            Ok(self.0.clone())
        }
    }

    fn input() -> ShoppingInput {
        ShoppingInput {
            occasion: "birthday".into(),
            shopping_input: "a lamp".into(),
            ..Default::default()
        }
    }

    fn ctx() -> UserContext {
        UserContext {
            session_id: "s-9".into(),
            location: Some("Japan".into()),
        }
    }

    #[tokio::test]
    async fn test_recommend_normalizes_response() {
        let service = CannedService(json!({
            "status": "success",
            "products": [{"id": "1", "name": "Lamp", "price": 20}],
            "ai_recommendations": "[{\"title\":\"Desk\",\"price\":\"80\"}]"
        }));
        let out = recommend(&service, &ctx(), &input()).await.unwrap();
        assert_eq!(out.products.len(), 2);
        assert_eq!(out.products[1].id, "product-1000");
        assert_eq!(out.products[1].currency, "¥");
    }

    #[tokio::test]
    async fn test_recommend_surfaces_request_failed() {
        let service = CannedService(json!({"status": "error", "message": "Invalid session"}));
        let err = recommend(&service, &ctx(), &input()).await.unwrap_err();
        assert!(matches!(err, RecommendError::RequestFailed(ref m) if m == "Invalid session"));
        assert_eq!(err.to_string(), "Invalid session");
    }

    #[test]
    fn test_shopping_input_wire_names() {
        let json = serde_json::to_value(input()).unwrap();
        assert_eq!(json["brandsPreferred"], "");
        assert_eq!(json["shoppingInput"], "a lamp");
        assert_eq!(json["budgetMin"], "");
    }
}

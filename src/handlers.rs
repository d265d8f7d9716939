use crate::i18n::{negotiate_locale, Locale};
use crate::models::{
    ApiResponse, RecommendationRequest, TranslateBatchRequest, TranslateQuery, TranslationResult,
    UserContext,
};
use crate::normalizer::Normalized;
use crate::recommendations::{recommend, RecommendError, RecommendationService};
use crate::translation::TranslationResolver;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub struct AppState {
    pub resolver: TranslationResolver,
    pub recommendations: Arc<dyn RecommendationService>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/translate", web::get().to(translate))
            .route("/translate/batch", web::post().to(translate_batch))
            .route("/recommendations", web::post().to(get_recommendations)),
    );
}

/**
 * pick_locale
 * Explicit locale wins; otherwise negotiate from Accept-Language, default en.
 */
fn pick_locale(req: &HttpRequest, explicit: Option<&str>) -> Result<Locale, HttpResponse> {
    match explicit.map(str::trim).filter(|l| !l.is_empty()) {
        Some(raw) => raw.parse::<Locale>().map_err(|e| {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))
        }),
        None => {
            let header = req
                .headers()
                .get("Accept-Language")
                .and_then(|h| h.to_str().ok());
            Ok(negotiate_locale(header))
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthCheckResponse))
)]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthCheckResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    get,
    path = "/api/translate",
    params(TranslateQuery),
    responses(
        (status = 200, description = "Resolved display text", body = TranslationResult),
        (status = 400, description = "Unsupported locale")
    )
)]
pub async fn translate(
    req: HttpRequest,
    query: web::Query<TranslateQuery>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let query = query.into_inner();
    let locale = match pick_locale(&req, query.locale.as_deref()) {
        Ok(locale) => locale,
        Err(resp) => return resp,
    };

    let text = state.resolver.resolve(locale, &query.key).await;
    HttpResponse::Ok().json(ApiResponse::success(TranslationResult {
        locale,
        key: query.key,
        text,
    }))
}

#[utoipa::path(
    post,
    path = "/api/translate/batch",
    request_body = TranslateBatchRequest,
    responses(
        (status = 200, description = "Resolved display text per key", body = [TranslationResult]),
        (status = 400, description = "Unsupported locale")
    )
)]
pub async fn translate_batch(
    req: HttpRequest,
    body: web::Json<TranslateBatchRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let body = body.into_inner();
    let locale = match pick_locale(&req, body.locale.as_deref()) {
        Ok(locale) => locale,
        Err(resp) => return resp,
    };

    let results: Vec<TranslationResult> = state
        .resolver
        .resolve_many(locale, &body.keys)
        .await
        .into_iter()
        .map(|(key, text)| TranslationResult { locale, key, text })
        .collect();

    HttpResponse::Ok().json(ApiResponse::success(results))
}

#[utoipa::path(
    post,
    path = "/api/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Canonical, de-duplicated products", body = Normalized),
        (status = 502, description = "Recommendation service failed")
    )
)]
pub async fn get_recommendations(
    body: web::Json<RecommendationRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let body = body.into_inner();
    let ctx = UserContext {
        session_id: body
            .session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        location: body.location,
    };

    match recommend(state.recommendations.as_ref(), &ctx, &body.shopping_input).await {
        Ok(normalized) => HttpResponse::Ok().json(ApiResponse::success(normalized)),
        Err(RecommendError::RequestFailed(message)) => {
            log::warn!("Recommendation request failed session={} message={}", ctx.session_id, message);
            HttpResponse::BadGateway().json(ApiResponse::<()>::error(message))
        }
        Err(e) => {
            log::error!("Recommendation service error session={} err={:?}", ctx.session_id, e);
            HttpResponse::BadGateway().json(ApiResponse::<()>::error(
                "Failed to get product recommendations. Please try again.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StaticBundle;
    use crate::models::ShoppingInput;
    use crate::translation::{TranslationBackend, TranslationCache};
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoBackend;

    #[async_trait]
    impl TranslationBackend for EchoBackend {
        async fn translate(&self, text: &str, _source: Locale, target: Locale) -> anyhow::Result<String> {
            Ok(format!("{}:{}", target, text))
        }
    }

    struct CannedService(Value);

    #[async_trait]
    impl RecommendationService for CannedService {
        async fn fetch(
            &self,
            _ctx: &UserContext,
            _input: &ShoppingInput,
        ) -> Result<Value, RecommendError> {
            Ok(self.0.clone())
        }
    }

    fn state(response: Value) -> web::Data<Arc<AppState>> {
        let resolver = TranslationResolver::new(
            Arc::new(StaticBundle::load().unwrap()),
            Arc::new(TranslationCache::new()),
            Arc::new(EchoBackend),
        );
        web::Data::new(Arc::new(AppState {
            resolver,
            recommendations: Arc::new(CannedService(response)),
        }))
    }

    #[actix_web::test]
    async fn test_translate_explicit_and_negotiated_locale() {
        let app = test::init_service(
            App::new()
                .app_data(state(json!({})))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/translate?key=buy_now&locale=zh")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["text"], "立即购买");

        let req = test::TestRequest::get()
            .uri("/api/translate?key=buy_now")
            .insert_header(("Accept-Language", "de-DE,de;q=0.9"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["locale"], "de");
        assert_eq!(body["data"]["text"], "de:Buy Now");

        let req = test::TestRequest::get()
            .uri("/api/translate?key=buy_now&locale=xx")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_translate_batch() {
        let app = test::init_service(
            App::new()
                .app_data(state(json!({})))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/translate/batch")
            .set_json(json!({"locale": "en", "keys": ["next", "missing"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["text"], "Next");
        assert_eq!(body["data"][1]["text"], "missing");
    }

    #[actix_web::test]
    async fn test_recommendations_success_and_failure() {
        let ok = json!({
            "status": "success",
            "products": [{"name": "A", "price": 10}],
            "ai_recommendations": "[{\"name\":\"A\",\"price\":10}]"
        });
        let app = test::init_service(App::new().app_data(state(ok)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/recommendations")
            .set_json(json!({"shopping_input": {"occasion": "gift"}}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["products"].as_array().map(Vec::len), Some(1));

        let failed = json!({"status": "error", "message": "Invalid session"});
        let app = test::init_service(App::new().app_data(state(failed)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/recommendations")
            .set_json(json!({"session_id": "s", "shopping_input": {}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid session");
    }
}

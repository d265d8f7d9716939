mod canonical;
mod config;
mod handlers;
mod i18n;
mod models;
mod normalizer;
mod recommendations;
mod translation;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::i18n::StaticBundle;
use crate::recommendations::HttpRecommendationClient;
use crate::translation::{LibreTranslateBackend, TranslationCache, TranslationResolver};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::translate,
        handlers::translate_batch,
        handlers::get_recommendations
    ),
    components(schemas(
        handlers::HealthCheckResponse,
        i18n::Locale,
        models::Product,
        models::RecommendationRequest,
        models::ShoppingInput,
        models::TranslateBatchRequest,
        models::TranslationResult,
        normalizer::DiscardedEntry,
        normalizer::Normalized,
        normalizer::RecommendationSource
    ))
)]
struct ApiDoc;

fn startup_error(context: &str, err: anyhow::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {:?}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    AppConfig::load_env_files();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = AppConfig::from_env();

    let bundle = StaticBundle::load().map_err(|e| startup_error("Failed to load translations", e))?;
    let backend = LibreTranslateBackend::new(&config)
        .map_err(|e| startup_error("Failed to build translation client", e))?;
    let recommendations = HttpRecommendationClient::new(&config)
        .map_err(|e| startup_error("Failed to build recommendation client", e))?;

    let state = Arc::new(AppState {
        resolver: TranslationResolver::new(
            Arc::new(bundle),
            Arc::new(TranslationCache::new()),
            Arc::new(backend),
        ),
        recommendations: Arc::new(recommendations),
    });

    let bind_address = config.bind_address();
    log::info!(
        "Starting ShopMatch API server at http://{} (translate={}, recommend={})",
        bind_address,
        config.translate_api_url,
        config.recommend_api_url
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .service(SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", ApiDoc::openapi()))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}

// Tiered text resolution: static bundle, then process cache, then remote translation

use crate::config::AppConfig;
use crate::i18n::{Locale, StaticBundle};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only map from `"{source text}_{locale}"` to translated text, alive for the
/// whole process.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<HashMap<String, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_key(source_text: &str, locale: Locale) -> String {
        format!("{}_{}", source_text, locale.code())
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: String, text: String) {
        self.entries.write().await.insert(key, text);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Remote machine translation.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, text: &str, source: Locale, target: Locale) -> Result<String>;
}

/// LibreTranslate-compatible HTTP backend.
pub struct LibreTranslateBackend {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateBackend {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.translate_api_url.clone(),
            api_key: config.translate_api_key.clone(),
        })
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateBackend {
    async fn translate(&self, text: &str, source: Locale, target: Locale) -> Result<String> {
        let mut payload = serde_json::json!({
            "q": text,
            "source": source.code(),
            "target": target.code(),
            "format": "text"
        });
        if let Some(key) = &self.api_key {
            payload["api_key"] = Value::String(key.clone());
        }

        let resp = self.client.post(&self.url).json(&payload).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Translation API error: {} {}", status, body));
        }

        let body: Value = resp.json().await?;
        translated_text(&body)
    }
}

fn translated_text(body: &Value) -> Result<String> {
    body.get("translatedText")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Translation API response missing translatedText: {}", body))
}

#[derive(Clone)]
pub struct TranslationResolver {
    bundle: Arc<StaticBundle>,
    cache: Arc<TranslationCache>,
    backend: Arc<dyn TranslationBackend>,
}

impl TranslationResolver {
    pub fn new(
        bundle: Arc<StaticBundle>,
        cache: Arc<TranslationCache>,
        backend: Arc<dyn TranslationBackend>,
    ) -> Self {
        Self {
            bundle,
            cache,
            backend,
        }
    }

    /**
     * resolve
     * Display text for `key` in `locale`. Never fails: a missing key falls back to the
     * key itself and a failed remote translation falls back to the English text.
     */
    pub async fn resolve(&self, locale: Locale, key: &str) -> String {
        if locale == Locale::En {
            return self.bundle.source_text(key).to_string();
        }
        if let Some(text) = self.bundle.get(locale, key).filter(|t| !t.is_empty()) {
            return text.to_string();
        }

        let source_text = self.bundle.source_text(key);
        self.translate_text(source_text, locale).await
    }

    /// Resolves each key in order through the same chain as [`Self::resolve`].
    pub async fn resolve_many(&self, locale: Locale, keys: &[String]) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let text = self.resolve(locale, key).await;
            out.push((key.clone(), text));
        }
        out
    }

    /// Translates English free text, consulting the cache first. Returns the text
    /// unchanged for `en` or when the remote call fails.
    pub async fn translate_text(&self, source_text: &str, locale: Locale) -> String {
        if locale == Locale::En {
            return source_text.to_string();
        }

        let cache_key = TranslationCache::cache_key(source_text, locale);
        if let Some(hit) = self.cache.get(&cache_key).await {
            log::debug!("Translation cache hit key={}", cache_key);
            return hit;
        }

        log::debug!("Translation cache miss key={}", cache_key);
        match self
            .backend
            .translate(source_text, Locale::En, locale)
            .await
        {
            Ok(text) => {
                self.cache.insert(cache_key, text.clone()).await;
                text
            }
            Err(e) => {
                log::warn!("Translation failed locale={} err={:?}", locale, e);
                source_text.to_string()
            }
        }
    }
}

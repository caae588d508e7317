//! HTTP catalog provider
//!
//! Queries `GET {url}?skyn_type4={code}` and expects
//! `{"data": {stage: [{"name": .., "ingredients": [..]}]}}`.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiCatalogResponse, ApprovedProducts},
    services::catalog::CatalogProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const CODE_QUERY_PARAM: &str = "skyn_type4";
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

#[derive(Clone)]
pub struct HttpCatalogProvider {
    http_client: HttpClient,
    api_url: String,
    max_retries: u32,
    cache: Option<(Cache, u64)>,
}

impl HttpCatalogProvider {
    pub fn new(api_url: String, timeout: Duration, max_retries: u32) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url,
            max_retries,
            cache: None,
        })
    }

    /// Caches catalog responses for `ttl` seconds
    pub fn with_cache(mut self, cache: Cache, ttl: u64) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    async fn fetch_once(&self, code: &str) -> AppResult<ApiCatalogResponse> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[(CODE_QUERY_PARAM, code)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CatalogUnavailable(format!(
                "Catalog returned status {}: {}",
                status, body
            )));
        }

        let catalog: ApiCatalogResponse = response.json().await?;
        Ok(catalog)
    }

    /// Fetches with exponential backoff between attempts
    async fn fetch_remote(&self, code: &str) -> AppResult<ApiCatalogResponse> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(code).await {
                Ok(catalog) => {
                    tracing::info!(
                        code = %code,
                        stages = catalog.data.len(),
                        products = catalog.data.values().map(Vec::len).sum::<usize>(),
                        provider = self.name(),
                        "Catalog fetched"
                    );
                    return Ok(catalog);
                }
                Err(e) if attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        code = %code,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Catalog fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(code = %code, error = %e, "Catalog fetch failed");
                    return Err(match e {
                        AppError::CatalogUnavailable(msg) => AppError::CatalogUnavailable(
                            format!("{} (taxonomy code {})", msg, code),
                        ),
                        other => other,
                    });
                }
            }
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.min(6))
}

#[async_trait::async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn fetch_approved(&self, code: &str) -> AppResult<ApprovedProducts> {
        let catalog: ApiCatalogResponse = match &self.cache {
            Some((cache, ttl)) => {
                let key = CacheKey::Catalog(code.to_string());
                let result: AppResult<ApiCatalogResponse> =
                    cached!(cache, key, *ttl, self.fetch_remote(code));
                result?
            }
            None => self.fetch_remote(code).await?,
        };

        Ok(catalog.into())
    }

    fn name(&self) -> &'static str {
        "http_catalog"
    }
}

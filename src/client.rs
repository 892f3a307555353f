use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AnalyticsError, Result};
use crate::model::{
    CustomerSalesRankingResponse, HealthStatus, HourlySalesTrendResponse,
    PopularProductsRankingResponse, ServiceInfo,
};
use crate::query::{AnalyticsSource, Query};

/// Join a server-relative path onto `base_url`. Absolute URLs pass through.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pull the human readable message out of an error body.
///
/// FastAPI answers `{"detail": "..."}` for raised errors and
/// `{"detail": [{"msg": "...", ...}]}` for validation failures.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct AnalyticsClient {
    client: Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a chart image returned in `graph_url`.
    pub fn graph_url(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    pub async fn fetch_customer_sales_ranking(
        &self,
        top_n: u32,
    ) -> Result<CustomerSalesRankingResponse> {
        self.get(&Query::CustomerSalesRanking { top_n }.path()).await
    }

    pub async fn fetch_popular_products_ranking(
        &self,
        top_n: u32,
    ) -> Result<PopularProductsRankingResponse> {
        self.get(&Query::PopularProductsRanking { top_n }.path())
            .await
    }

    pub async fn fetch_hourly_sales_trend(&self) -> Result<HourlySalesTrendResponse> {
        self.get(&Query::HourlySalesTrend.path()).await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    pub async fn service_info(&self) -> Result<ServiceInfo> {
        self.get("/").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = resolve_url(&self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = extract_detail(&String::from_utf8_lossy(&body));
            tracing::warn!("GET {} failed with HTTP {}", url, status.as_u16());
            return Err(AnalyticsError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

impl AnalyticsSource for AnalyticsClient {
    async fn customer_sales_ranking(&self, top_n: u32) -> Result<CustomerSalesRankingResponse> {
        self.fetch_customer_sales_ranking(top_n).await
    }

    async fn popular_products_ranking(&self, top_n: u32) -> Result<PopularProductsRankingResponse> {
        self.fetch_popular_products_ranking(top_n).await
    }

    async fn hourly_sales_trend(&self) -> Result<HourlySalesTrendResponse> {
        self.fetch_hourly_sales_trend().await
    }
}

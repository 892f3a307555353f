use crate::config::DEFAULT_TOP_N;
use crate::error::Result;
use crate::model::{
    AnalyticsResult, CustomerSalesRankingResponse, HourlySalesTrendResponse,
    PopularProductsRankingResponse,
};
use std::future::Future;

pub const CUSTOMER_SALES_RANKING_PATH: &str = "/api/v1/analytics/customer-sales-ranking";
pub const POPULAR_PRODUCTS_RANKING_PATH: &str = "/api/v1/analytics/popular-products-ranking";
pub const HOURLY_SALES_TREND_PATH: &str = "/api/v1/analytics/hourly-sales-trend";

/// Anything that can answer the three analytics queries.
///
/// The HTTP client is the production implementation; tests drive the
/// dashboard with in-memory sources.
pub trait AnalyticsSource {
    fn customer_sales_ranking(
        &self,
        top_n: u32,
    ) -> impl Future<Output = Result<CustomerSalesRankingResponse>> + Send;

    fn popular_products_ranking(
        &self,
        top_n: u32,
    ) -> impl Future<Output = Result<PopularProductsRankingResponse>> + Send;

    fn hourly_sales_trend(&self) -> impl Future<Output = Result<HourlySalesTrendResponse>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    CustomerSalesRanking { top_n: u32 },
    PopularProductsRanking { top_n: u32 },
    HourlySalesTrend,
}

impl Query {
    pub const fn customer_sales_ranking() -> Self {
        Query::CustomerSalesRanking {
            top_n: DEFAULT_TOP_N,
        }
    }

    pub const fn popular_products_ranking() -> Self {
        Query::PopularProductsRanking {
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Relative request path including the query string.
    pub fn path(&self) -> String {
        match self {
            Query::CustomerSalesRanking { top_n } => {
                format!("{}?top_n={}", CUSTOMER_SALES_RANKING_PATH, top_n)
            }
            Query::PopularProductsRanking { top_n } => {
                format!("{}?top_n={}", POPULAR_PRODUCTS_RANKING_PATH, top_n)
            }
            Query::HourlySalesTrend => HOURLY_SALES_TREND_PATH.to_string(),
        }
    }

    /// Button label in the dashboard's action list.
    pub fn label(&self) -> String {
        match self {
            Query::CustomerSalesRanking { .. } => "1. 顧客別の売上ランキング".to_string(),
            Query::PopularProductsRanking { top_n } => format!("2. 人気商品のトップ{}", top_n),
            Query::HourlySalesTrend => "3. 時間帯別の売上傾向".to_string(),
        }
    }

    pub fn with_top_n(self, top_n: u32) -> Self {
        match self {
            Query::CustomerSalesRanking { .. } => Query::CustomerSalesRanking { top_n },
            Query::PopularProductsRanking { .. } => Query::PopularProductsRanking { top_n },
            Query::HourlySalesTrend => Query::HourlySalesTrend,
        }
    }
}

/// Run `query` against `source` and tag the response with its kind.
pub async fn run_query<S: AnalyticsSource + Sync>(source: &S, query: Query) -> Result<AnalyticsResult> {
    Ok(match query {
        Query::CustomerSalesRanking { top_n } => source.customer_sales_ranking(top_n).await?.into(),
        Query::PopularProductsRanking { top_n } => {
            source.popular_products_ranking(top_n).await?.into()
        }
        Query::HourlySalesTrend => source.hourly_sales_trend().await?.into(),
    })
}

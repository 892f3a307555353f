use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalyticsError, Result};

/// Fields every analytics response carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub usecase: String,
    pub graph_url: String,
    pub total_records: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSales {
    pub rank: u32,
    pub customer_id: i64,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSalesRankingResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub top_n: u32,
    pub ranking: Vec<CustomerSales>,
    pub valid_customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub rank: u32,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularProductsRankingResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub top_n: u32,
    pub ranking: Vec<ProductQuantity>,
    pub valid_products: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlySales {
    pub hour: u8,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySalesTrendResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub data: Vec<HourlySales>,
    pub valid_records: u64,
    pub peak_hour: u8,
    pub peak_sales: f64,
    pub lowest_hour: u8,
    pub lowest_sales: f64,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    CustomerSalesRanking,
    PopularProductsRanking,
    HourlySalesTrend,
}

impl ResultKind {
    /// Classify an untagged payload by the fields it carries.
    pub fn detect(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.contains_key("data") && object.contains_key("peak_hour") {
            Some(ResultKind::HourlySalesTrend)
        } else if object.contains_key("valid_customers") {
            Some(ResultKind::CustomerSalesRanking)
        } else if object.contains_key("valid_products") {
            Some(ResultKind::PopularProductsRanking)
        } else {
            None
        }
    }

    pub fn table_title(self) -> &'static str {
        match self {
            ResultKind::HourlySalesTrend => "時間帯別詳細",
            _ => "ランキング詳細",
        }
    }
}

/// One completed query, tagged with the kind of response it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResult {
    CustomerSalesRanking(CustomerSalesRankingResponse),
    PopularProductsRanking(PopularProductsRankingResponse),
    HourlySalesTrend(HourlySalesTrendResponse),
}

impl AnalyticsResult {
    /// Decode a payload whose kind is not known up front.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = ResultKind::detect(&value).ok_or_else(|| {
            AnalyticsError::Decode(
                "payload matches none of the known analytics responses".to_string(),
            )
        })?;

        Ok(match kind {
            ResultKind::CustomerSalesRanking => {
                AnalyticsResult::CustomerSalesRanking(serde_json::from_value(value)?)
            }
            ResultKind::PopularProductsRanking => {
                AnalyticsResult::PopularProductsRanking(serde_json::from_value(value)?)
            }
            ResultKind::HourlySalesTrend => {
                AnalyticsResult::HourlySalesTrend(serde_json::from_value(value)?)
            }
        })
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            AnalyticsResult::CustomerSalesRanking(_) => ResultKind::CustomerSalesRanking,
            AnalyticsResult::PopularProductsRanking(_) => ResultKind::PopularProductsRanking,
            AnalyticsResult::HourlySalesTrend(_) => ResultKind::HourlySalesTrend,
        }
    }

    pub fn envelope(&self) -> &Envelope {
        match self {
            AnalyticsResult::CustomerSalesRanking(r) => &r.envelope,
            AnalyticsResult::PopularProductsRanking(r) => &r.envelope,
            AnalyticsResult::HourlySalesTrend(r) => &r.envelope,
        }
    }

    pub fn usecase(&self) -> &str {
        &self.envelope().usecase
    }

    pub fn graph_url(&self) -> &str {
        &self.envelope().graph_url
    }

    /// Number of rows in the detail table.
    pub fn row_count(&self) -> usize {
        match self {
            AnalyticsResult::CustomerSalesRanking(r) => r.ranking.len(),
            AnalyticsResult::PopularProductsRanking(r) => r.ranking.len(),
            AnalyticsResult::HourlySalesTrend(r) => r.data.len(),
        }
    }
}

impl From<CustomerSalesRankingResponse> for AnalyticsResult {
    fn from(r: CustomerSalesRankingResponse) -> Self {
        AnalyticsResult::CustomerSalesRanking(r)
    }
}

impl From<PopularProductsRankingResponse> for AnalyticsResult {
    fn from(r: PopularProductsRankingResponse) -> Self {
        AnalyticsResult::PopularProductsRanking(r)
    }
}

impl From<HourlySalesTrendResponse> for AnalyticsResult {
    fn from(r: HourlySalesTrendResponse) -> Self {
        AnalyticsResult::HourlySalesTrend(r)
    }
}

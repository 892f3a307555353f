pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod query;
pub mod report;
pub mod tui;

pub use client::AnalyticsClient;
pub use config::ApiConfig;
pub use error::{AnalyticsError, Result};
pub use model::{
    AnalyticsResult, CustomerSales, CustomerSalesRankingResponse, Envelope, HealthStatus,
    HourlySales, HourlySalesTrendResponse, PopularProductsRankingResponse, ProductQuantity,
    ResultKind, ServiceInfo,
};
pub use query::{AnalyticsSource, Query, run_query};
pub use report::Report;

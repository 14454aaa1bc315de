//! ML analytics gateway
//!
//! Client for the remote model-serving service plus the normalization layer
//! that converts its native vocabulary into the engine's stable output shape.
//! The remote/fallback choice is caller-orchestrated: the client raises
//! [`crate::error::Error::MlService`] on failure and the caller decides
//! whether to run the matching [`crate::fallback`] function.

mod client;
mod normalize;
pub mod types;

pub(crate) use client::current_month_spending;
pub use client::MlServiceClient;
pub use types::{
    AdaptiveBudgetReport, AnomalyItem, AnomalyReport, BudgetAlert, BudgetAllocation, BudgetBucket,
    CategoryBudget, CategoryForecast, CategoryInsight, CategoryInsightReport, DailyForecast,
    ForecastReport, MerchantTotal, Severity, Trend,
};

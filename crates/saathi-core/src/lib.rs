//! Saathi Core Library
//!
//! Transaction intelligence engine for the Saathi personal finance app:
//! - Deterministic category rule engine for noisy Indian transaction text
//!   (SMS parses, UPI handles, manual notes), with no per-user training data
//! - ML analytics gateway: anomaly detection, spend forecasting, adaptive
//!   budgeting, and category insights from the remote model service
//! - Statistical fallback suite: pure local computations for each analytics
//!   operation when the ML service is unreachable
//! - Bank SMS / UPI message parser
//! - Weighted multi-factor financial health score
//!
//! The remote/fallback choice is caller-orchestrated: gateway errors carry
//! the HTTP status and body, and the caller decides whether to degrade to
//! the matching `fallback` function or surface the outage.

pub mod categorize;
pub mod error;
pub mod fallback;
pub mod ml;
pub mod models;
pub mod money;
pub mod score;
pub mod sms;

/// Test utilities (transaction fixtures)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{resolve_category, suggest_category, CategorySuggestion, Confidence};
pub use error::{Error, Result};
pub use fallback::{
    fallback_adaptive_budget, fallback_anomaly_detection, fallback_category_insights,
    fallback_forecast, DEFAULT_FORECAST_DAYS,
};
pub use ml::{
    AdaptiveBudgetReport, AnomalyItem, AnomalyReport, BudgetAlert, BudgetAllocation, BudgetBucket,
    CategoryBudget, CategoryForecast, CategoryInsight, CategoryInsightReport, DailyForecast,
    ForecastReport, MerchantTotal, MlServiceClient, Severity, Trend,
};
pub use models::{Budget, Category, Goal, IncomeRange, Transaction, TransactionType};
pub use score::{health_score, FactorScore, FactorStatus, Grade, HealthFactors, HealthScoreReport};
pub use sms::{parse_bank_sms, parse_sms_batch, ParsedSms, SmsBatchResult, SmsBatchStats, SmsSource};

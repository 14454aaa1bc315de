//! HTTP client for the ML analytics service
//!
//! Thin, single-attempt gateway: every call carries a hard timeout and a
//! non-success status becomes [`Error::MlService`] with the body verbatim.
//! There is no retry and no internal fallback. Callers that want to degrade
//! gracefully catch the error and run the matching function from
//! [`crate::fallback`]; remote downtime stays visible instead of being
//! silently papered over.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Budget, IncomeRange, Transaction};

use super::normalize;
use super::types::{
    AdaptiveBudgetReport, AdaptiveBudgetRequest, AnomalyReport, AnomalyRequest,
    CategoryInsightReport, CategoryInsightsRequest, ForecastReport, ForecastRequest,
    RawAdaptiveBudgetResponse, RawAnomalyResponse, RawCategoryInsightsResponse,
    RawForecastResponse, WireBudget, WireTransaction,
};

/// Analytics calls get a generous budget; health probes must answer fast.
const ANALYTICS_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the ML analytics service
pub struct MlServiceClient {
    http: Client,
    base_url: String,
}

impl Clone for MlServiceClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl MlServiceClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from the `ML_SERVICE_URL` environment variable.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("ML_SERVICE_URL").ok()?;
        Some(Self::new(&url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `/health`. Any failure (timeout, connect error, non-2xx) is
    /// reported as unhealthy rather than an error.
    pub async fn check_health(&self) -> bool {
        let result = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("ML service health check failed: {}", e);
                false
            }
        }
    }

    /// Detect spend anomalies over the supplied history.
    pub async fn detect_anomalies(&self, transactions: &[Transaction]) -> Result<AnomalyReport> {
        let request = AnomalyRequest {
            transactions: project(transactions),
        };
        let raw: RawAnomalyResponse = self.post_json("/anomalies", &request).await?;
        Ok(normalize::anomaly_report(raw))
    }

    /// Forecast upcoming spend, with alerts against the supplied budgets.
    pub async fn forecast(
        &self,
        transactions: &[Transaction],
        budgets: &[Budget],
    ) -> Result<ForecastReport> {
        let request = ForecastRequest {
            transactions: project(transactions),
            budgets: budgets
                .iter()
                .map(|b| WireBudget {
                    category: b.category.clone(),
                    limit: b.limit,
                })
                .collect(),
        };
        let raw: RawForecastResponse = self.post_json("/forecast", &request).await?;
        Ok(normalize::forecast_report(raw))
    }

    /// Recommend a budget split for the given income.
    ///
    /// `current_spending` is derived from the calendar month containing
    /// `today`; the income range is forwarded when supplied and bracketed
    /// from the income otherwise.
    pub async fn adaptive_budget(
        &self,
        transactions: &[Transaction],
        monthly_income: f64,
        income_range: Option<IncomeRange>,
        today: NaiveDate,
    ) -> Result<AdaptiveBudgetReport> {
        let current_spending = current_month_spending(transactions, today);
        let range = income_range.unwrap_or_else(|| IncomeRange::from_monthly_income(monthly_income));

        let request = AdaptiveBudgetRequest {
            income_range: range.as_str().to_string(),
            monthly_income,
            current_spending: current_spending.clone(),
        };
        let raw: RawAdaptiveBudgetResponse = self.post_json("/adaptive-budget", &request).await?;
        Ok(normalize::adaptive_budget_report(
            raw,
            monthly_income,
            &current_spending,
        ))
    }

    /// Per-category and per-merchant behavioral insights.
    pub async fn category_insights(
        &self,
        transactions: &[Transaction],
    ) -> Result<CategoryInsightReport> {
        let request = CategoryInsightsRequest {
            transactions: project(transactions),
        };
        let raw: RawCategoryInsightsResponse =
            self.post_json("/category-insights", &request).await?;
        Ok(normalize::category_insight_report(raw))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .timeout(ANALYTICS_TIMEOUT)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                endpoint,
                status = status.as_u16(),
                "ML service returned an error"
            );
            return Err(Error::MlService {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Project transactions down to the wire shape the ML contract needs.
fn project(transactions: &[Transaction]) -> Vec<WireTransaction> {
    transactions
        .iter()
        .map(|t| WireTransaction {
            amount: t.amount,
            category: t.category.clone(),
            date: t.date,
            merchant: t.merchant_or_description().to_string(),
            tx_type: t.tx_type,
        })
        .collect()
}

/// Expense totals per category for the calendar month containing `today`.
pub(crate) fn current_month_spending(
    transactions: &[Transaction],
    today: NaiveDate,
) -> BTreeMap<String, f64> {
    let month_start = today.with_day(1).expect("day 1 always valid");
    let mut spending: BTreeMap<String, f64> = BTreeMap::new();
    for t in transactions {
        if t.is_expense() && t.date >= month_start && t.date <= today {
            *spending.entry(t.category.clone()).or_insert(0.0) += t.amount;
        }
    }
    spending
}

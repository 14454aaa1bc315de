//! ML service wire contract and public analytics result types
//!
//! Raw types mirror the remote payloads field-for-field (camelCase on the
//! wire) and tolerate partial payloads via `#[serde(default)]`. Public report
//! types use the engine's closed vocabulary; the normalizer is the only code
//! that converts between the two.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::TransactionType;

// ---------------------------------------------------------------------------
// Public vocabulary
// ---------------------------------------------------------------------------

/// Anomaly severity, in the engine's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Spending direction over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

/// Which 50/30/20 bucket a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBucket {
    Needs,
    Wants,
    Savings,
    Other,
}

impl BudgetBucket {
    /// Classify a category label into its budget bucket.
    pub fn for_category(category: &str) -> Self {
        const NEEDS: &[&str] = &[
            "Rent",
            "Groceries",
            "Utilities",
            "Transport",
            "Health",
            "Education",
            "EMI",
            "Insurance",
            "Mobile Recharge",
            "Fuel",
        ];
        const WANTS: &[&str] = &[
            "Food",
            "Shopping",
            "Entertainment",
            "Clothing",
            "Electronics",
            "Subscription",
            "Personal Care",
            "Festival",
            "Pooja",
            "Gifts",
            "Autorickshaw",
        ];
        const SAVINGS: &[&str] = &["Investment", "Savings"];

        if NEEDS.contains(&category) {
            Self::Needs
        } else if WANTS.contains(&category) {
            Self::Wants
        } else if SAVINGS.contains(&category) {
            Self::Savings
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for BudgetBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Needs" => Ok(Self::Needs),
            "Wants" => Ok(Self::Wants),
            "Savings" => Ok(Self::Savings),
            _ => Ok(Self::Other),
        }
    }
}

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

/// A single spend anomaly, produced fresh per analysis call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyItem {
    pub category: String,
    pub amount: f64,
    pub severity: Severity,
    pub reason: String,
    pub description: String,
    pub avg_spending: f64,
    /// Multiplier over the category average (current / average)
    pub deviation: f64,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub model: String,
    pub anomalies: Vec<AnomalyItem>,
    pub total_anomalies: usize,
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
    pub is_actual: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForecast {
    pub category: String,
    pub predicted: f64,
    pub spent_so_far: f64,
    pub daily_rate: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    pub category: String,
    pub budget: f64,
    pub predicted: f64,
    pub overshoot: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub model: String,
    pub total_predicted: f64,
    pub daily_forecast: Vec<DailyForecast>,
    pub category_forecasts: Vec<CategoryForecast>,
    pub budget_alerts: Vec<BudgetAlert>,
    pub insight: String,
    pub historical_avg: f64,
}

// ---------------------------------------------------------------------------
// Adaptive budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category: String,
    pub budget: f64,
    pub current_spending: f64,
    pub bucket: BudgetBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveBudgetReport {
    pub rule: String,
    pub estimated_income: f64,
    pub allocation: BudgetAllocation,
    pub category_budgets: Vec<CategoryBudget>,
    pub tips: Vec<String>,
}

// ---------------------------------------------------------------------------
// Category insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantTotal {
    pub merchant: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInsight {
    pub category: String,
    pub total_spent: f64,
    pub avg_amount: f64,
    pub transaction_count: usize,
    pub trend: Trend,
    pub top_merchants: Vec<MerchantTotal>,
    pub saving_tip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInsightReport {
    pub model: String,
    pub categories: Vec<CategoryInsight>,
}

// ---------------------------------------------------------------------------
// Requests (engine -> ML service)
// ---------------------------------------------------------------------------

/// Projection of a [`crate::models::Transaction`] down to the fields the ML
/// contract needs. Keeps payloads small and decouples the wire shape from
/// the full transaction.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct WireTransaction {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub merchant: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnomalyRequest {
    pub transactions: Vec<WireTransaction>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireBudget {
    pub category: String,
    pub limit: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForecastRequest {
    pub transactions: Vec<WireTransaction>,
    pub budgets: Vec<WireBudget>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdaptiveBudgetRequest {
    pub income_range: String,
    pub monthly_income: f64,
    pub current_spending: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryInsightsRequest {
    pub transactions: Vec<WireTransaction>,
}

// ---------------------------------------------------------------------------
// Raw responses (ML service -> engine)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAnomalyResponse {
    #[serde(default)]
    pub anomalies: Vec<RawCategoryAnomaly>,
    #[serde(default)]
    pub large_transactions: Vec<RawLargeTransaction>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategoryAnomaly {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current_spend: f64,
    #[serde(default)]
    pub average_spend: f64,
    #[serde(default)]
    pub multiplier: f64,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLargeTransaction {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    /// Day-precision date, but the service may append a time component;
    /// parsed leniently during normalization.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawForecastResponse {
    #[serde(default)]
    pub daily_forecast: Vec<RawDailyPoint>,
    #[serde(default)]
    pub category_forecasts: Vec<RawCategoryForecast>,
    #[serde(default)]
    pub budget_alerts: Vec<RawBudgetAlert>,
    #[serde(default)]
    pub projection: Option<RawProjection>,
    #[serde(default)]
    pub current_month: Option<RawCurrentMonth>,
    #[serde(default)]
    pub historical_avg: f64,
    #[serde(default)]
    pub insight: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDailyPoint {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub yhat: Option<f64>,
    // The service keeps the model's native snake_case for the band fields.
    #[serde(default, rename = "yhat_lower")]
    pub yhat_lower: Option<f64>,
    #[serde(default, rename = "yhat_upper")]
    pub yhat_upper: Option<f64>,
    #[serde(default)]
    pub is_actual: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategoryForecast {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub spent_so_far: f64,
    #[serde(default)]
    pub projected_total: f64,
    #[serde(default)]
    pub daily_rate: f64,
    #[serde(default)]
    pub trend: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBudgetAlert {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub budget_limit: f64,
    #[serde(default)]
    pub projected_spend: f64,
    #[serde(default)]
    pub projected_overage: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProjection {
    #[serde(default)]
    pub projected: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCurrentMonth {
    #[serde(default)]
    pub total_spent_so_far: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAdaptiveBudgetResponse {
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub recommended: Option<RawRecommended>,
    #[serde(default)]
    pub category_allocations: Vec<RawCategoryAllocation>,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRecommended {
    #[serde(default)]
    pub needs: Option<RawBucketRecommendation>,
    #[serde(default)]
    pub wants: Option<RawBucketRecommendation>,
    #[serde(default)]
    pub savings: Option<RawBucketRecommendation>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawBucketRecommendation {
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategoryAllocation {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current_spend: f64,
    #[serde(default)]
    pub bucket: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategoryInsightsResponse {
    #[serde(default)]
    pub category_patterns: Vec<RawCategoryPattern>,
    #[serde(default)]
    pub merchant_insights: Vec<RawMerchantInsight>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCategoryPattern {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub monthly_average: f64,
    #[serde(default)]
    pub trend: String,
    #[serde(default)]
    pub total_transactions: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMerchantInsight {
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub total_spent: f64,
}

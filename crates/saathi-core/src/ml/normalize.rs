//! Response normalization: ML service vocabulary -> engine vocabulary
//!
//! These mapping tables are the integration contract with the ML service and
//! must not drift:
//!
//! - severity: `critical` -> high, `warning` -> medium, anything else -> low
//! - trend: `increasing` -> up, `decreasing` -> down, anything else -> stable
//!
//! Normalization is best-effort: missing upstream fields default (an absent
//! average is 0, an absent overshoot is projected - limit) instead of failing.
//! Currency is rounded to whole rupees here; internal math keeps precision.

use std::collections::BTreeMap;

use crate::money::format_inr;

use super::types::{
    AdaptiveBudgetReport, AnomalyItem, AnomalyReport, BudgetAlert, BudgetAllocation, BudgetBucket,
    CategoryBudget, CategoryForecast, CategoryInsight, CategoryInsightReport, DailyForecast,
    ForecastReport, MerchantTotal, RawAdaptiveBudgetResponse, RawAnomalyResponse,
    RawCategoryInsightsResponse, RawForecastResponse, Severity, Trend,
};

/// Lenient day-precision date parse: accepts `YYYY-MM-DD` with or without a
/// trailing time component.
pub(crate) fn parse_day(raw: &str) -> Option<chrono::NaiveDate> {
    raw.get(..10)?.parse().ok()
}

pub(crate) fn severity_from_remote(raw: &str) -> Severity {
    match raw {
        "critical" => Severity::High,
        "warning" => Severity::Medium,
        _ => Severity::Low,
    }
}

pub(crate) fn trend_from_remote(raw: &str) -> Trend {
    match raw {
        "increasing" => Trend::Up,
        "decreasing" => Trend::Down,
        _ => Trend::Stable,
    }
}

/// Percent deviation of `current` from `average`, guarding a zero average by
/// treating it as 1.
pub(crate) fn deviation_percent(current: f64, average: f64) -> f64 {
    let base = if average == 0.0 { 1.0 } else { average };
    (((current - average) / base) * 100.0).round()
}

/// Severity of a single large transaction, by absolute size.
pub(crate) fn large_transaction_severity(amount: f64) -> Severity {
    if amount > 50_000.0 {
        Severity::High
    } else if amount > 10_000.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Trend derived from how far the projection runs ahead of actual spend.
/// Used when the upstream payload omits an explicit trend.
pub(crate) fn derive_forecast_trend(projected: f64, spent_so_far: f64) -> Trend {
    if projected > spent_so_far * 1.2 {
        Trend::Up
    } else if projected < spent_so_far * 0.8 {
        Trend::Down
    } else {
        Trend::Stable
    }
}

pub(crate) fn anomaly_report(raw: RawAnomalyResponse) -> AnomalyReport {
    let mut anomalies: Vec<AnomalyItem> = Vec::new();

    for a in raw.anomalies {
        let reason = a
            .message
            .unwrap_or_else(|| format!("{} spending is {}x above normal", a.category, a.multiplier));
        let suggestion = if a.severity == "critical" {
            format!(
                "Review your {} expenses and identify non-essential spending to cut back.",
                a.category
            )
        } else {
            format!(
                "Monitor {} spending, it's trending higher than usual.",
                a.category
            )
        };
        anomalies.push(AnomalyItem {
            description: format!(
                "Amount ₹{} exceeds category average of ₹{} by {}%",
                format_inr(a.current_spend),
                format_inr(a.average_spend),
                deviation_percent(a.current_spend, a.average_spend)
            ),
            category: a.category,
            amount: a.current_spend.round(),
            severity: severity_from_remote(&a.severity),
            reason,
            avg_spending: a.average_spend.round(),
            deviation: a.multiplier,
            date: None,
            merchant: None,
            suggestion,
        });
    }

    for lt in raw.large_transactions {
        let category = lt.category.unwrap_or_else(|| "Other".to_string());
        let reason = lt
            .message
            .unwrap_or_else(|| format!("Large expense of ₹{}", format_inr(lt.amount)));
        let description = match &lt.merchant {
            Some(m) => format!("Unusually large {} transaction at {}", category, m),
            None => format!("Unusually large {} transaction", category),
        };
        anomalies.push(AnomalyItem {
            category,
            amount: lt.amount.round(),
            severity: large_transaction_severity(lt.amount),
            reason,
            description,
            avg_spending: 0.0,
            deviation: 0.0,
            date: lt.date.as_deref().and_then(parse_day),
            merchant: lt.merchant,
            suggestion: format!(
                "Check if this ₹{} expense was planned or can be avoided next time.",
                format_inr(lt.amount)
            ),
        });
    }

    AnomalyReport {
        model: raw
            .model
            .unwrap_or_else(|| "IsolationForest-v2".to_string()),
        total_anomalies: anomalies.len(),
        anomalies,
    }
}

pub(crate) fn forecast_report(raw: RawForecastResponse) -> ForecastReport {
    let daily_forecast: Vec<DailyForecast> = raw
        .daily_forecast
        .into_iter()
        .filter_map(|d| {
            let date = d.date.as_deref().and_then(parse_day)?;
            let predicted = d.yhat.unwrap_or(d.amount);
            Some(DailyForecast {
                date,
                predicted: predicted.round(),
                lower: d.yhat_lower.unwrap_or(d.amount * 0.7).max(0.0).round(),
                upper: d.yhat_upper.unwrap_or(d.amount * 1.3).round(),
                is_actual: d.is_actual,
            })
        })
        .collect();

    let category_forecasts: Vec<CategoryForecast> = raw
        .category_forecasts
        .into_iter()
        .map(|cf| CategoryForecast {
            trend: match cf.trend.as_deref() {
                Some(t) => trend_from_remote(t),
                None => derive_forecast_trend(cf.projected_total, cf.spent_so_far),
            },
            category: cf.category,
            predicted: cf.projected_total.round(),
            spent_so_far: cf.spent_so_far.round(),
            daily_rate: cf.daily_rate.round(),
        })
        .collect();

    let budget_alerts: Vec<BudgetAlert> = raw
        .budget_alerts
        .into_iter()
        .map(|ba| BudgetAlert {
            overshoot: ba
                .projected_overage
                .unwrap_or(ba.projected_spend - ba.budget_limit)
                .max(0.0)
                .round(),
            category: ba.category,
            budget: ba.budget_limit.round(),
            predicted: ba.projected_spend.round(),
        })
        .collect();

    let total_predicted = raw
        .projection
        .map(|p| p.projected)
        .or_else(|| raw.current_month.map(|m| m.total_spent_so_far))
        .unwrap_or(0.0)
        .round();

    ForecastReport {
        model: raw.model.unwrap_or_else(|| "ML Forecast".to_string()),
        total_predicted,
        daily_forecast,
        category_forecasts,
        budget_alerts,
        insight: raw.insight,
        historical_avg: raw.historical_avg.round(),
    }
}

pub(crate) fn adaptive_budget_report(
    raw: RawAdaptiveBudgetResponse,
    monthly_income: f64,
    current_spending: &BTreeMap<String, f64>,
) -> AdaptiveBudgetReport {
    let recommended = raw.recommended.unwrap_or_default();
    let bucket_amount = |rec: Option<super::types::RawBucketRecommendation>, share: f64| {
        rec.map(|r| r.amount)
            .filter(|a| *a > 0.0)
            .unwrap_or(monthly_income * share)
            .round()
    };

    let allocation = BudgetAllocation {
        needs: bucket_amount(recommended.needs, 0.5),
        wants: bucket_amount(recommended.wants, 0.3),
        savings: bucket_amount(recommended.savings, 0.2),
    };

    // Each category's budget is its bucket's allocation split evenly across
    // however many distinct categories the user spent in this month.
    let divisor = current_spending.len().max(1) as f64;
    let category_budgets: Vec<CategoryBudget> = raw
        .category_allocations
        .into_iter()
        .map(|ca| {
            let bucket: BudgetBucket = ca
                .bucket
                .as_deref()
                .unwrap_or("Other")
                .parse()
                .unwrap_or(BudgetBucket::Other);
            let share = match bucket {
                BudgetBucket::Needs => 0.5,
                BudgetBucket::Wants => 0.3,
                BudgetBucket::Savings | BudgetBucket::Other => 0.2,
            };
            CategoryBudget {
                category: ca.category,
                budget: (monthly_income * share / divisor).round(),
                current_spending: ca.current_spend.round(),
                bucket,
            }
        })
        .collect();

    AdaptiveBudgetReport {
        rule: raw.rule.unwrap_or_else(|| "50/30/20".to_string()),
        estimated_income: raw.monthly_income.unwrap_or(monthly_income).round(),
        allocation,
        category_budgets,
        tips: raw.insights,
    }
}

pub(crate) fn category_insight_report(raw: RawCategoryInsightsResponse) -> CategoryInsightReport {
    // Top merchants per category, from the merchant-level insights.
    let mut merchants_by_category: BTreeMap<String, Vec<MerchantTotal>> = BTreeMap::new();
    for mi in raw.merchant_insights {
        let category = mi.category.unwrap_or_else(|| "Other".to_string());
        merchants_by_category
            .entry(category)
            .or_default()
            .push(MerchantTotal {
                merchant: mi.merchant,
                total: mi.total_spent.round(),
            });
    }

    let mut categories: Vec<CategoryInsight> = raw
        .category_patterns
        .into_iter()
        .map(|cp| {
            let top_merchants = merchants_by_category
                .get(&cp.category)
                .map(|m| m.iter().take(3).cloned().collect())
                .unwrap_or_default();
            let saving_tip = (cp.trend == "increasing").then(|| {
                format!(
                    "Your {} spending is rising. Consider setting a monthly budget.",
                    cp.category
                )
            });
            CategoryInsight {
                // Approximate total from the monthly average over the data
                // window the service analyzes.
                total_spent: (cp.monthly_average * 6.0).round(),
                avg_amount: cp.monthly_average.round(),
                transaction_count: cp.total_transactions,
                trend: trend_from_remote(&cp.trend),
                top_merchants,
                saving_tip,
                category: cp.category,
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    CategoryInsightReport {
        model: raw
            .model
            .unwrap_or_else(|| "PatternDetection-v1".to_string()),
        categories,
    }
}

//! Statistical fallback suite
//!
//! Local replacements for the ML service endpoints, used when the service is
//! unreachable or intentionally bypassed. Every function here is pure: no
//! network, no clock (callers pass `today`), same input always produces the
//! same output. Sparse history yields degenerate-but-valid results (empty
//! anomaly lists, zero averages), which are correct outputs, not errors.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::ml::types::{
    AdaptiveBudgetReport, AnomalyItem, AnomalyReport, BudgetAllocation, BudgetBucket,
    CategoryBudget, CategoryForecast, CategoryInsight, CategoryInsightReport, DailyForecast,
    ForecastReport, MerchantTotal, Severity, Trend,
};
use crate::money::format_inr;
use crate::models::Transaction;

/// Default forecast horizon, matching the ML service's.
pub const DEFAULT_FORECAST_DAYS: u32 = 30;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (the anomaly threshold is a population
/// statistic over the user's own history, not a sample estimate).
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Flag expense transactions sitting more than two standard deviations above
/// their category's mean. Three deviations escalates to high severity.
///
/// A category with a single transaction has `std = 0`, so its threshold
/// equals that lone amount and nothing is flagged until a later transaction
/// in the category exceeds it. That is expected behavior for this detector,
/// not a bug.
pub fn fallback_anomaly_detection(transactions: &[Transaction]) -> AnomalyReport {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();

    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in &expenses {
        by_category.entry(&t.category).or_default().push(t.amount);
    }

    let mut anomalies: Vec<AnomalyItem> = Vec::new();

    for (category, amounts) in &by_category {
        let mean = mean(amounts);
        let std = std_dev(amounts, mean);
        let threshold = mean + 2.0 * std;

        for t in expenses.iter().filter(|t| t.category == *category) {
            if t.amount > threshold {
                let severity = if t.amount > mean + 3.0 * std {
                    Severity::High
                } else {
                    Severity::Medium
                };
                let deviation_pct = (((t.amount - mean) / mean) * 100.0).round();
                anomalies.push(AnomalyItem {
                    category: t.category.clone(),
                    amount: t.amount,
                    severity,
                    reason: format!(
                        "Amount ₹{} exceeds category average of ₹{} by {}%",
                        format_inr(t.amount),
                        format_inr(mean),
                        deviation_pct
                    ),
                    description: format!("Unusually high {} expense", category),
                    avg_spending: mean.round(),
                    deviation: (t.amount / mean * 10.0).round() / 10.0,
                    date: Some(t.date),
                    merchant: t.merchant.clone(),
                    suggestion: format!(
                        "Review your {} spending to identify savings opportunities.",
                        category
                    ),
                });
            }
        }
    }

    anomalies.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    AnomalyReport {
        model: "Statistical fallback (mean + 2σ)".to_string(),
        total_anomalies: anomalies.len(),
        anomalies,
    }
}

/// Flat projection of future spend from the historical daily average.
///
/// This is an explicit simplicity trade-off against the remote model: no
/// trend, no seasonality, a constant `avg_daily` for every future day with a
/// fixed ×0.7 / ×1.3 uncertainty band. Category trend is always `Stable`
/// (trend detection is a remote-model capability).
pub fn fallback_forecast(
    transactions: &[Transaction],
    days: u32,
    today: NaiveDate,
) -> ForecastReport {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();

    let mut daily_totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in &expenses {
        *daily_totals.entry(t.date).or_insert(0.0) += t.amount;
    }

    let daily_amounts: Vec<f64> = daily_totals.values().copied().collect();
    let avg_daily = mean(&daily_amounts);

    let daily_forecast: Vec<DailyForecast> = (1..=days as i64)
        .map(|i| DailyForecast {
            date: today + Duration::days(i),
            predicted: avg_daily.round(),
            lower: (avg_daily * 0.7).round(),
            upper: (avg_daily * 1.3).round(),
            is_actual: false,
        })
        .collect();

    let mut category_amounts: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in &expenses {
        category_amounts.entry(&t.category).or_default().push(t.amount);
    }

    let mut category_forecasts: Vec<CategoryForecast> = category_amounts
        .iter()
        .map(|(category, amounts)| {
            let avg = mean(amounts);
            let total: f64 = amounts.iter().sum();
            CategoryForecast {
                category: category.to_string(),
                predicted: (avg * 30.0).round(),
                spent_so_far: total.round(),
                daily_rate: avg.round(),
                trend: Trend::Stable,
            }
        })
        .collect();
    category_forecasts.sort_by(|a, b| {
        b.predicted
            .partial_cmp(&a.predicted)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_predicted = (avg_daily * days as f64).round();

    ForecastReport {
        model: "Linear projection fallback".to_string(),
        total_predicted,
        daily_forecast,
        category_forecasts,
        budget_alerts: Vec::new(),
        insight: format!(
            "Based on your average daily spending of ₹{}, you're projected to spend ₹{} over the next {} days.",
            format_inr(avg_daily),
            format_inr(avg_daily * days as f64),
            days
        ),
        historical_avg: (avg_daily * 30.0).round(),
    }
}

/// 50/30/20 rule-of-thumb budget from monthly income.
///
/// Category sub-budgets split each bucket's allocation evenly across however
/// many distinct categories the user actually spent in during the calendar
/// month containing `today`, so the per-category figure depends on observed
/// spending breadth.
pub fn fallback_adaptive_budget(
    transactions: &[Transaction],
    monthly_income: f64,
    today: NaiveDate,
) -> AdaptiveBudgetReport {
    let spending = crate::ml::current_month_spending(transactions, today);

    let allocation = BudgetAllocation {
        needs: (monthly_income * 0.5).round(),
        wants: (monthly_income * 0.3).round(),
        savings: (monthly_income * 0.2).round(),
    };

    let divisor = spending.len().max(1) as f64;
    let mut needs_spent = 0.0;
    let mut wants_spent = 0.0;
    let mut savings_spent = 0.0;

    let category_budgets: Vec<CategoryBudget> = spending
        .iter()
        .map(|(category, spent)| {
            let bucket = BudgetBucket::for_category(category);
            let share = match bucket {
                BudgetBucket::Needs => {
                    needs_spent += spent;
                    0.5
                }
                BudgetBucket::Wants => {
                    wants_spent += spent;
                    0.3
                }
                BudgetBucket::Savings => {
                    savings_spent += spent;
                    0.2
                }
                BudgetBucket::Other => 0.2,
            };
            CategoryBudget {
                category: category.clone(),
                budget: (monthly_income * share / divisor).round(),
                current_spending: spent.round(),
                bucket,
            }
        })
        .collect();

    let mut tips: Vec<String> = Vec::new();
    if needs_spent > allocation.needs {
        tips.push(format!(
            "Your needs spending (₹{}) exceeds the recommended ₹{}. Look for ways to reduce fixed costs.",
            format_inr(needs_spent),
            format_inr(allocation.needs)
        ));
    }
    if wants_spent > allocation.wants {
        tips.push(format!(
            "Your wants spending (₹{}) exceeds the recommended ₹{}. Try cutting discretionary expenses by ₹{}.",
            format_inr(wants_spent),
            format_inr(allocation.wants),
            format_inr(wants_spent - allocation.wants)
        ));
    }
    if savings_spent < allocation.savings {
        let deficit = allocation.savings - savings_spent;
        tips.push(format!(
            "You're saving ₹{} less than recommended. Even ₹{}/month in a SIP can compound significantly.",
            format_inr(deficit),
            format_inr(deficit.min(500.0))
        ));
    }
    if tips.is_empty() {
        tips.push(
            "Great job! Your spending aligns well with the recommended budget framework."
                .to_string(),
        );
    }

    AdaptiveBudgetReport {
        rule: "50/30/20".to_string(),
        estimated_income: monthly_income.round(),
        allocation,
        category_budgets,
        tips,
    }
}

/// Per-category spending aggregation with a coarse month-over-month trend.
///
/// Trend compares the last calendar month's total against the first (ratio
/// above 1.2 is rising, below 0.8 falling); with less than two months of
/// history it stays `Stable`.
pub fn fallback_category_insights(transactions: &[Transaction]) -> CategoryInsightReport {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();

    struct CategoryAccumulator {
        amounts: Vec<f64>,
        monthly: BTreeMap<(i32, u32), f64>,
        merchants: BTreeMap<String, f64>,
    }

    let mut by_category: BTreeMap<&str, CategoryAccumulator> = BTreeMap::new();
    for t in &expenses {
        let acc = by_category
            .entry(&t.category)
            .or_insert_with(|| CategoryAccumulator {
                amounts: Vec::new(),
                monthly: BTreeMap::new(),
                merchants: BTreeMap::new(),
            });
        acc.amounts.push(t.amount);
        *acc.monthly
            .entry((t.date.year(), t.date.month()))
            .or_insert(0.0) += t.amount;
        if let Some(merchant) = t.merchant.as_deref().filter(|m| !m.is_empty()) {
            *acc.merchants.entry(merchant.to_string()).or_insert(0.0) += t.amount;
        }
    }

    let mut categories: Vec<CategoryInsight> = by_category
        .iter()
        .map(|(category, acc)| {
            let total: f64 = acc.amounts.iter().sum();
            let avg = mean(&acc.amounts);

            let trend = if acc.monthly.len() >= 2 {
                let first = *acc.monthly.values().next().expect("non-empty");
                let last = *acc.monthly.values().last().expect("non-empty");
                if last > first * 1.2 {
                    Trend::Up
                } else if last < first * 0.8 {
                    Trend::Down
                } else {
                    Trend::Stable
                }
            } else {
                Trend::Stable
            };

            let mut top_merchants: Vec<MerchantTotal> = acc
                .merchants
                .iter()
                .map(|(merchant, total)| MerchantTotal {
                    merchant: merchant.clone(),
                    total: total.round(),
                })
                .collect();
            top_merchants.sort_by(|a, b| {
                b.total
                    .partial_cmp(&a.total)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            top_merchants.truncate(3);

            let saving_tip = (trend == Trend::Up).then(|| {
                format!(
                    "Your {} spending is rising. Consider setting a monthly budget.",
                    category
                )
            });

            CategoryInsight {
                category: category.to_string(),
                total_spent: total.round(),
                avg_amount: avg.round(),
                transaction_count: acc.amounts.len(),
                trend,
                top_merchants,
                saving_tip,
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    CategoryInsightReport {
        model: "Statistical fallback (pattern aggregation)".to_string(),
        categories,
    }
}

//! Financial health score
//!
//! Weighted multi-factor composite over the user's transactions, goals, and
//! budgets. Six factors, fixed weights:
//!
//! | factor               | weight |
//! |----------------------|--------|
//! | savings rate         | 25%    |
//! | goal progress        | 20%    |
//! | budget discipline    | 20%    |
//! | debt-to-income (EMI) | 15%    |
//! | emergency fund       | 10%    |
//! | spending consistency | 10%    |
//!
//! Pure: the caller supplies `today`, so the same inputs always score the
//! same.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Budget, Goal, Transaction};

/// Composite grade bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsAttention => "Needs Attention",
        }
    }

    fn for_score(score: u32) -> Self {
        if score >= 80 {
            Self::Excellent
        } else if score >= 65 {
            Self::Good
        } else if score >= 45 {
            Self::Fair
        } else {
            Self::NeedsAttention
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorStatus {
    Great,
    Moderate,
    NeedsImprovement,
}

impl FactorStatus {
    fn for_score(score: u32) -> Self {
        if score >= 70 {
            Self::Great
        } else if score >= 40 {
            Self::Moderate
        } else {
            Self::NeedsImprovement
        }
    }
}

/// One factor's contribution to the composite
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorScore {
    pub score: u32,
    pub weight: f64,
    pub status: FactorStatus,
}

impl FactorScore {
    fn new(score: u32, weight: f64) -> Self {
        Self {
            score,
            weight,
            status: FactorStatus::for_score(score),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthFactors {
    pub savings_rate: FactorScore,
    pub goal_progress: FactorScore,
    pub budget_discipline: FactorScore,
    pub debt_to_income: FactorScore,
    pub emergency_fund: FactorScore,
    pub spending_consistency: FactorScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreReport {
    /// Composite score, 0–100
    pub score: u32,
    pub grade: Grade,
    /// This month's savings rate as a percentage of income
    pub savings_rate: f64,
    pub factors: HealthFactors,
    pub tips: Vec<String>,
}

const WEIGHT_SAVINGS: f64 = 0.25;
const WEIGHT_GOALS: f64 = 0.20;
const WEIGHT_BUDGET: f64 = 0.20;
const WEIGHT_DTI: f64 = 0.15;
const WEIGHT_EMERGENCY: f64 = 0.10;
const WEIGHT_CONSISTENCY: f64 = 0.10;

/// Score the user's financial health from their history and plans.
pub fn health_score(
    transactions: &[Transaction],
    goals: &[Goal],
    budgets: &[Budget],
    today: NaiveDate,
) -> HealthScoreReport {
    let month_start = today.with_day(1).expect("day 1 always valid");
    let last_month_start = month_start - Months::new(1);
    let three_months_ago = month_start - Months::new(3);

    let mut income = 0.0;
    let mut expense = 0.0;
    let mut last_month_expense = 0.0;
    let mut emi_total = 0.0;

    for t in transactions {
        if t.is_income() && t.date >= month_start && t.date <= today {
            income += t.amount;
        }
        if t.is_expense() {
            if t.date >= month_start && t.date <= today {
                expense += t.amount;
            }
            if t.date >= last_month_start && t.date < month_start {
                last_month_expense += t.amount;
            }
            if t.date >= three_months_ago
                && t.date <= today
                && t.category.eq_ignore_ascii_case("EMI")
            {
                emi_total += t.amount;
            }
        }
    }

    let savings_rate = if income > 0.0 {
        (income - expense) / income * 100.0
    } else {
        0.0
    };

    let savings_score: u32 = if savings_rate >= 30.0 {
        100
    } else if savings_rate >= 20.0 {
        85
    } else if savings_rate >= 10.0 {
        65
    } else if savings_rate >= 0.0 {
        40
    } else {
        10
    };

    let goal_score: u32 = if goals.is_empty() {
        30
    } else {
        let avg_progress = goals
            .iter()
            .map(|g| {
                if g.target_amount > 0.0 {
                    (g.current_amount / g.target_amount).min(1.0)
                } else {
                    0.0
                }
            })
            .sum::<f64>()
            / goals.len() as f64;
        (avg_progress * 100.0).round() as u32
    };

    // Budget adherence per category is owned by the budgets layer; the mere
    // presence of limits counts as discipline here.
    let budget_score: u32 = if budgets.is_empty() { 25 } else { 75 };

    let monthly_emi = emi_total / 3.0;
    let dti_ratio = if income > 0.0 {
        monthly_emi / income * 100.0
    } else {
        0.0
    };
    let dti_score: u32 = if dti_ratio == 0.0 {
        90
    } else if dti_ratio < 20.0 {
        80
    } else if dti_ratio < 40.0 {
        60
    } else if dti_ratio < 60.0 {
        35
    } else {
        15
    };

    let emergency_score: u32 = match goals
        .iter()
        .find(|g| g.name.to_lowercase().contains("emergency"))
    {
        Some(g) if g.target_amount > 0.0 => {
            (((g.current_amount / g.target_amount) * 100.0).round() as u32).min(100)
        }
        _ => 20,
    };

    let spending_change = if last_month_expense > 0.0 {
        ((expense - last_month_expense) / last_month_expense * 100.0).abs()
    } else {
        0.0
    };
    let consistency_score: u32 = if spending_change < 10.0 {
        95
    } else if spending_change < 25.0 {
        75
    } else if spending_change < 50.0 {
        50
    } else {
        25
    };

    let composite = (savings_score as f64 * WEIGHT_SAVINGS
        + goal_score as f64 * WEIGHT_GOALS
        + budget_score as f64 * WEIGHT_BUDGET
        + dti_score as f64 * WEIGHT_DTI
        + emergency_score as f64 * WEIGHT_EMERGENCY
        + consistency_score as f64 * WEIGHT_CONSISTENCY)
        .round();
    let score = composite.clamp(0.0, 100.0) as u32;

    HealthScoreReport {
        score,
        grade: Grade::for_score(score),
        savings_rate,
        factors: HealthFactors {
            savings_rate: FactorScore::new(savings_score, WEIGHT_SAVINGS),
            goal_progress: FactorScore::new(goal_score, WEIGHT_GOALS),
            budget_discipline: FactorScore::new(budget_score, WEIGHT_BUDGET),
            debt_to_income: FactorScore::new(dti_score, WEIGHT_DTI),
            emergency_fund: FactorScore::new(emergency_score, WEIGHT_EMERGENCY),
            spending_consistency: FactorScore::new(consistency_score, WEIGHT_CONSISTENCY),
        },
        tips: generate_tips(savings_rate, goals.len(), budgets.len(), income, expense),
    }
}

fn generate_tips(
    savings_rate: f64,
    goal_count: usize,
    budget_count: usize,
    income: f64,
    expense: f64,
) -> Vec<String> {
    let mut tips: Vec<String> = Vec::new();

    if savings_rate < 10.0 {
        tips.push(
            "Try to save at least 10% of your income. Even ₹500/month makes a big difference over time."
                .to_string(),
        );
    }
    if savings_rate > 30.0 {
        tips.push(
            "Great savings rate! Consider investing some surplus in a diversified mutual fund SIP."
                .to_string(),
        );
    }
    if goal_count == 0 {
        tips.push(
            "Set a savings goal. Having a target keeps you motivated; an emergency fund is a great start."
                .to_string(),
        );
    }
    if budget_count == 0 {
        tips.push(
            "Set up budget limits for your spending categories. It helps avoid overspending."
                .to_string(),
        );
    }
    if income == 0.0 && expense == 0.0 {
        tips.push(
            "Start tracking your expenses. Even manual entries help you understand your spending patterns."
                .to_string(),
        );
    }

    if tips.is_empty() {
        tips.push(
            "You're on the right track. Keep monitoring your spending and stay consistent with your goals."
                .to_string(),
        );
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{budget, date as d, expense, goal, income};

    #[test]
    fn test_strong_profile_scores_excellent() {
        let today = d(2026, 3, 20);
        let txns = vec![
            income(60_000.0, d(2026, 3, 1)),
            expense(20_000.0, "Rent", d(2026, 3, 2)),
            // Last month spent about the same: consistent.
            expense(20_500.0, "Rent", d(2026, 2, 2)),
        ];
        let goals = vec![
            goal("Emergency fund", 90_000.0, 100_000.0),
            goal("Goa trip", 20_000.0, 20_000.0),
        ];
        let budgets = vec![budget("Food", 6_000.0)];

        let report = health_score(&txns, &goals, &budgets, today);
        // 100×.25 + 95×.2 + 75×.2 + 90×.15 + 90×.1 + 95×.1 = 91
        assert_eq!(report.score, 91);
        assert_eq!(report.grade, Grade::Excellent);
        assert_eq!(report.factors.savings_rate.score, 100);
        assert_eq!(report.factors.debt_to_income.score, 90);
        assert_eq!(report.factors.spending_consistency.score, 95);
    }

    #[test]
    fn test_empty_history_scores_fair() {
        let report = health_score(&[], &[], &[], d(2026, 3, 20));
        // savings 40, goals 30, budget 25, dti 90, emergency 20, consistency 95
        assert_eq!(report.score, 46);
        assert_eq!(report.grade, Grade::Fair);
        assert!(report
            .tips
            .iter()
            .any(|t| t.contains("Start tracking your expenses")));
    }

    #[test]
    fn test_heavy_emi_load_drags_dti_down() {
        let today = d(2026, 3, 20);
        let mut txns = vec![income(30_000.0, d(2026, 3, 1))];
        // ₹60k of EMI over three months = ₹20k/month against ₹30k income.
        for m in 1..=3 {
            txns.push(expense(20_000.0, "EMI", d(2026, m, 5)));
        }
        let report = health_score(&txns, &[], &[], today);
        assert_eq!(report.factors.debt_to_income.score, 15);
        assert_eq!(
            report.factors.debt_to_income.status,
            FactorStatus::NeedsImprovement
        );
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::for_score(80), Grade::Excellent);
        assert_eq!(Grade::for_score(79), Grade::Good);
        assert_eq!(Grade::for_score(65), Grade::Good);
        assert_eq!(Grade::for_score(64), Grade::Fair);
        assert_eq!(Grade::for_score(45), Grade::Fair);
        assert_eq!(Grade::for_score(44), Grade::NeedsAttention);
    }

    #[test]
    fn test_emergency_goal_progress_feeds_factor() {
        let goals = vec![goal("My emergency stash", 50_000.0, 100_000.0)];
        let report = health_score(&[], &goals, &[], d(2026, 3, 20));
        assert_eq!(report.factors.emergency_fund.score, 50);
    }

    #[test]
    fn test_high_savings_rate_gets_investment_tip() {
        let today = d(2026, 3, 20);
        let txns = vec![
            income(50_000.0, d(2026, 3, 1)),
            expense(10_000.0, "Rent", d(2026, 3, 3)),
        ];
        let report = health_score(&txns, &[], &[], today);
        assert!(report.tips.iter().any(|t| t.contains("SIP")));
    }
}

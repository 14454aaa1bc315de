//! Domain models for Saathi

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    /// Account-to-account movement (ATM withdrawals, NEFT/IMPS). Produced by
    /// the SMS parser; the analytics layer ignores these.
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            "TRANSFER" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of spending categories
///
/// `Other` is the universal fallback: the resolver always produces a valid
/// category, and analytics treat unknown category strings as their own keys
/// without ever inventing new labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Groceries,
    Transport,
    Autorickshaw,
    Fuel,
    Shopping,
    Clothing,
    Electronics,
    #[serde(rename = "EMI")]
    Emi,
    Rent,
    Utilities,
    #[serde(rename = "Mobile Recharge")]
    MobileRecharge,
    Entertainment,
    Health,
    Education,
    Festival,
    Pooja,
    Insurance,
    Investment,
    Subscription,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    Gifts,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Groceries => "Groceries",
            Self::Transport => "Transport",
            Self::Autorickshaw => "Autorickshaw",
            Self::Fuel => "Fuel",
            Self::Shopping => "Shopping",
            Self::Clothing => "Clothing",
            Self::Electronics => "Electronics",
            Self::Emi => "EMI",
            Self::Rent => "Rent",
            Self::Utilities => "Utilities",
            Self::MobileRecharge => "Mobile Recharge",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Festival => "Festival",
            Self::Pooja => "Pooja",
            Self::Insurance => "Insurance",
            Self::Investment => "Investment",
            Self::Subscription => "Subscription",
            Self::PersonalCare => "Personal Care",
            Self::Gifts => "Gifts",
            Self::Other => "Other",
        }
    }

    /// All category labels, in rule-table order of specificity
    pub const ALL: [Category; 23] = [
        Self::Food,
        Self::Groceries,
        Self::Transport,
        Self::Autorickshaw,
        Self::Fuel,
        Self::Shopping,
        Self::Clothing,
        Self::Electronics,
        Self::Emi,
        Self::Rent,
        Self::Utilities,
        Self::MobileRecharge,
        Self::Entertainment,
        Self::Health,
        Self::Education,
        Self::Festival,
        Self::Pooja,
        Self::Insurance,
        Self::Investment,
        Self::Subscription,
        Self::PersonalCare,
        Self::Gifts,
        Self::Other,
    ];
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A personal-finance transaction
///
/// Amounts are always positive; direction comes from `tx_type`. The category
/// is a free string so user overrides survive round trips, but the resolver
/// only ever writes labels from [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub category: String,
    pub merchant: Option<String>,
    pub description: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.tx_type == TransactionType::Income
    }

    /// Merchant if present, description otherwise. This is the identity the
    /// ML service sees.
    pub fn merchant_or_description(&self) -> &str {
        self.merchant.as_deref().unwrap_or(&self.description)
    }
}

/// A monthly spending limit for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
}

/// A savings goal (input to the health score)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
}

/// Self-reported monthly income bracket
///
/// Brackets are half-open: the upper bound is exclusive, except for the top
/// bracket which is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeRange {
    #[serde(rename = "BELOW_10K")]
    Below10k,
    #[serde(rename = "FROM_10K_TO_25K")]
    From10kTo25k,
    #[serde(rename = "FROM_25K_TO_50K")]
    From25kTo50k,
    #[serde(rename = "FROM_50K_TO_1L")]
    From50kTo1L,
    #[serde(rename = "ABOVE_1L")]
    Above1L,
}

impl IncomeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Below10k => "BELOW_10K",
            Self::From10kTo25k => "FROM_10K_TO_25K",
            Self::From25kTo50k => "FROM_25K_TO_50K",
            Self::From50kTo1L => "FROM_50K_TO_1L",
            Self::Above1L => "ABOVE_1L",
        }
    }

    /// Bracket a monthly income figure
    pub fn from_monthly_income(income: f64) -> Self {
        if income < 10_000.0 {
            Self::Below10k
        } else if income < 25_000.0 {
            Self::From10kTo25k
        } else if income < 50_000.0 {
            Self::From25kTo50k
        } else if income < 100_000.0 {
            Self::From50kTo1L
        } else {
            Self::Above1L
        }
    }
}

impl std::fmt::Display for IncomeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            let parsed: Category = cat.as_str().parse().unwrap();
            assert_eq!(parsed, cat);
        }
    }

    #[test]
    fn test_category_serde_labels() {
        let json = serde_json::to_string(&Category::MobileRecharge).unwrap();
        assert_eq!(json, "\"Mobile Recharge\"");
        let json = serde_json::to_string(&Category::Emi).unwrap();
        assert_eq!(json, "\"EMI\"");
    }

    #[test]
    fn test_income_range_brackets_are_half_open() {
        assert_eq!(
            IncomeRange::from_monthly_income(9_999.0),
            IncomeRange::Below10k
        );
        assert_eq!(
            IncomeRange::from_monthly_income(10_000.0),
            IncomeRange::From10kTo25k
        );
        assert_eq!(
            IncomeRange::from_monthly_income(25_000.0),
            IncomeRange::From25kTo50k
        );
        assert_eq!(
            IncomeRange::from_monthly_income(99_999.0),
            IncomeRange::From50kTo1L
        );
        assert_eq!(
            IncomeRange::from_monthly_income(100_000.0),
            IncomeRange::Above1L
        );
    }

    #[test]
    fn test_transaction_type_wire_names() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();
        assert_eq!(json, "\"EXPENSE\"");
        let parsed: TransactionType = "income".parse().unwrap();
        assert_eq!(parsed, TransactionType::Income);
    }
}

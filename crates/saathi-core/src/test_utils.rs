//! Test utilities for saathi-core
//!
//! Fixture builders for transactions, goals, and budgets, shared by unit
//! tests and available to downstream crates via the `test-utils` feature.

use chrono::NaiveDate;

use crate::models::{Budget, Goal, Transaction, TransactionType};

/// Shorthand date constructor; panics on invalid dates (fixtures only).
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// An expense with a generated description and no merchant.
pub fn expense(amount: f64, category: &str, date: NaiveDate) -> Transaction {
    Transaction {
        amount,
        tx_type: TransactionType::Expense,
        category: category.to_string(),
        merchant: None,
        description: format!("{} spend", category),
        date,
    }
}

/// An expense attributed to a merchant.
pub fn expense_at(amount: f64, category: &str, merchant: &str, date: NaiveDate) -> Transaction {
    Transaction {
        merchant: Some(merchant.to_string()),
        ..expense(amount, category, date)
    }
}

/// An income entry (salary credit, refund, ...).
pub fn income(amount: f64, date: NaiveDate) -> Transaction {
    Transaction {
        amount,
        tx_type: TransactionType::Income,
        category: "Salary".to_string(),
        merchant: None,
        description: "salary credit".to_string(),
        date,
    }
}

pub fn goal(name: &str, current: f64, target: f64) -> Goal {
    Goal {
        name: name.to_string(),
        target_amount: target,
        current_amount: current,
    }
}

pub fn budget(category: &str, limit: f64) -> Budget {
    Budget {
        category: category.to_string(),
        limit,
    }
}

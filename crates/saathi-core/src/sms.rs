//! Bank SMS / UPI message parser
//!
//! Turns Indian bank notification texts into structured transactions using
//! ordered regex templates (SBI, HDFC, ICICI, Axis, Kotak, PNB, plus generic
//! forms). Categories come from the rule engine in [`crate::categorize`], so
//! the parser and the resolver share one vocabulary. Messages that look like
//! OTPs or promotions are rejected up front.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categorize::resolve_category;
use crate::models::{Category, TransactionType};

/// Where a parsed transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmsSource {
    Sms,
    Upi,
}

/// A transaction extracted from one bank message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSms {
    pub tx_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub merchant: String,
    pub category: Category,
    pub date: NaiveDate,
    /// Masked account, e.g. "XX1234"
    pub account_hint: String,
    pub balance: Option<f64>,
    /// 0.0–1.0, by how specific the matching template was
    pub confidence: f64,
    pub source: SmsSource,
}

/// Outcome counters for a batch parse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsBatchStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsBatchResult {
    pub parsed: Vec<ParsedSms>,
    pub failed: Vec<String>,
    pub stats: SmsBatchStats,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

/// Debit templates, most specific bank formats first. The amount is usually
/// capture group 1; ICICI-style messages put the account first, so the
/// extractor falls back to group 2 when group 1 is not numeric.
static DEBIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // SBI
        r"(?i)(?:debited|withdrawn)\s+(?:by\s+)?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:from\s+)?(?:A/c|Acct?)\s*(?:No\.?\s*)?\**(\w{4,})",
        // HDFC
        r"(?i)Rs\.?\s*([\d,]+\.?\d*)\s+(?:has been\s+)?debited\s+(?:from\s+)?A/c\s*\**(\w{4,})",
        // ICICI
        r"(?i)(?:Acct|Account)\s*\**(\w{4,})\s+(?:is\s+)?debited\s+(?:with\s+)?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)",
        // Axis
        r"(?i)(?:INR|Rs\.?)\s*([\d,]+\.?\d*)\s+(?:debited|spent)\s+(?:from\s+)?(?:Axis\s+)?A/c\s*\**(\w{4,})",
        // Kotak
        r"(?i)Amt\s+(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+debited.*?A/c\s*\**(\w{4,})",
        // PNB
        r"(?i)(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+has\s+been\s+(?:debited|deducted)\s+from\s+(?:your\s+)?(?:a/c|account)\s*(\w{4,})",
        // BOB / Canara / Union Bank
        r"(?i)(?:debited|deducted).*?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+.*?A/c\s*(\w{4,})",
        // Generic debit
        r"(?i)(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:debited|withdrawn|spent|paid)",
    ])
});

static CREDIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // SBI
        r"(?i)(?:credited|received|deposited)\s+(?:by\s+)?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:to\s+)?(?:A/c|Acct?)\s*\**(\w{4,})",
        // HDFC
        r"(?i)Rs\.?\s*([\d,]+\.?\d*)\s+(?:has been\s+)?credited\s+(?:to\s+)?A/c\s*\**(\w{4,})",
        // ICICI
        r"(?i)(?:Acct|Account)\s*\**(\w{4,})\s+(?:is\s+)?credited\s+(?:with\s+)?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)",
        // Generic credit
        r"(?i)(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:credited|received|deposited)",
        // Salary / NEFT / IMPS
        r"(?i)(?:NEFT|IMPS|UPI|salary|credit).*?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:credited|received)",
    ])
});

static UPI_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // Google Pay / PhonePe / Paytm
        r"(?i)(?:paid|sent)\s+(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+to\s+(.+?)(?:\s+on|\s+via|\s+UPI|\.|$)",
        r"(?i)(?:received|got)\s+(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+from\s+(.+?)(?:\s+on|\s+via|\s+UPI|\.|$)",
        // UPI transaction
        r"(?i)UPI.*?(?:Rs\.?|INR)\s*([\d,]+\.?\d*)\s+(?:debited|credited|paid|received)",
    ])
});

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Rs\.?|INR)\s*([\d,]+\.?\d*)").expect("valid regex"));
static BALANCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Avl\s*Bal|Available\s*Bal|Bal|Balance)[:\s]*(?:Rs\.?|INR)?\s*([\d,]+\.?\d*)")
        .expect("valid regex")
});
static ACCOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:A/c|Acct?|Account)\s*(?:No\.?\s*)?[xX*]*(\d{4})").expect("valid regex")
});
static MERCHANT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:at|to|@|towards|for|via)\s+([A-Za-z0-9\s]+?)(?:\s+on|\s+ref|\s+UPI|\.|\s+Avl|$)")
        .expect("valid regex")
});
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").expect("valid regex"));
static VPA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._]+@[A-Za-z]+").expect("valid regex"));

/// OTPs, promos, and marketing noise. A message matching this is only kept
/// when a transactional verb is also present.
static NOISE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)otp|code|password|verify|promo|offer|cashback|congrat|win|dear\s+customer.*?important")
        .expect("valid regex")
});
static TXN_VERB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)debited|credited|paid|received|withdrawn").expect("valid regex")
});
static UPI_SOURCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)upi|gpay|phonepe|paytm").expect("valid regex"));
static UPI_DEBIT_VERBS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)paid|sent|debited").expect("valid regex"));
static UPI_CREDIT_VERBS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)received|credited").expect("valid regex"));

fn parse_amount_str(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT_PATTERN
        .captures(text)
        .and_then(|c| parse_amount_str(&c[1]))
}

fn extract_account(text: &str) -> String {
    ACCOUNT_PATTERN
        .captures(text)
        .map(|c| format!("XX{}", &c[1]))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn extract_balance(text: &str) -> Option<f64> {
    BALANCE_PATTERN
        .captures(text)
        .and_then(|c| parse_amount_str(&c[1]))
}

/// Parse an Indian-format date (DD-MM-YY / DD/MM/YYYY). When day and month
/// are both ≤ 12 the day-first reading wins; unparseable dates fall back to
/// `today`.
fn extract_date(text: &str, today: NaiveDate) -> NaiveDate {
    let Some(c) = DATE_PATTERN.captures(text) else {
        return today;
    };
    let parts: Vec<i32> = c[1]
        .split(['/', '-'])
        .filter_map(|p| p.parse::<i32>().ok())
        .collect();
    if parts.len() != 3 {
        return today;
    }
    let (a, b) = (parts[0], parts[1]);
    let mut year = parts[2];
    if year < 100 {
        year += 2000;
    }

    let (day, month) = if a > 12 {
        (a, b)
    } else if b > 12 {
        (b, a)
    } else {
        (a, b)
    };

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or(today)
}

fn extract_merchant(text: &str) -> String {
    if let Some(c) = MERCHANT_PATTERN.captures(text) {
        let m: String = c[1].trim().chars().take(50).collect();
        if !m.is_empty() {
            return m;
        }
    }
    if let Some(m) = VPA_PATTERN.find(text) {
        return m.as_str().to_string();
    }
    "Unknown".to_string()
}

/// Pull the amount out of a template match: group 1 when numeric, group 2
/// otherwise (account-first templates).
fn amount_from_captures(c: &regex::Captures<'_>) -> Option<f64> {
    parse_amount_str(&c[1]).or_else(|| c.get(2).and_then(|g| parse_amount_str(g.as_str())))
}

/// Parse a single bank message. Returns `None` for non-transactional texts
/// (OTPs, promos, too-short fragments) and messages with no usable amount.
pub fn parse_bank_sms(sms: &str, today: NaiveDate) -> Option<ParsedSms> {
    let text = sms.trim();
    if text.len() < 10 {
        return None;
    }

    if NOISE_PATTERN.is_match(text) && !TXN_VERB_PATTERN.is_match(text) {
        debug!("Skipping non-transactional message");
        return None;
    }

    let mut tx_type = TransactionType::Expense;
    let mut amount: Option<f64> = None;
    // Bare-amount extraction is the lowest-confidence path.
    let mut confidence = 0.5;

    for pattern in DEBIT_PATTERNS.iter() {
        if let Some(c) = pattern.captures(text) {
            if let Some(a) = amount_from_captures(&c) {
                tx_type = TransactionType::Expense;
                amount = Some(a);
                confidence = 0.9;
                break;
            }
        }
    }

    if amount.is_none() {
        for pattern in CREDIT_PATTERNS.iter() {
            if let Some(c) = pattern.captures(text) {
                if let Some(a) = amount_from_captures(&c) {
                    tx_type = TransactionType::Income;
                    amount = Some(a);
                    confidence = 0.9;
                    break;
                }
            }
        }
    }

    if amount.is_none() {
        for pattern in UPI_PATTERNS.iter() {
            if let Some(c) = pattern.captures(text) {
                if let Some(a) = parse_amount_str(&c[1]) {
                    tx_type = if UPI_DEBIT_VERBS.is_match(text) {
                        TransactionType::Expense
                    } else if UPI_CREDIT_VERBS.is_match(text) {
                        TransactionType::Income
                    } else {
                        TransactionType::Transfer
                    };
                    amount = Some(a);
                    confidence = 0.85;
                    break;
                }
            }
        }
    }

    if amount.is_none() {
        amount = extract_amount(text);
    }

    let amount = amount.filter(|a| *a > 0.0)?;

    let merchant = extract_merchant(text);
    let category = resolve_category(text, Some(&merchant));

    Some(ParsedSms {
        tx_type,
        amount,
        description: text.chars().take(200).collect(),
        merchant,
        category,
        date: extract_date(text, today),
        account_hint: extract_account(text),
        balance: extract_balance(text),
        confidence,
        source: if UPI_SOURCE_PATTERN.is_match(text) {
            SmsSource::Upi
        } else {
            SmsSource::Sms
        },
    })
}

/// Parse a batch of messages, keeping the failures for inspection.
pub fn parse_sms_batch(messages: &[String], today: NaiveDate) -> SmsBatchResult {
    let mut parsed: Vec<ParsedSms> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for msg in messages {
        match parse_bank_sms(msg, today) {
            Some(p) => parsed.push(p),
            None => failed.push(msg.clone()),
        }
    }

    let avg_confidence = if parsed.is_empty() {
        0.0
    } else {
        let avg = parsed.iter().map(|p| p.confidence).sum::<f64>() / parsed.len() as f64;
        (avg * 100.0).round() / 100.0
    };

    SmsBatchResult {
        stats: SmsBatchStats {
            total: messages.len(),
            success: parsed.len(),
            failed: failed.len(),
            avg_confidence,
        },
        parsed,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_sbi_debit_template() {
        let sms = "Rs 2,500.00 debited from A/c XX4321 on 12-03-26 at BigBasket. Avl Bal Rs 18,450.00";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.tx_type, TransactionType::Expense);
        assert_eq!(parsed.amount, 2500.0);
        assert_eq!(parsed.account_hint, "XX4321");
        assert_eq!(parsed.balance, Some(18_450.0));
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        assert_eq!(parsed.category, Category::Groceries);
        assert!(parsed.confidence >= 0.9);
    }

    #[test]
    fn test_hdfc_credit_template() {
        let sms = "Rs.45000 has been credited to A/c **8899 by NEFT salary payment";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.tx_type, TransactionType::Income);
        assert_eq!(parsed.amount, 45_000.0);
        assert_eq!(parsed.account_hint, "XX8899");
    }

    #[test]
    fn test_icici_account_first_template() {
        let sms = "Acct XX3344 is debited with Rs 780.50 towards Swiggy order";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.tx_type, TransactionType::Expense);
        assert_eq!(parsed.amount, 780.5);
        assert_eq!(parsed.category, Category::Food);
    }

    #[test]
    fn test_upi_paid_to() {
        let sms = "You paid Rs 150 to ramesh@paytm via UPI";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.tx_type, TransactionType::Expense);
        assert_eq!(parsed.amount, 150.0);
        assert_eq!(parsed.source, SmsSource::Upi);
        // The VPA family routes wallet handles to Shopping.
        assert_eq!(parsed.category, Category::Shopping);
    }

    #[test]
    fn test_otp_is_rejected() {
        let sms = "Your OTP code is 456789. Do not share it with anyone.";
        assert!(parse_bank_sms(sms, today()).is_none());
    }

    #[test]
    fn test_promo_with_txn_verb_is_kept() {
        let sms = "Congrats! Cashback of Rs 500 credited to A/c XX1111";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.tx_type, TransactionType::Income);
        assert_eq!(parsed.amount, 500.0);
        assert_eq!(parsed.account_hint, "XX1111");
    }

    #[test]
    fn test_short_fragment_is_rejected() {
        assert!(parse_bank_sms("Rs 50", today()).is_none());
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let sms = "Rs 0 debited from A/c XX1234 at nowhere actually";
        assert!(parse_bank_sms(sms, today()).is_none());
    }

    #[test]
    fn test_date_day_first_disambiguation() {
        // 05-04: both ≤ 12, day-first reading wins (April 5th).
        let sms = "Rs 900 debited from A/c XX2222 on 05-04-2026 at PVR cinema hall";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 4, 5).unwrap());
        assert_eq!(parsed.category, Category::Entertainment);
    }

    #[test]
    fn test_missing_date_falls_back_to_reference() {
        let sms = "Rs 120 paid at chai point near office";
        let parsed = parse_bank_sms(sms, today()).unwrap();
        assert_eq!(parsed.date, today());
        assert_eq!(parsed.category, Category::Food);
    }

    #[test]
    fn test_batch_stats() {
        let messages = vec![
            "Rs 2,500 debited from A/c XX4321 at dmart store".to_string(),
            "Your OTP code is 123456".to_string(),
            "received Rs 1,000 from kumar@okaxis via UPI".to_string(),
        ];
        let result = parse_sms_batch(&messages, today());
        assert_eq!(result.stats.total, 3);
        assert_eq!(result.stats.success, 2);
        assert_eq!(result.stats.failed, 1);
        assert!(result.stats.avg_confidence > 0.8);
        assert_eq!(result.failed.len(), 1);
    }
}

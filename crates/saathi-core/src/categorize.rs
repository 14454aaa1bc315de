//! Rule-based transaction categorization
//!
//! Maps noisy transaction text (SMS parses, UPI handles, manual notes) to the
//! closed [`Category`] set without any per-user training data. Two rule
//! families run in order:
//!
//! 1. VPA rules match the payment handle (`name@bank`) embedded in the text.
//!    A payment-app identity is a stronger signal than free text, so a VPA
//!    hit wins outright.
//! 2. Keyword rules scan the description + merchant blob. The table is
//!    ordered by specificity: financial obligations (EMI, Rent, Insurance)
//!    are checked before broad catch-alls (Shopping, Food), and the first
//!    match wins. Reordering the table changes classification outcomes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Category;

/// How sure the resolver is about a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A category suggestion with every rule that fired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: Category,
    pub confidence: Confidence,
    pub all_matches: Vec<Category>,
}

struct KeywordRule {
    category: Category,
    pattern: Regex,
}

/// Ordered keyword rule table. First match wins; more specific
/// financial-obligation rules come before broad catch-alls because a loan
/// SMS would otherwise also match a generic "bill" keyword.
static KEYWORD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    let table: &[(Category, &str)] = &[
        (
            Category::Emi,
            r"\b(emi|loan|repayment|instalment|installment|bajaj\s*fin|hdfc\s*ltd|home\s*credit)\b",
        ),
        (
            Category::Rent,
            r"\b(rent|landlord|house\s*rent|pg\s*charges|hostel|nobroker|nestaway)\b",
        ),
        (
            Category::Insurance,
            r"\b(insurance|premium|lic|policy|health\s*cover|term\s*plan|star\s*health|icici\s*pru)\b",
        ),
        (
            Category::Investment,
            r"\b(sip|mutual\s*fund|invest|zerodha|groww|kuvera|paytm\s*money|gold|ppf|nps|fd|fixed\s*deposit)\b",
        ),
        (
            Category::Subscription,
            r"\b(netflix|hotstar|spotify|prime|youtube\s*premium|jio\s*cinema|subscription|ott)\b",
        ),
        (
            Category::MobileRecharge,
            r"\b(recharge|airtel|jio|vi\s|vodafone|bsnl|mobile\s*plan|prepaid|postpaid)\b",
        ),
        (
            Category::Utilities,
            r"\b(electricity|electric|water\s*bill|gas\s*bill|utility|bescom|tata\s*power|piped\s*gas|broadband|wifi|internet\s*bill)\b",
        ),
        (
            Category::Education,
            r"\b(school|college|tuition|coaching|course|udemy|coursera|exam\s*fee|books|stationery|unacademy|byju)\b",
        ),
        (
            Category::Health,
            r"\b(hospital|doctor|clinic|medical|pharmacy|medicine|apollo|medplus|pharmeasy|1mg|netmeds|diagnostic|lab\s*test|dental)\b",
        ),
        (
            Category::Autorickshaw,
            r"\b(auto|rickshaw|ola|uber|rapido|namma\s*yatri|cab|taxi|indriver)\b",
        ),
        (
            Category::Fuel,
            r"\b(petrol|diesel|fuel|hp\s*pump|ioc|bpcl|filling\s*station|ev\s*charge|cng)\b",
        ),
        (
            Category::Transport,
            r"\b(bus|metro|train|irctc|railway|bmtc|ksrtc|redbus|uber\s*moto|bike\s*taxi|toll|fastag)\b",
        ),
        (
            Category::Festival,
            r"\b(festival|diwali|holi|eid|christmas|pongal|onam|rakhi|navratri|durga\s*puja|ganesh)\b",
        ),
        (
            Category::Pooja,
            r"\b(pooja|puja|temple|mandir|gurudwara|mosque|church|donation|dakshina|prasad|havan)\b",
        ),
        (
            Category::Entertainment,
            r"\b(movie|cinema|pvr|inox|game|gaming|concert|event|park|zoo|museum|bowling|pub|bar|club)\b",
        ),
        (
            Category::PersonalCare,
            r"\b(salon|haircut|spa|parlour|parlor|grooming|urban\s*company|beauty|cosmetic|makeup)\b",
        ),
        (
            Category::Clothing,
            r"\b(cloth|apparel|fashion|myntra|ajio|zara|h&m|pantaloons|westside|brand\s*factory|shoes|footwear|bata)\b",
        ),
        (
            Category::Electronics,
            r"\b(phone|laptop|gadget|electronic|croma|reliance\s*digital|flipkart|amazon|mobile\s*accessories)\b",
        ),
        (
            Category::Shopping,
            r"\b(shop|mall|store|dmart|big\s*bazaar|reliance\s*fresh|vishal\s*mega|market|flipkart|amazon|meesho|snapdeal)\b",
        ),
        (
            Category::Gifts,
            r"\b(gift|present|surprise|birthday\s*gift|wedding\s*gift|ferns\s*n\s*petals|igp)\b",
        ),
        (
            Category::Groceries,
            r"\b(grocer|kirana|vegetables|sabzi|fruits|bigbasket|blinkit|zepto|instamart|swiggy\s*instamart|milk|dairy|ration)\b",
        ),
        // Food is the broadest rule and must stay last: it catches
        // restaurants, street food, and delivery apps.
        (
            Category::Food,
            r"\b(food|restaurant|hotel|dhaba|café|cafe|tea|chai|coffee|starbucks|ccd|biryani|pizza|burger|zomato|swiggy|eat|lunch|dinner|breakfast|snack|samosa|thali|mess|canteen|tiffin|bakery)\b",
        ),
    ];

    table
        .iter()
        .map(|(category, pattern)| KeywordRule {
            category: *category,
            pattern: Regex::new(&format!("(?i){}", pattern)).expect("valid regex"),
        })
        .collect()
});

/// Matches a VPA token: alphanumeric/dot local part, `@`, alphabetic handle.
static VPA_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._]+@[A-Za-z]+").expect("valid regex"));

/// Ordered VPA rules, matched as substrings of the whole handle token.
/// Merchant handles come first; wallet PSP suffixes (where the local part is
/// an arbitrary user name) come last.
const VPA_RULES: &[(&str, Category)] = &[
    ("swiggy", Category::Food),
    ("zomato", Category::Food),
    ("bigbasket", Category::Groceries),
    ("blinkit", Category::Groceries),
    ("zepto", Category::Groceries),
    ("ola", Category::Autorickshaw),
    ("uber", Category::Autorickshaw),
    ("rapido", Category::Autorickshaw),
    ("irctc", Category::Transport),
    ("redbus", Category::Transport),
    ("netflix", Category::Subscription),
    ("hotstar", Category::Subscription),
    ("jio", Category::MobileRecharge),
    ("airtel", Category::MobileRecharge),
    ("@paytm", Category::Shopping),
    ("@apl", Category::Shopping),
    ("@axl", Category::Shopping),
];

/// Extract the first VPA-looking token from the blob, if any. Later tokens
/// are ignored.
fn extract_vpa(text: &str) -> Option<&str> {
    VPA_TOKEN.find(text).map(|m| m.as_str())
}

fn vpa_category(token: &str) -> Option<Category> {
    VPA_RULES
        .iter()
        .find(|(needle, _)| token.contains(needle))
        .map(|(_, category)| *category)
}

fn text_blob(description: &str, merchant: Option<&str>) -> String {
    format!("{} {}", description, merchant.unwrap_or(""))
        .trim()
        .to_lowercase()
}

/// Resolve a transaction's category from its text. Total: never fails,
/// defaults to [`Category::Other`].
pub fn resolve_category(description: &str, merchant: Option<&str>) -> Category {
    let text = text_blob(description, merchant);
    if text.is_empty() {
        return Category::Other;
    }

    if let Some(token) = extract_vpa(&text) {
        if let Some(category) = vpa_category(token) {
            return category;
        }
    }

    KEYWORD_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&text))
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}

/// Suggest a category along with every rule that fired.
///
/// Confidence is `high` when exactly one unique category matched, `medium`
/// when several disagree, and `low` when nothing matched (category defaults
/// to `Other`).
pub fn suggest_category(description: &str, merchant: Option<&str>) -> CategorySuggestion {
    let text = text_blob(description, merchant);

    let mut matches: Vec<Category> = Vec::new();
    if !text.is_empty() {
        if let Some(category) = extract_vpa(&text).and_then(vpa_category) {
            matches.push(category);
        }
        for rule in KEYWORD_RULES.iter() {
            if rule.pattern.is_match(&text) && !matches.contains(&rule.category) {
                matches.push(rule.category);
            }
        }
    }

    match matches.first() {
        None => CategorySuggestion {
            category: Category::Other,
            confidence: Confidence::Low,
            all_matches: Vec::new(),
        },
        Some(&first) => CategorySuggestion {
            category: first,
            confidence: if matches.len() == 1 {
                Confidence::High
            } else {
                Confidence::Medium
            },
            all_matches: matches,
        },
    }
}

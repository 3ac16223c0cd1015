//! Keyword classification of account and category names.
//!
//! Every statement builder goes through the rule tables in this module. A name is lowercased
//! once and checked against each rule in table order; the first rule with a matching substring
//! decides the label.

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountBucket {
    /// Cash, bank and savings accounts. A subset of current assets.
    CashEquivalent,
    CurrentAsset,
    NonCurrentAsset,
    CurrentLiability,
    LongTermLiability,
}

impl AccountBucket {
    pub fn is_asset(&self) -> bool {
        matches!(
            self,
            Self::CashEquivalent | Self::CurrentAsset | Self::NonCurrentAsset
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowActivity {
    Operating,
    Investing,
    Financing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStatementLine {
    CostOfGoodsSold,
    OperatingExpense,
    OtherIncomeExpense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule<L> {
    pub keywords: &'static [&'static str],
    pub label: L,
}

impl<L: Copy> KeywordRule<L> {
    const fn new(keywords: &'static [&'static str], label: L) -> Self {
        Self { keywords, label }
    }

    /// `name_lower` must already be lowercased.
    pub fn matches(&self, name_lower: &str) -> bool {
        self.keywords.iter().any(|k| name_lower.contains(k))
    }
}

pub const ACCOUNT_RULES: &[KeywordRule<AccountBucket>] = &[
    KeywordRule::new(&["cash", "bank", "savings"], AccountBucket::CashEquivalent),
    KeywordRule::new(&["receivable"], AccountBucket::CurrentAsset),
    KeywordRule::new(&["equipment", "investment"], AccountBucket::NonCurrentAsset),
    KeywordRule::new(&["payable"], AccountBucket::CurrentLiability),
    KeywordRule::new(&["credit card"], AccountBucket::CurrentLiability),
    KeywordRule::new(&["loan", "debt", "mortgage"], AccountBucket::LongTermLiability),
];

pub const CASH_FLOW_RULES: &[KeywordRule<CashFlowActivity>] = &[
    KeywordRule::new(&["cash", "bank", "savings"], CashFlowActivity::Operating),
    KeywordRule::new(&["receivable"], CashFlowActivity::Operating),
    KeywordRule::new(
        &["equipment", "investment", "asset", "property", "capital", "research"],
        CashFlowActivity::Investing,
    ),
    KeywordRule::new(&["payable"], CashFlowActivity::Operating),
    KeywordRule::new(&["loan", "debt", "mortgage"], CashFlowActivity::Financing),
    KeywordRule::new(
        &["dividend", "equity", "stock", "financing"],
        CashFlowActivity::Financing,
    ),
    KeywordRule::new(
        &[
            "rent", "salary", "utilities", "office", "marketing", "insurance", "revenue",
            "income", "sale", "commission", "fee", "service",
        ],
        CashFlowActivity::Operating,
    ),
];

pub const INCOME_STATEMENT_RULES: &[KeywordRule<IncomeStatementLine>] = &[
    KeywordRule::new(
        &["cogs", "cost of goods", "cost of sales", "inventory"],
        IncomeStatementLine::CostOfGoodsSold,
    ),
    KeywordRule::new(
        &[
            "rent", "salary", "salaries", "utilities", "office", "marketing", "advertising",
            "travel", "insurance",
        ],
        IncomeStatementLine::OperatingExpense,
    ),
    KeywordRule::new(
        &["interest", "tax", "depreciation", "amortization"],
        IncomeStatementLine::OtherIncomeExpense,
    ),
];

/// Category keywords that add a long-term liability line to the balance sheet.
pub const LONG_TERM_DEBT_KEYWORDS: &[&str] = &["loan", "debt", "mortgage"];

pub fn first_match<L: Copy>(rules: &[KeywordRule<L>], name: &str) -> Option<L> {
    let name_lower = name.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&name_lower))
        .map(|rule| rule.label)
}

/// Balance sheet bucket for an account name, ignoring its balance.
/// `None` means no keyword matched; the caller decides by the sign of the net.
pub fn classify_account(name: &str) -> Option<AccountBucket> {
    let bucket = first_match(ACCOUNT_RULES, name);
    debug!("Account '{}' classified as {:?}", name, bucket);
    bucket
}

/// Cash flow activity for a category name. Unmatched categories are operating.
pub fn classify_cash_flow(category: &str) -> CashFlowActivity {
    first_match(CASH_FLOW_RULES, category).unwrap_or(CashFlowActivity::Operating)
}

pub fn classify_income_statement(category: &str) -> Option<IncomeStatementLine> {
    first_match(INCOME_STATEMENT_RULES, category)
}

pub fn is_long_term_debt_category(category: &str) -> bool {
    let lower = category.to_lowercase();
    LONG_TERM_DEBT_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Account,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketLabel {
    Account(AccountBucket),
    Activity(CashFlowActivity),
    Unclassified,
}

/// Single entry point over both tables: accounts map to balance sheet buckets, categories to
/// cash flow activities.
pub fn classify(name: &str, kind: NameKind) -> BucketLabel {
    match kind {
        NameKind::Account => classify_account(name)
            .map(BucketLabel::Account)
            .unwrap_or(BucketLabel::Unclassified),
        NameKind::Category => BucketLabel::Activity(classify_cash_flow(name)),
    }
}

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ACCOUNT: &str = "Unknown";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

fn default_account() -> String {
    DEFAULT_ACCOUNT.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// An amount cell as it arrives from the file parser: either already numeric or still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawAmount {
    #[schemars(description = "Numeric amount, always positive for both income and expenses")]
    Number(f64),

    #[schemars(description = "Amount as text (e.g. '1250.00'), parsed during aggregation")]
    Text(String),
}

impl Default for RawAmount {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One raw transaction record, keyed the way uploaded spreadsheets name their columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRow {
    #[serde(rename = "Date", default)]
    #[schemars(description = "Transaction date in YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY format")]
    pub date: String,

    #[serde(rename = "Account", default = "default_account")]
    #[schemars(description = "Account the transaction was booked against (e.g. 'Cash', 'Accounts Payable')")]
    pub account: String,

    #[serde(rename = "Category", default = "default_category")]
    #[schemars(description = "Spending or earning category (e.g. 'Sales', 'Rent', 'Loan Repayment')")]
    pub category: String,

    #[serde(rename = "Type", default)]
    #[schemars(description = "Either 'Income' or 'Expense' (case-insensitive)")]
    pub transaction_type: String,

    #[serde(rename = "Amount", default)]
    pub amount: RawAmount,
}

impl TransactionRow {
    pub fn new(
        date: &str,
        account: &str,
        category: &str,
        transaction_type: &str,
        amount: impl Into<RawAmount>,
    ) -> Self {
        Self {
            date: date.to_string(),
            account: account.to_string(),
            category: category.to_string(),
            transaction_type: transaction_type.to_string(),
            amount: amount.into(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Vec<TransactionRow>)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    /// Any other label. Treated like an expense everywhere.
    Other(String),
}

impl TransactionType {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("income") {
            Self::Income
        } else if trimmed.eq_ignore_ascii_case("expense") {
            Self::Expense
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }
}

/// A row that survived amount parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// `None` when the date cell was empty or in an unsupported format.
    pub date: Option<NaiveDate>,
    pub raw_date: String,
    pub account: String,
    pub category: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    Analysis,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::BalanceSheet,
        ReportKind::IncomeStatement,
        ReportKind::CashFlow,
        ReportKind::Analysis,
    ];

    /// Top-level key the statement body is nested under in serialized output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow_statement",
            Self::Analysis => "analysis",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance sheet",
            Self::IncomeStatement => "income statement",
            Self::CashFlow => "cash flow statement",
            Self::Analysis => "financial analysis",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balance_sheet" => Ok(Self::BalanceSheet),
            "income_statement" => Ok(Self::IncomeStatement),
            "cash_flow" | "cash_flow_statement" => Ok(Self::CashFlow),
            "analysis" => Ok(Self::Analysis),
            other => Err(format!("Unknown report type: {}", other)),
        }
    }
}

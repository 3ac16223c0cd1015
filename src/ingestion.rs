use crate::error::{FinancialReportError, Result};
use crate::schema::{
    RawAmount, Transaction, TransactionRow, TransactionType, DEFAULT_ACCOUNT, DEFAULT_CATEGORY,
};
use crate::utils::sum_values;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Date formats tried in order. The first one that parses wins, so `03/04/2024` is March 4th.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Calendar month bucket key, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = FinancialReportError;

    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| FinancialReportError::InvalidDate(s.to_string()))?;
        Ok(Self::from_date(date))
    }
}

/// Calendar quarter bucket key, displayed as `Qn YYYY`. Orders by year first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: u32,
}

impl QuarterKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl FromStr for QuarterKey {
    type Err = FinancialReportError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FinancialReportError::InvalidDate(s.to_string());
        let (quarter, year) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let quarter: u32 = quarter
            .strip_prefix('Q')
            .and_then(|q| q.parse().ok())
            .filter(|q| (1..=4).contains(q))
            .ok_or_else(invalid)?;
        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        Ok(Self { year, quarter })
    }
}

macro_rules! string_keyed_serde {
    ($key:ty) => {
        impl Serialize for $key {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $key {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_keyed_serde!(MonthKey);
string_keyed_serde!(QuarterKey);

/// Running totals for one category, account, month or quarter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub income: f64,
    pub expenses: f64,
    /// Always `income - expenses`; recomputed on every [`AggregatedBucket::record`].
    pub net: f64,
    pub transactions: Vec<Transaction>,
}

impl AggregatedBucket {
    pub fn record(&mut self, transaction: &Transaction) {
        if transaction.transaction_type.is_income() {
            self.income += transaction.amount;
        } else {
            self.expenses += transaction.amount;
        }
        self.net = self.income - self.expenses;
        self.transactions.push(transaction.clone());
    }

    /// Sum of income-typed transaction amounts in this bucket.
    pub fn income_inflow(&self) -> f64 {
        sum_values(
            self.transactions
                .iter()
                .filter(|t| t.transaction_type.is_income())
                .map(|t| &t.amount),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based position in the input slice.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialDataset {
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub skipped_rows: Vec<SkippedRow>,
    pub income: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub by_category: BTreeMap<String, AggregatedBucket>,
    pub by_account: BTreeMap<String, AggregatedBucket>,
    pub by_month: BTreeMap<MonthKey, AggregatedBucket>,
    pub quarters: BTreeMap<QuarterKey, AggregatedBucket>,
}

impl FinancialDataset {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn first_month(&self) -> Option<(&MonthKey, &AggregatedBucket)> {
        self.by_month.iter().next()
    }

    pub fn last_month(&self) -> Option<(&MonthKey, &AggregatedBucket)> {
        self.by_month.iter().next_back()
    }

    fn record(&mut self, transaction: Transaction) {
        if transaction.transaction_type.is_income() {
            self.income += transaction.amount;
        } else {
            self.expenses += transaction.amount;
        }

        self.by_category
            .entry(transaction.category.clone())
            .or_default()
            .record(&transaction);
        self.by_account
            .entry(transaction.account.clone())
            .or_default()
            .record(&transaction);

        if let Some(date) = transaction.date {
            self.by_month
                .entry(MonthKey::from_date(date))
                .or_default()
                .record(&transaction);
            self.quarters
                .entry(QuarterKey::from_date(date))
                .or_default()
                .record(&transaction);
        }

        self.transactions.push(transaction);
    }
}

/// Parses an amount cell. Non-finite values count as malformed.
pub fn parse_amount(raw: &RawAmount) -> Option<f64> {
    let value = match raw {
        RawAmount::Number(value) => *value,
        RawAmount::Text(text) => text.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn name_or_default(name: &str, default: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Aggregates raw rows into income/expense totals grouped by category, account, month and quarter.
///
/// Rows with a malformed amount are skipped and listed in `skipped_rows`. Rows with a missing or
/// unrecognized date still count towards the totals and the category/account groupings but are
/// left out of the month and quarter groupings.
pub fn aggregate(rows: &[TransactionRow]) -> Result<FinancialDataset> {
    if rows.is_empty() {
        return Err(FinancialReportError::EmptyDataset);
    }

    let mut dataset = FinancialDataset::default();

    for (index, row) in rows.iter().enumerate() {
        let Some(amount) = parse_amount(&row.amount) else {
            let error = FinancialReportError::InvalidAmount {
                row: index,
                value: row.amount.to_string(),
            };
            warn!("Skipping row: {}", error);
            dataset.skipped_rows.push(SkippedRow {
                index,
                reason: error.to_string(),
            });
            continue;
        };

        let date = if row.date.trim().is_empty() {
            debug!("Row {} has no date; excluded from monthly and quarterly totals", index);
            None
        } else {
            let parsed = parse_date(&row.date);
            if parsed.is_none() {
                warn!(
                    "Row {}: {}",
                    index,
                    FinancialReportError::InvalidDate(row.date.clone())
                );
            }
            parsed
        };

        let transaction_type = TransactionType::parse(&row.transaction_type);
        if let TransactionType::Other(label) = &transaction_type {
            debug!("Row {} has type '{}', counted as an expense", index, label);
        }

        dataset.record(Transaction {
            date,
            raw_date: row.date.clone(),
            account: name_or_default(&row.account, DEFAULT_ACCOUNT),
            category: name_or_default(&row.category, DEFAULT_CATEGORY),
            transaction_type,
            amount,
        });
    }

    dataset.net_income = dataset.income - dataset.expenses;

    info!(
        "Aggregated {} transactions ({} skipped) into {} categories, {} accounts, {} months",
        dataset.transactions.len(),
        dataset.skipped_rows.len(),
        dataset.by_category.len(),
        dataset.by_account.len(),
        dataset.by_month.len()
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, account: &str, category: &str, kind: &str, amount: &str) -> TransactionRow {
        TransactionRow::new(date, account, category, kind, amount)
    }

    fn assert_bucket_consistent(bucket: &AggregatedBucket) {
        assert!((bucket.net - (bucket.income - bucket.expenses)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            aggregate(&[]),
            Err(FinancialReportError::EmptyDataset)
        ));
    }

    #[test]
    fn test_basic_totals() {
        let rows = vec![
            row("2024-01-05", "Cash", "Sales", "Income", "1000"),
            row("2024-01-10", "Accounts Payable", "Rent", "Expense", "200"),
        ];

        let dataset = aggregate(&rows).unwrap();

        assert_eq!(dataset.income, 1000.0);
        assert_eq!(dataset.expenses, 200.0);
        assert_eq!(dataset.net_income, 800.0);
        assert_eq!(dataset.by_account["Cash"].net, 1000.0);
        assert_eq!(dataset.by_account["Accounts Payable"].net, -200.0);
        assert_eq!(dataset.by_month.len(), 1);
        assert_eq!(dataset.transactions.len(), 2);
    }

    #[test]
    fn test_malformed_amount_skips_only_that_row() {
        let rows = vec![
            row("2024-01-05", "Cash", "Sales", "Income", "not-a-number"),
            row("2024-01-06", "Cash", "Sales", "Income", "300"),
            row("2024-01-07", "Cash", "Rent", "Expense", "NaN"),
        ];

        let dataset = aggregate(&rows).unwrap();

        assert_eq!(dataset.income, 300.0);
        assert_eq!(dataset.expenses, 0.0);
        assert_eq!(dataset.transactions.len(), 1);
        assert_eq!(dataset.skipped_rows.len(), 2);
        assert_eq!(dataset.skipped_rows[0].index, 0);
        assert!(dataset.skipped_rows[0].reason.contains("not-a-number"));
        assert!(!dataset.by_category.contains_key("Rent"));
    }

    #[test]
    fn test_date_formats_and_unparseable_dates() {
        let rows = vec![
            row("2024-02-01", "Cash", "Sales", "Income", "10"),
            row("03/15/2024", "Cash", "Sales", "Income", "20"),
            row("25/12/2024", "Cash", "Sales", "Income", "30"),
            row("someday", "Cash", "Sales", "Income", "40"),
            row("", "Cash", "Sales", "Income", "50"),
        ];

        let dataset = aggregate(&rows).unwrap();

        assert_eq!(dataset.income, 150.0);
        assert_eq!(dataset.by_category["Sales"].income, 150.0);

        let months: Vec<String> = dataset.by_month.keys().map(|k| k.to_string()).collect();
        assert_eq!(months, vec!["2024-02", "2024-03", "2024-12"]);

        let quarters: Vec<String> = dataset.quarters.keys().map(|k| k.to_string()).collect();
        assert_eq!(quarters, vec!["Q1 2024", "Q4 2024"]);

        let monthly_total: f64 = dataset.by_month.values().map(|b| b.income).sum();
        assert_eq!(monthly_total, 60.0);
    }

    #[test]
    fn test_quarters_sort_chronologically_across_years() {
        let rows = vec![
            row("2025-01-10", "Cash", "Sales", "Income", "1"),
            row("2024-11-10", "Cash", "Sales", "Income", "1"),
            row("2024-02-10", "Cash", "Sales", "Income", "1"),
        ];

        let dataset = aggregate(&rows).unwrap();
        let quarters: Vec<String> = dataset.quarters.keys().map(|k| k.to_string()).collect();
        assert_eq!(quarters, vec!["Q1 2024", "Q4 2024", "Q1 2025"]);
    }

    #[test]
    fn test_unknown_type_counts_as_expense() {
        let rows = vec![
            row("2024-01-05", "Cash", "Sales", "income", "100"),
            row("2024-01-06", "Cash", "Transfer", "transfer", "40"),
        ];

        let dataset = aggregate(&rows).unwrap();

        assert_eq!(dataset.income, 100.0);
        assert_eq!(dataset.expenses, 40.0);
        assert_eq!(dataset.by_category["Transfer"].expenses, 40.0);
    }

    #[test]
    fn test_blank_names_use_defaults() {
        let rows = vec![row("2024-01-05", " ", "", "Income", "5")];
        let dataset = aggregate(&rows).unwrap();
        assert!(dataset.by_account.contains_key("Unknown"));
        assert!(dataset.by_category.contains_key("Uncategorized"));
    }

    #[test]
    fn test_every_bucket_is_consistent() {
        let rows = vec![
            row("2024-01-05", "Cash", "Sales", "Income", "1000.25"),
            row("2024-02-10", "Bank", "Rent", "Expense", "300.10"),
            row("2024-04-12", "Cash", "Sales", "Income", "720"),
            row("2024-05-01", "Credit Card", "Office Supplies", "Expense", "88.8"),
        ];

        let dataset = aggregate(&rows).unwrap();

        assert!((dataset.net_income - (dataset.income - dataset.expenses)).abs() < 1e-9);
        dataset.by_category.values().for_each(assert_bucket_consistent);
        dataset.by_account.values().for_each(assert_bucket_consistent);
        dataset.by_month.values().for_each(assert_bucket_consistent);
        dataset.quarters.values().for_each(assert_bucket_consistent);
    }

    #[test]
    fn test_keys_round_trip_through_strings() {
        let month: MonthKey = "2024-07".parse().unwrap();
        assert_eq!(month, MonthKey { year: 2024, month: 7 });

        let quarter: QuarterKey = "Q3 2024".parse().unwrap();
        assert_eq!(quarter, QuarterKey { year: 2024, quarter: 3 });
        assert!("Q5 2024".parse::<QuarterKey>().is_err());

        let rows = vec![row("2024-07-04", "Cash", "Sales", "Income", "10")];
        let dataset = aggregate(&rows).unwrap();
        let json = serde_json::to_string(&dataset).unwrap();
        assert!(json.contains("\"2024-07\""));
        assert!(json.contains("\"Q3 2024\""));

        let restored: FinancialDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, dataset);
    }
}

//! # Financial Statement Engine
//!
//! A library for turning raw transaction records (date, account, category, type, amount) into
//! standard financial reports with derived metrics and plain-language commentary.
//!
//! ## Core Concepts
//!
//! - **Aggregation**: Rows are parsed and grouped by category, account, month and quarter
//! - **Classification**: Account and category names are mapped to statement lines by keyword
//! - **Statements**: Balance sheet, income statement and cash flow statement built from the groups
//! - **Analysis**: Profitability, liquidity and efficiency ratios, trends and recommendations
//! - **Envelope**: Every report is wrapped with its insights and a nullable error; a failing
//!   builder yields a zero-valued statement instead of aborting the caller
//!
//! ## Example
//!
//! ```rust
//! use financial_statement_engine::*;
//!
//! let rows = vec![
//!     TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", "1000"),
//!     TransactionRow::new("2024-01-10", "Accounts Payable", "Rent", "Expense", "200"),
//! ];
//!
//! let report = generate_report(&rows, ReportKind::BalanceSheet).unwrap();
//! let ReportBody::BalanceSheet(sheet) = &report.body else { unreachable!() };
//! assert_eq!(sheet.total_assets, 1000.0);
//! assert_eq!(sheet.equity.total, 800.0);
//! ```

pub mod analysis;
pub mod balance_sheet;
pub mod cash_flow;
pub mod classifier;
pub mod config;
pub mod error;
pub mod explain;
pub mod income_statement;
pub mod ingestion;
pub mod query;
pub mod ratios;
pub mod report;
pub mod schema;
pub mod utils;

pub use analysis::{build_analysis, build_analysis_with, Analysis, KeyMetrics, TrendDirection};
pub use balance_sheet::{
    build_balance_sheet, AssetSection, BalanceSheet, EquitySection, LiabilitySection,
};
pub use cash_flow::{build_cash_flow, CashFlowStatement};
pub use classifier::{
    classify, classify_account, classify_cash_flow, classify_income_statement, AccountBucket,
    BucketLabel, CashFlowActivity, IncomeStatementLine, NameKind,
};
pub use config::ReportConfig;
pub use error::{FinancialReportError, Result};
pub use explain::{explain_report, Confidence, ReportExplanation};
pub use income_statement::{build_income_statement, build_income_statement_with, IncomeStatement};
pub use ingestion::*;
pub use query::answer_query;
pub use ratios::{
    AccountPositions, EfficiencyMetrics, LiquidityMetrics, ProfitabilityMetrics, SolvencyMetrics,
};
pub use report::{
    empty_report, generate_all_reports, generate_report, FinancialReportProcessor,
    FinancialReports, Report, ReportBody,
};
pub use schema::*;
pub use utils::*;

use crate::error::{FinancialReportError, Result};
use crate::ingestion::FinancialDataset;
use crate::ratios::{liquidity, solvency, AccountPositions};
use crate::utils::ensure_finite;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATEMENT: &str = "balance sheet";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetSection {
    pub current_assets: BTreeMap<String, f64>,
    pub non_current_assets: BTreeMap<String, f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiabilitySection {
    pub current_liabilities: BTreeMap<String, f64>,
    pub long_term_liabilities: BTreeMap<String, f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EquitySection {
    pub retained_earnings: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceSheet {
    pub assets: AssetSection,
    pub liabilities: LiabilitySection,
    pub equity: EquitySection,
    pub total_assets: f64,
    pub insights: Vec<String>,
}

/// Builds a balance sheet from account nets.
///
/// Equity is the residual `total_assets - total_liabilities`, so the accounting identity holds
/// by construction.
pub fn build_balance_sheet(dataset: &FinancialDataset) -> Result<BalanceSheet> {
    if dataset.is_empty() {
        return Err(FinancialReportError::EmptyDataset);
    }

    let positions = AccountPositions::from_dataset(dataset);

    let total_assets = ensure_finite(STATEMENT, "total assets", positions.total_assets())?;
    let total_liabilities =
        ensure_finite(STATEMENT, "total liabilities", positions.total_liabilities())?;
    let equity = total_assets - total_liabilities;

    debug!(
        "Balance sheet: assets {:.2}, liabilities {:.2}, equity {:.2}",
        total_assets, total_liabilities, equity
    );

    let insights = balance_sheet_insights(&positions);

    Ok(BalanceSheet {
        assets: AssetSection {
            current_assets: positions.current_assets,
            non_current_assets: positions.non_current_assets,
            total: total_assets,
        },
        liabilities: LiabilitySection {
            current_liabilities: positions.current_liabilities,
            long_term_liabilities: positions.long_term_liabilities,
            total: total_liabilities,
        },
        equity: EquitySection {
            retained_earnings: equity,
            total: equity,
        },
        total_assets,
        insights,
    })
}

fn balance_sheet_insights(positions: &AccountPositions) -> Vec<String> {
    let mut insights = Vec::new();
    let ratios = solvency(positions);

    if let Some(debt_to_equity) = ratios.debt_to_equity {
        let tier = if debt_to_equity < 0.5 {
            "indicating low leverage and financial risk"
        } else if debt_to_equity < 1.5 {
            "which is within a healthy range"
        } else {
            "suggesting relatively high leverage"
        };
        insights.push(format!(
            "Debt-to-equity ratio is {:.2}, {}.",
            debt_to_equity, tier
        ));
    }

    if let Some(current_ratio) = liquidity(positions).current_ratio {
        let tier = if current_ratio > 2.0 {
            "indicates strong short-term liquidity"
        } else if current_ratio > 1.0 {
            "shows adequate ability to cover short-term obligations"
        } else {
            "suggests possible short-term liquidity challenges"
        };
        insights.push(format!("Current ratio of {:.2} {}.", current_ratio, tier));
    }

    if let Some(current_pct) = ratios.current_assets_pct {
        insights.push(format!(
            "Current assets represent {:.1}% of total assets.",
            current_pct
        ));
    }

    if let Some(equity_pct) = ratios.equity_to_assets_pct {
        let tier = if equity_pct > 50.0 {
            "indicates strong financial position"
        } else if equity_pct > 30.0 {
            "shows adequate financial stability"
        } else {
            "suggests higher financial leverage"
        };
        insights.push(format!(
            "Equity to assets ratio of {:.1}% {}.",
            equity_pct, tier
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::aggregate;
    use crate::schema::TransactionRow;

    #[test]
    fn test_simple_balance_sheet() {
        let rows = vec![
            TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", "1000"),
            TransactionRow::new("2024-01-10", "Accounts Payable", "Rent", "Expense", "200"),
        ];
        let dataset = aggregate(&rows).unwrap();

        let sheet = build_balance_sheet(&dataset).unwrap();

        assert_eq!(sheet.assets.current_assets.len(), 1);
        assert_eq!(sheet.assets.current_assets["Cash"], 1000.0);
        assert_eq!(sheet.total_assets, 1000.0);
        assert_eq!(sheet.liabilities.current_liabilities["Accounts Payable"], 200.0);
        assert_eq!(sheet.liabilities.total, 200.0);
        assert_eq!(sheet.equity.total, 800.0);
        assert_eq!(sheet.equity.retained_earnings, 800.0);

        assert_eq!(
            sheet.insights,
            vec![
                "Debt-to-equity ratio is 0.25, indicating low leverage and financial risk.",
                "Current ratio of 5.00 indicates strong short-term liquidity.",
                "Current assets represent 100.0% of total assets.",
                "Equity to assets ratio of 80.0% indicates strong financial position.",
            ]
        );
    }

    #[test]
    fn test_identity_holds_with_debt_categories() {
        let rows = vec![
            TransactionRow::new("2024-01-05", "Checking", "Sales", "Income", 3000.0),
            TransactionRow::new("2024-01-06", "Office Equipment", "Equipment", "Income", 1200.0),
            TransactionRow::new("2024-01-07", "Mortgage", "Mortgage Payment", "Expense", 900.0),
            TransactionRow::new("2024-01-08", "Checking", "Loan Repayment", "Expense", 400.0),
        ];
        let dataset = aggregate(&rows).unwrap();

        let sheet = build_balance_sheet(&dataset).unwrap();

        assert_eq!(sheet.assets.non_current_assets["Office Equipment"], 1200.0);
        assert_eq!(sheet.liabilities.long_term_liabilities["Mortgage"], 900.0);
        assert_eq!(sheet.liabilities.long_term_liabilities["Loan Repayment"], 400.0);
        assert_eq!(
            sheet.liabilities.long_term_liabilities["Mortgage Payment"],
            900.0
        );
        assert_eq!(
            sheet.equity.total,
            sheet.assets.total - sheet.liabilities.total
        );
    }

    #[test]
    fn test_insights_are_suppressed_without_denominators() {
        let rows = vec![TransactionRow::new(
            "2024-01-05",
            "Accounts Payable",
            "Rent",
            "Expense",
            "500",
        )];
        let dataset = aggregate(&rows).unwrap();

        let sheet = build_balance_sheet(&dataset).unwrap();

        assert_eq!(sheet.total_assets, 0.0);
        assert!(sheet.total_assets.is_sign_positive());
        assert!(sheet.assets.total.is_sign_positive());
        assert_eq!(sheet.equity.total, -500.0);
        let json = serde_json::to_string(&sheet).unwrap();
        assert!(!json.contains("-0.0"));
        // Current ratio 0.00 is still reported; equity and asset based ratios are not.
        assert_eq!(
            sheet.insights,
            vec!["Current ratio of 0.00 suggests possible short-term liquidity challenges."]
        );
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let result = build_balance_sheet(&FinancialDataset::default());
        assert!(matches!(result, Err(FinancialReportError::EmptyDataset)));
    }

    #[test]
    fn test_overflowing_totals_are_reported() {
        let rows = vec![
            TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", f64::MAX),
            TransactionRow::new("2024-01-05", "Bank", "Sales", "Income", f64::MAX),
        ];
        let dataset = aggregate(&rows).unwrap();

        let result = build_balance_sheet(&dataset);
        assert!(matches!(
            result,
            Err(FinancialReportError::Computation { .. })
        ));
    }

    #[test]
    fn test_building_twice_is_identical() {
        let rows = vec![
            TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", "1000"),
            TransactionRow::new("2024-02-10", "Credit Card", "Travel", "Expense", "150"),
        ];
        let dataset = aggregate(&rows).unwrap();
        assert_eq!(
            build_balance_sheet(&dataset).unwrap(),
            build_balance_sheet(&dataset).unwrap()
        );
    }
}

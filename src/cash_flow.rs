use crate::classifier::{classify_cash_flow, CashFlowActivity};
use crate::error::{FinancialReportError, Result};
use crate::ingestion::FinancialDataset;
use crate::utils::{ensure_finite, format_currency, sum_values};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATEMENT: &str = "cash flow statement";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CashFlowStatement {
    pub operating_activities: BTreeMap<String, f64>,
    pub investing_activities: BTreeMap<String, f64>,
    pub financing_activities: BTreeMap<String, f64>,
    pub beginning_cash: f64,
    pub net_cash_from_operating: f64,
    pub net_cash_from_investing: f64,
    pub net_cash_from_financing: f64,
    pub net_change_in_cash: f64,
    pub ending_cash: f64,
    pub insights: Vec<String>,
}

/// Approximates a cash flow statement from category nets.
///
/// There are no real cash balances in the input, so beginning cash is the income received in
/// the earliest month and ending cash is beginning cash plus the net change across all
/// activities.
pub fn build_cash_flow(dataset: &FinancialDataset) -> Result<CashFlowStatement> {
    if dataset.is_empty() {
        return Err(FinancialReportError::EmptyDataset);
    }

    let beginning_cash = dataset
        .first_month()
        .map(|(_, bucket)| bucket.income_inflow())
        .unwrap_or(0.0);

    let mut operating_activities = BTreeMap::new();
    let mut investing_activities = BTreeMap::new();
    let mut financing_activities = BTreeMap::new();

    for (category, bucket) in &dataset.by_category {
        let activity = classify_cash_flow(category);
        debug!("Category '{}' is a {:?} activity", category, activity);
        let target = match activity {
            CashFlowActivity::Operating => &mut operating_activities,
            CashFlowActivity::Investing => &mut investing_activities,
            CashFlowActivity::Financing => &mut financing_activities,
        };
        target.insert(category.clone(), bucket.net);
    }

    let net_cash_from_operating = sum_values(operating_activities.values());
    let net_cash_from_investing = sum_values(investing_activities.values());
    let net_cash_from_financing = sum_values(financing_activities.values());

    let net_change_in_cash = ensure_finite(
        STATEMENT,
        "net change in cash",
        net_cash_from_operating + net_cash_from_investing + net_cash_from_financing,
    )?;
    let ending_cash = ensure_finite(STATEMENT, "ending cash", beginning_cash + net_change_in_cash)?;

    let insights = cash_flow_insights(
        net_cash_from_operating,
        net_cash_from_investing,
        net_cash_from_financing,
        net_change_in_cash,
    );

    Ok(CashFlowStatement {
        operating_activities,
        investing_activities,
        financing_activities,
        beginning_cash,
        net_cash_from_operating,
        net_cash_from_investing,
        net_cash_from_financing,
        net_change_in_cash,
        ending_cash,
        insights,
    })
}

fn cash_flow_insights(operating: f64, investing: f64, financing: f64, net_change: f64) -> Vec<String> {
    let mut insights = Vec::new();

    if operating > 0.0 {
        insights.push(format!(
            "Positive operating cash flow of {} indicates healthy core business operations.",
            format_currency(operating)
        ));
    } else {
        insights.push(format!(
            "Negative operating cash flow of {} may indicate operational challenges.",
            format_currency(operating)
        ));
    }

    if investing < 0.0 {
        insights.push(format!(
            "Negative investing cash flow of {} indicates investment in growth.",
            format_currency(investing)
        ));
    } else {
        insights.push(format!(
            "Positive investing cash flow of {} may indicate selling of assets.",
            format_currency(investing)
        ));
    }

    if financing > 0.0 {
        insights.push(format!(
            "Positive financing cash flow of {} indicates raising capital.",
            format_currency(financing)
        ));
    } else {
        insights.push(format!(
            "Negative financing cash flow of {} indicates debt repayment or dividends.",
            format_currency(financing)
        ));
    }

    if net_change > 0.0 {
        insights.push(format!(
            "Overall positive cash flow of {} strengthens liquidity position.",
            format_currency(net_change)
        ));
    } else {
        insights.push(format!(
            "Overall negative cash flow of {} may require attention to cash management.",
            format_currency(net_change)
        ));
    }

    // investing < 0 here, so the division is defined.
    if operating > 0.0 && investing < 0.0 {
        let coverage = (operating / investing).abs();
        if coverage > 1.0 {
            insights.push(format!(
                "Operating cash flow covers {:.1}x of investing activities, indicating sustainable growth.",
                coverage
            ));
        } else {
            insights.push(format!(
                "Operating cash flow covers only {:.1}x of investing activities, suggesting external financing needs.",
                coverage
            ));
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::aggregate;
    use crate::schema::TransactionRow;

    fn sample_rows() -> Vec<TransactionRow> {
        vec![
            TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", 5_000.0),
            TransactionRow::new("2024-01-20", "Cash", "Rent", "Expense", 1_000.0),
            TransactionRow::new("2024-02-03", "Cash", "Equipment Purchase", "Expense", 2_000.0),
            TransactionRow::new("2024-02-15", "Cash", "Loan Proceeds", "Income", 3_000.0),
            TransactionRow::new("2024-03-01", "Cash", "Sales", "Income", 4_000.0),
            TransactionRow::new("2024-03-09", "Cash", "Dividends", "Expense", 500.0),
        ]
    }

    #[test]
    fn test_activities_and_totals() {
        let dataset = aggregate(&sample_rows()).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        assert_eq!(statement.operating_activities["Sales"], 9_000.0);
        assert_eq!(statement.operating_activities["Rent"], -1_000.0);
        assert_eq!(statement.investing_activities["Equipment Purchase"], -2_000.0);
        assert_eq!(statement.financing_activities["Loan Proceeds"], 3_000.0);
        assert_eq!(statement.financing_activities["Dividends"], -500.0);

        assert_eq!(statement.net_cash_from_operating, 8_000.0);
        assert_eq!(statement.net_cash_from_investing, -2_000.0);
        assert_eq!(statement.net_cash_from_financing, 2_500.0);
        assert_eq!(statement.net_change_in_cash, 8_500.0);
        assert_eq!(statement.beginning_cash, 5_000.0);
        assert_eq!(statement.ending_cash, 13_500.0);
    }

    #[test]
    fn test_every_category_lands_in_exactly_one_activity() {
        let dataset = aggregate(&sample_rows()).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        let listed = statement.operating_activities.len()
            + statement.investing_activities.len()
            + statement.financing_activities.len();
        assert_eq!(listed, dataset.by_category.len());
        assert!(
            (statement.net_change_in_cash - dataset.net_income).abs() < 1e-9,
            "category nets reconcile to net income"
        );
    }

    #[test]
    fn test_insights() {
        let dataset = aggregate(&sample_rows()).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        assert_eq!(
            statement.insights,
            vec![
                "Positive operating cash flow of $8,000.00 indicates healthy core business operations.",
                "Negative investing cash flow of $-2,000.00 indicates investment in growth.",
                "Positive financing cash flow of $2,500.00 indicates raising capital.",
                "Overall positive cash flow of $8,500.00 strengthens liquidity position.",
                "Operating cash flow covers 4.0x of investing activities, indicating sustainable growth.",
            ]
        );
    }

    #[test]
    fn test_no_coverage_without_investing_outflow() {
        let rows = vec![TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", 100.0)];
        let dataset = aggregate(&rows).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        assert_eq!(statement.insights.len(), 4);
        assert!(statement.insights[1].starts_with("Positive investing cash flow of $0.00"));
    }

    #[test]
    fn test_undated_rows_leave_beginning_cash_at_zero() {
        let rows = vec![TransactionRow::new("", "Cash", "Sales", "Income", 100.0)];
        let dataset = aggregate(&rows).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        assert_eq!(statement.beginning_cash, 0.0);
        assert_eq!(statement.ending_cash, 100.0);
    }

    #[test]
    fn test_expense_only_first_month_starts_at_positive_zero() {
        let rows = vec![TransactionRow::new("2024-01-05", "Cash", "Rent", "Expense", 300.0)];
        let dataset = aggregate(&rows).unwrap();
        let statement = build_cash_flow(&dataset).unwrap();

        assert!(statement.beginning_cash.is_sign_positive());
        assert!(statement.net_cash_from_investing.is_sign_positive());
        assert!(statement.insights[1].starts_with("Positive investing cash flow of $0.00"));
        assert!(!serde_json::to_string(&statement).unwrap().contains("-0.0"));
    }
}

use crate::classifier::{classify_income_statement, IncomeStatementLine};
use crate::config::ReportConfig;
use crate::error::{FinancialReportError, Result};
use crate::ingestion::FinancialDataset;
use crate::ratios::{profitability, CogsEstimate, ProfitabilityMetrics};
use crate::utils::{ensure_finite, sum_values};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STATEMENT: &str = "income statement";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeStatement {
    pub revenue: f64,
    pub cost_of_goods_sold: f64,
    pub gross_profit: f64,
    pub operating_expenses: BTreeMap<String, f64>,
    pub operating_income: f64,
    pub other_income_expenses: BTreeMap<String, f64>,
    pub income_before_taxes: f64,
    pub taxes: f64,
    pub net_income: f64,
    /// Expense categories no line matched. Listed for review, not part of any total.
    #[serde(default)]
    pub unclassified_expenses: BTreeMap<String, f64>,
    pub insights: Vec<String>,
}

pub fn build_income_statement(dataset: &FinancialDataset) -> Result<IncomeStatement> {
    build_income_statement_with(dataset, &ReportConfig::default())
}

pub fn build_income_statement_with(
    dataset: &FinancialDataset,
    config: &ReportConfig,
) -> Result<IncomeStatement> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(FinancialReportError::EmptyDataset);
    }

    let revenue = ensure_finite(STATEMENT, "revenue", dataset.income)?;

    let mut cost_of_goods_sold = 0.0;
    let mut operating_expenses = BTreeMap::new();
    let mut other_income_expenses = BTreeMap::new();
    let mut unclassified_expenses = BTreeMap::new();

    for (category, bucket) in &dataset.by_category {
        match classify_income_statement(category) {
            Some(IncomeStatementLine::CostOfGoodsSold) => cost_of_goods_sold += bucket.expenses,
            Some(IncomeStatementLine::OperatingExpense) => {
                operating_expenses.insert(category.clone(), bucket.expenses);
            }
            Some(IncomeStatementLine::OtherIncomeExpense) => {
                other_income_expenses.insert(category.clone(), bucket.expenses);
            }
            None if bucket.expenses > 0.0 => {
                debug!(
                    "Expense category '{}' matches no income statement line",
                    category
                );
                unclassified_expenses.insert(category.clone(), bucket.expenses);
            }
            None => {}
        }
    }

    let total_operating_expenses = sum_values(operating_expenses.values());
    let total_other_expenses = sum_values(other_income_expenses.values());

    let gross_profit = revenue - cost_of_goods_sold;
    let operating_income = gross_profit - total_operating_expenses;
    let income_before_taxes = ensure_finite(
        STATEMENT,
        "income before taxes",
        operating_income - total_other_expenses,
    )?;

    let taxes = if income_before_taxes > 0.0 {
        income_before_taxes * config.tax_rate
    } else {
        0.0
    };
    let net_income = income_before_taxes - taxes;

    let margins = profitability(
        revenue,
        dataset.expenses,
        net_income,
        CogsEstimate::Classified {
            cogs: cost_of_goods_sold,
            operating_expenses: total_operating_expenses,
        },
    );

    Ok(IncomeStatement {
        revenue,
        cost_of_goods_sold,
        gross_profit,
        operating_expenses,
        operating_income,
        other_income_expenses,
        income_before_taxes,
        taxes,
        net_income,
        unclassified_expenses,
        insights: income_statement_insights(&margins),
    })
}

fn income_statement_insights(margins: &ProfitabilityMetrics) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(gross) = margins.gross_margin.map(|m| m * 100.0) {
        insights.push(format!("Gross profit margin is {:.1}%.", gross));
        insights.push(
            if gross > 40.0 {
                "This is a strong gross margin, indicating efficient production/service delivery."
            } else if gross > 20.0 {
                "This is an average gross margin for most industries."
            } else {
                "This gross margin is relatively low, suggesting higher production costs."
            }
            .to_string(),
        );
    }

    if let Some(operating) = margins.operating_margin.map(|m| m * 100.0) {
        insights.push(format!("Operating margin is {:.1}%.", operating));
        insights.push(
            if operating > 15.0 {
                "This is a strong operating margin, indicating good operational efficiency."
            } else if operating > 8.0 {
                "This is an average operating margin for most industries."
            } else {
                "This operating margin is relatively low, suggesting operational challenges."
            }
            .to_string(),
        );
    }

    if let Some(net) = margins.net_margin.map(|m| m * 100.0) {
        insights.push(format!("Net profit margin is {:.1}%.", net));
        insights.push(
            if net > 10.0 {
                "This is a strong net margin, indicating overall financial health."
            } else if net > 5.0 {
                "This is an average net margin for most industries."
            } else {
                "This net margin is relatively low, suggesting profitability challenges."
            }
            .to_string(),
        );
    }

    insights
}

use crate::report::{Report, ReportBody};
use crate::schema::ReportKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// How a report was derived, how far to trust it and what to check next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportExplanation {
    pub process: Vec<String>,
    pub confidence: Confidence,
    pub limitations: Vec<String>,
    pub next_steps: Vec<String>,
}

const COMMON_STEPS: [&str; 2] = [
    "Extracted financial transaction data from the supplied rows.",
    "Identified transaction types, accounts, categories, and dates.",
];

struct KindNarrative {
    steps: [&'static str; 4],
    limitations: [&'static str; 2],
    next_steps: [&'static str; 2],
}

fn narrative(kind: ReportKind) -> KindNarrative {
    match kind {
        ReportKind::BalanceSheet => KindNarrative {
            steps: [
                "Classified accounts as assets or liabilities based on account names.",
                "Calculated current and non-current asset values from account balances.",
                "Identified liability obligations and categorized them as short or long-term.",
                "Calculated equity as the difference between assets and liabilities.",
            ],
            limitations: [
                "Asset and liability classification was based on account names and transaction patterns.",
                "Long-term assets and depreciation were estimated from available data.",
            ],
            next_steps: [
                "Verify asset and liability classifications for accuracy.",
                "Review equity calculations and ensure all accounts are properly categorized.",
            ],
        },
        ReportKind::IncomeStatement => KindNarrative {
            steps: [
                "Identified revenue and expense transactions from financial data.",
                "Calculated gross profit by separating cost of goods sold from other expenses.",
                "Categorized operating and non-operating expenses based on category names.",
                "Applied a flat tax rate to positive income before taxes to calculate net income.",
            ],
            limitations: [
                "Cost of goods sold was estimated based on transaction categories.",
                "Tax calculations are estimates and may not reflect actual tax obligations.",
            ],
            next_steps: [
                "Review expense categorizations for accuracy.",
                "Verify revenue recognition and expense allocation to periods.",
            ],
        },
        ReportKind::CashFlow => KindNarrative {
            steps: [
                "Separated cash flow activities into operating, investing, and financing categories.",
                "Calculated beginning and ending cash balances based on transaction data.",
                "Determined net cash flow from each activity type based on category names.",
                "Reconciled the net change in cash with the activity totals.",
            ],
            limitations: [
                "Cash flow categorization was based on transaction categories.",
                "Non-cash transactions may not be fully reflected in the cash flow statement.",
            ],
            next_steps: [
                "Verify cash flow activity classifications.",
                "Reconcile cash flow data with bank statements and other financial records.",
            ],
        },
        ReportKind::Analysis => KindNarrative {
            steps: [
                "Calculated key financial metrics including profitability, liquidity, and efficiency ratios.",
                "Analyzed financial trends over time using monthly and quarterly data.",
                "Compared performance metrics to identify strengths and improvement areas.",
                "Generated actionable recommendations based on financial health indicators.",
            ],
            limitations: [
                "Analysis is based solely on the financial data provided.",
                "Industry benchmarks and economic context are not included in the analysis.",
            ],
            next_steps: [
                "Consider the recommendations in light of your specific business context.",
                "Review the analysis periodically as new financial data becomes available.",
            ],
        },
    }
}

fn confidence(report: &Report) -> Confidence {
    if report.error.is_some() {
        return Confidence::Low;
    }

    let has_headline = match &report.body {
        ReportBody::BalanceSheet(sheet) => sheet.assets.total > 0.0,
        ReportBody::IncomeStatement(statement) => statement.revenue > 0.0,
        ReportBody::CashFlow(statement) => statement.net_cash_from_operating != 0.0,
        ReportBody::Analysis(analysis) => {
            let metrics = &analysis.key_metrics;
            metrics.profitability.net_margin.is_some()
                || metrics.liquidity.current_ratio.is_some()
                || metrics.efficiency.asset_turnover.is_some()
        }
    };

    if has_headline {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

fn to_strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

pub fn explain_report(report: &Report) -> ReportExplanation {
    let narrative = narrative(report.kind());
    let mut process = to_strings(&COMMON_STEPS);
    process.extend(to_strings(&narrative.steps));

    let mut limitations = to_strings(&narrative.limitations);
    if let Some(error) = &report.error {
        limitations.push(format!("The report could not be computed: {}", error));
    }

    ReportExplanation {
        process,
        confidence: confidence(report),
        limitations,
        next_steps: to_strings(&narrative.next_steps),
    }
}

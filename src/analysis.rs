use crate::config::ReportConfig;
use crate::error::{FinancialReportError, Result};
use crate::ingestion::FinancialDataset;
use crate::ratios::{
    efficiency, liquidity, profitability, AccountPositions, CogsEstimate, EfficiencyMetrics,
    LiquidityMetrics, ProfitabilityMetrics,
};
use crate::utils::{ensure_finite, percentage_change};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const STATEMENT: &str = "financial analysis";

/// Padding used when fewer recommendations were triggered than the configured minimum.
pub(crate) const GENERAL_RECOMMENDATIONS: &[&str] = &[
    "Continue monitoring financial performance and maintain current strategies.",
    "Maintain a cash reserve that covers at least three months of operating expenses.",
    "Review financial statements monthly to catch emerging issues early.",
    "Categorize transactions consistently to improve the accuracy of future reports.",
    "Compare results against industry benchmarks to set realistic targets.",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyMetrics {
    pub profitability: ProfitabilityMetrics,
    pub liquidity: LiquidityMetrics,
    pub efficiency: EfficiencyMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    ConsistentlyIncreasing,
    ConsistentlyDecreasing,
    GenerallyIncreasing,
    GenerallyDecreasing,
    Stable,
}

impl TrendDirection {
    /// Strictly monotonic series are "consistent"; otherwise only the endpoints are compared.
    pub fn classify(values: &[f64]) -> Self {
        let (Some(first), Some(last)) = (values.first(), values.last()) else {
            return Self::Stable;
        };

        if values.windows(2).all(|w| w[1] > w[0]) {
            Self::ConsistentlyIncreasing
        } else if values.windows(2).all(|w| w[1] < w[0]) {
            Self::ConsistentlyDecreasing
        } else if last > first {
            Self::GenerallyIncreasing
        } else if last < first {
            Self::GenerallyDecreasing
        } else {
            Self::Stable
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::ConsistentlyIncreasing => "consistently increasing",
            Self::ConsistentlyDecreasing => "consistently decreasing",
            Self::GenerallyIncreasing => "generally increasing",
            Self::GenerallyDecreasing => "generally decreasing",
            Self::Stable => "stable",
        }
    }

    pub fn is_increasing(&self) -> bool {
        matches!(self, Self::ConsistentlyIncreasing | Self::GenerallyIncreasing)
    }

    pub fn is_decreasing(&self) -> bool {
        matches!(self, Self::ConsistentlyDecreasing | Self::GenerallyDecreasing)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Analysis {
    pub summary: String,
    pub key_metrics: KeyMetrics,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarterly_revenue_trend: Option<TrendDirection>,
}

#[derive(Debug, Default)]
struct TrendFindings {
    statements: Vec<String>,
    revenue_change_pct: Option<f64>,
    quarterly_direction: Option<TrendDirection>,
    expense_ratio_change: Option<f64>,
}

impl TrendFindings {
    fn overall_direction(&self) -> Option<TrendDirection> {
        self.quarterly_direction.or_else(|| {
            self.revenue_change_pct.map(|change| {
                if change > 0.0 {
                    TrendDirection::GenerallyIncreasing
                } else if change < 0.0 {
                    TrendDirection::GenerallyDecreasing
                } else {
                    TrendDirection::Stable
                }
            })
        })
    }
}

pub fn build_analysis(dataset: &FinancialDataset) -> Result<Analysis> {
    build_analysis_with(dataset, &ReportConfig::default())
}

pub fn build_analysis_with(dataset: &FinancialDataset, config: &ReportConfig) -> Result<Analysis> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(FinancialReportError::EmptyDataset);
    }

    let revenue = ensure_finite(STATEMENT, "revenue", dataset.income)?;
    let expenses = ensure_finite(STATEMENT, "expenses", dataset.expenses)?;
    let net_income = ensure_finite(STATEMENT, "net income", dataset.net_income)?;

    let positions = AccountPositions::from_dataset(dataset);
    let key_metrics = KeyMetrics {
        profitability: profitability(
            revenue,
            expenses,
            net_income,
            CogsEstimate::ShareOfExpenses(config.analysis_cogs_share),
        ),
        liquidity: liquidity(&positions),
        efficiency: efficiency(revenue, dataset),
    };

    let findings = detect_trends(dataset, config);
    debug!(
        "Trend findings: revenue change {:?}, quarterly direction {:?}",
        findings.revenue_change_pct, findings.quarterly_direction
    );

    let recommendations = recommendations(&key_metrics, &findings, config.min_recommendations);
    let summary = summarize(&key_metrics, &findings);

    Ok(Analysis {
        summary,
        key_metrics,
        trends: findings.statements.clone(),
        recommendations,
        quarterly_revenue_trend: findings.quarterly_direction,
    })
}

fn detect_trends(dataset: &FinancialDataset, config: &ReportConfig) -> TrendFindings {
    let mut findings = TrendFindings::default();

    if dataset.by_month.len() > 1 {
        if let (Some((_, first)), Some((_, last))) = (dataset.first_month(), dataset.last_month()) {
            if first.income > 0.0 {
                if let Some(change) = percentage_change(first.income, last.income) {
                    findings.revenue_change_pct = Some(change);
                    findings.statements.push(if change > 0.0 {
                        format!("Revenue has increased by {:.1}% over the period.", change)
                    } else if change < 0.0 {
                        format!("Revenue has decreased by {:.1}% over the period.", change.abs())
                    } else {
                        "Revenue has remained unchanged over the period.".to_string()
                    });
                }
            }
        }
    }

    if dataset.quarters.len() > 1 {
        let incomes: Vec<f64> = dataset.quarters.values().map(|q| q.income).collect();
        let direction = TrendDirection::classify(&incomes);
        findings.quarterly_direction = Some(direction);
        findings.statements.push(format!(
            "Quarterly revenue shows a {} trend.",
            direction.describe()
        ));

        let expense_ratio = |income: f64, expenses: f64| (income > 0.0).then(|| expenses / income);
        let first = dataset.quarters.values().next();
        let last = dataset.quarters.values().next_back();
        if let (Some(first), Some(last)) = (first, last) {
            if let (Some(start), Some(end)) = (
                expense_ratio(first.income, first.expenses),
                expense_ratio(last.income, last.expenses),
            ) {
                let change = end - start;
                if change.abs() > config.expense_ratio_drift_threshold {
                    findings.expense_ratio_change = Some(change);
                    findings.statements.push(format!(
                        "Expense-to-income ratio has {} from {:.2} to {:.2}.",
                        if change > 0.0 { "increased" } else { "decreased" },
                        start,
                        end
                    ));
                }
            }
        }
    }

    if findings.statements.is_empty() {
        findings
            .statements
            .push("Insufficient time-series data to establish clear trends.".to_string());
    }

    findings
}

fn recommendations(metrics: &KeyMetrics, findings: &TrendFindings, minimum: usize) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();

    if let Some(net_margin) = metrics.profitability.net_margin {
        if net_margin < 0.05 {
            recommendations.push(
                "Focus on improving net margin through cost control and pricing strategy."
                    .to_string(),
            );
        } else if net_margin < 0.1 {
            recommendations
                .push("Consider strategic initiatives to enhance profit margins.".to_string());
        }
    }

    if let Some(current_ratio) = metrics.liquidity.current_ratio {
        if current_ratio < 1.0 {
            recommendations.push(
                "Improve short-term liquidity to better cover current obligations.".to_string(),
            );
        } else if current_ratio > 3.0 {
            recommendations.push(
                "Consider utilizing excess liquid assets for growth or shareholder returns."
                    .to_string(),
            );
        }
    }

    if let Some(asset_turnover) = metrics.efficiency.asset_turnover {
        if asset_turnover < 0.5 {
            recommendations.push(
                "Evaluate asset utilization to improve revenue generation efficiency.".to_string(),
            );
        }
    }

    match findings.quarterly_direction {
        Some(direction) if direction.is_decreasing() => recommendations.push(
            "Investigate the causes of declining quarterly revenue and revisit pricing and sales channels."
                .to_string(),
        ),
        Some(direction) if direction.is_increasing() => recommendations.push(
            "Reinvest in the products and channels driving revenue growth while keeping costs in check."
                .to_string(),
        ),
        _ => {}
    }

    if findings.expense_ratio_change.is_some_and(|change| change > 0.0) {
        recommendations
            .push("Review expense growth, which is outpacing income across quarters.".to_string());
    }

    for general in GENERAL_RECOMMENDATIONS {
        if recommendations.len() >= minimum {
            break;
        }
        if !recommendations.iter().any(|r| r == general) {
            recommendations.push(general.to_string());
        }
    }

    recommendations
}

fn summarize(metrics: &KeyMetrics, findings: &TrendFindings) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(net_margin) = metrics.profitability.net_margin {
        parts.push(if net_margin > 0.1 {
            "strong profitability"
        } else if net_margin > 0.05 {
            "adequate profitability"
        } else if net_margin > 0.0 {
            "marginal profitability"
        } else {
            "operating at a loss"
        });
    }

    if let Some(current_ratio) = metrics.liquidity.current_ratio {
        parts.push(if current_ratio > 2.0 {
            "healthy liquidity"
        } else if current_ratio > 1.0 {
            "adequate liquidity"
        } else {
            "limited liquidity"
        });
    }

    if let Some(direction) = findings.overall_direction() {
        parts.push(if direction.is_increasing() {
            "positive growth trend"
        } else if direction.is_decreasing() {
            "declining trend"
        } else {
            "stable performance"
        });
    }

    if parts.is_empty() {
        "Financial analysis completed based on provided data.".to_string()
    } else {
        format!("Financial analysis indicates {}.", parts.join(", "))
    }
}

//! Ratio computation shared by the balance sheet, income statement and analysis builders.

use crate::classifier::{classify_account, is_long_term_debt_category, AccountBucket};
use crate::ingestion::FinancialDataset;
use crate::utils::{safe_div, sum_values};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balance sheet positions derived from account nets.
///
/// Accounts with a positive net become assets and accounts with a negative net become
/// liabilities (carried as positive amounts). Asset-keyword accounts that went negative and
/// liability-keyword accounts that stayed non-negative are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPositions {
    pub current_assets: BTreeMap<String, f64>,
    pub non_current_assets: BTreeMap<String, f64>,
    pub current_liabilities: BTreeMap<String, f64>,
    pub long_term_liabilities: BTreeMap<String, f64>,
    /// Portion of current assets held in cash, bank or savings accounts.
    pub cash: f64,
}

impl AccountPositions {
    pub fn from_dataset(dataset: &FinancialDataset) -> Self {
        let mut positions = Self::default();

        for (name, bucket) in &dataset.by_account {
            let net = bucket.net;
            match classify_account(name) {
                Some(kind) if kind.is_asset() => {
                    if net <= 0.0 {
                        debug!("Asset account '{}' has non-positive net {}, excluded", name, net);
                        continue;
                    }
                    if kind == AccountBucket::NonCurrentAsset {
                        positions.non_current_assets.insert(name.clone(), net);
                    } else {
                        if kind == AccountBucket::CashEquivalent {
                            positions.cash += net;
                        }
                        positions.current_assets.insert(name.clone(), net);
                    }
                }
                Some(kind) => {
                    if net >= 0.0 {
                        debug!("Liability account '{}' has non-negative net {}, excluded", name, net);
                        continue;
                    }
                    if kind == AccountBucket::LongTermLiability {
                        positions.long_term_liabilities.insert(name.clone(), -net);
                    } else {
                        positions.current_liabilities.insert(name.clone(), -net);
                    }
                }
                None => {
                    if net > 0.0 {
                        positions.current_assets.insert(name.clone(), net);
                    } else if net < 0.0 {
                        positions.current_liabilities.insert(name.clone(), -net);
                    }
                }
            }
        }

        for (name, bucket) in &dataset.by_category {
            if is_long_term_debt_category(name) && bucket.net < 0.0 {
                positions
                    .long_term_liabilities
                    .entry(name.clone())
                    .or_insert(-bucket.net);
            }
        }

        positions
    }

    pub fn total_current_assets(&self) -> f64 {
        sum_values(self.current_assets.values())
    }

    pub fn total_non_current_assets(&self) -> f64 {
        sum_values(self.non_current_assets.values())
    }

    pub fn total_assets(&self) -> f64 {
        self.total_current_assets() + self.total_non_current_assets()
    }

    pub fn total_current_liabilities(&self) -> f64 {
        sum_values(self.current_liabilities.values())
    }

    pub fn total_long_term_liabilities(&self) -> f64 {
        sum_values(self.long_term_liabilities.values())
    }

    pub fn total_liabilities(&self) -> f64 {
        self.total_current_liabilities() + self.total_long_term_liabilities()
    }

    /// Residual of assets over liabilities.
    pub fn equity(&self) -> f64 {
        self.total_assets() - self.total_liabilities()
    }
}

/// Where the cost-of-goods figure behind gross and operating margins comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CogsEstimate {
    /// A fixed share of total expenses is cost of goods; the rest is operating expense.
    ShareOfExpenses(f64),
    /// Cost of goods and operating expenses taken from classified categories.
    Classified { cogs: f64, operating_expenses: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfitabilityMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_margin: Option<f64>,
}

/// Margins as fractions of revenue. Empty when revenue is not positive.
pub fn profitability(
    revenue: f64,
    total_expenses: f64,
    net_income: f64,
    estimate: CogsEstimate,
) -> ProfitabilityMetrics {
    if revenue <= 0.0 {
        return ProfitabilityMetrics::default();
    }

    let (cogs, operating_expenses) = match estimate {
        CogsEstimate::ShareOfExpenses(share) => {
            let cogs = total_expenses * share;
            (cogs, total_expenses - cogs)
        }
        CogsEstimate::Classified {
            cogs,
            operating_expenses,
        } => (cogs, operating_expenses),
    };

    let gross_profit = revenue - cogs;
    let operating_income = gross_profit - operating_expenses;

    ProfitabilityMetrics {
        net_margin: safe_div(net_income, revenue),
        gross_margin: safe_div(gross_profit, revenue),
        operating_margin: safe_div(operating_income, revenue),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiquidityMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_ratio: Option<f64>,
}

/// Empty when there are no current liabilities.
pub fn liquidity(positions: &AccountPositions) -> LiquidityMetrics {
    let current_liabilities = positions.total_current_liabilities();
    if current_liabilities <= 0.0 {
        return LiquidityMetrics::default();
    }

    LiquidityMetrics {
        current_ratio: safe_div(positions.total_current_assets(), current_liabilities),
        cash_ratio: safe_div(positions.cash, current_liabilities),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EfficiencyMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_turnover: Option<f64>,
}

/// Sum of every account with a positive net, whatever its keyword classification.
pub fn positive_account_total(dataset: &FinancialDataset) -> f64 {
    sum_values(
        dataset
            .by_account
            .values()
            .filter(|bucket| bucket.net > 0.0)
            .map(|bucket| &bucket.net),
    )
}

/// Asset turnover is revenue over all positive account balances, not the balance sheet total.
pub fn efficiency(revenue: f64, dataset: &FinancialDataset) -> EfficiencyMetrics {
    let total_assets = positive_account_total(dataset);
    if total_assets <= 0.0 {
        return EfficiencyMetrics::default();
    }

    EfficiencyMetrics {
        asset_turnover: safe_div(revenue, total_assets),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvencyMetrics {
    /// Liabilities over equity; only when equity is positive.
    pub debt_to_equity: Option<f64>,
    /// Percent of total assets.
    pub equity_to_assets_pct: Option<f64>,
    /// Percent of total assets.
    pub current_assets_pct: Option<f64>,
}

pub fn solvency(positions: &AccountPositions) -> SolvencyMetrics {
    let total_assets = positions.total_assets();
    let equity = positions.equity();

    let debt_to_equity = if equity > 0.0 {
        safe_div(positions.total_liabilities(), equity)
    } else {
        None
    };

    let (equity_to_assets_pct, current_assets_pct) = if total_assets > 0.0 {
        (
            safe_div(equity, total_assets).map(|r| r * 100.0),
            safe_div(positions.total_current_assets(), total_assets).map(|r| r * 100.0),
        )
    } else {
        (None, None)
    };

    SolvencyMetrics {
        debt_to_equity,
        equity_to_assets_pct,
        current_assets_pct,
    }
}

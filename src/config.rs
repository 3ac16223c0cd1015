use crate::analysis::GENERAL_RECOMMENDATIONS;
use crate::error::{FinancialReportError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tunables shared by the statement builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    #[serde(default = "default_tax_rate")]
    #[schemars(description = "Flat tax rate applied to positive income before taxes (0.0 - 1.0)")]
    pub tax_rate: f64,

    #[serde(default = "default_analysis_cogs_share")]
    #[schemars(
        description = "Share of total expenses the analysis treats as cost of goods sold when estimating gross and operating margins (0.0 - 1.0)"
    )]
    pub analysis_cogs_share: f64,

    #[serde(default = "default_expense_ratio_drift_threshold")]
    #[schemars(
        description = "Minimum change in the quarterly expense-to-income ratio that is reported as a trend"
    )]
    pub expense_ratio_drift_threshold: f64,

    #[serde(default = "default_min_recommendations")]
    #[schemars(description = "The analysis pads its recommendations up to this many entries (1 - 5)")]
    pub min_recommendations: usize,
}

fn default_tax_rate() -> f64 {
    0.21
}

fn default_analysis_cogs_share() -> f64 {
    0.6
}

fn default_expense_ratio_drift_threshold() -> f64 {
    0.05
}

fn default_min_recommendations() -> usize {
    4
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            analysis_cogs_share: default_analysis_cogs_share(),
            expense_ratio_drift_threshold: default_expense_ratio_drift_threshold(),
            min_recommendations: default_min_recommendations(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        validate_rate("tax_rate", self.tax_rate)?;
        validate_rate("analysis_cogs_share", self.analysis_cogs_share)?;

        if !self.expense_ratio_drift_threshold.is_finite() || self.expense_ratio_drift_threshold < 0.0
        {
            return Err(FinancialReportError::InvalidConfig {
                field: "expense_ratio_drift_threshold".to_string(),
                details: format!(
                    "{} must be a non-negative number",
                    self.expense_ratio_drift_threshold
                ),
            });
        }

        if self.min_recommendations == 0 {
            return Err(FinancialReportError::InvalidConfig {
                field: "min_recommendations".to_string(),
                details: "at least one recommendation is always produced".to_string(),
            });
        }

        if self.min_recommendations > GENERAL_RECOMMENDATIONS.len() {
            return Err(FinancialReportError::InvalidConfig {
                field: "min_recommendations".to_string(),
                details: format!(
                    "{} exceeds the {} general recommendations available for padding",
                    self.min_recommendations,
                    GENERAL_RECOMMENDATIONS.len()
                ),
            });
        }

        Ok(())
    }
}

fn validate_rate(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FinancialReportError::InvalidConfig {
            field: field.to_string(),
            details: format!("{} must be between 0.0 and 1.0", value),
        });
    }
    Ok(())
}

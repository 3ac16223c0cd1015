use crate::analysis::{build_analysis_with, Analysis};
use crate::balance_sheet::{build_balance_sheet, BalanceSheet};
use crate::cash_flow::{build_cash_flow, CashFlowStatement};
use crate::config::ReportConfig;
use crate::error::{FinancialReportError, Result};
use crate::income_statement::{build_income_statement_with, IncomeStatement};
use crate::ingestion::{aggregate, FinancialDataset};
use crate::schema::{ReportKind, TransactionRow};
use chrono::{DateTime, Utc};
use log::{error, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const FALLBACK_RECOMMENDATION: &str = "Please try again with valid financial data.";

/// Statement body, serialized under its report-specific key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum ReportBody {
    #[serde(rename = "balance_sheet")]
    BalanceSheet(BalanceSheet),
    #[serde(rename = "income_statement")]
    IncomeStatement(IncomeStatement),
    #[serde(rename = "cash_flow_statement")]
    CashFlow(CashFlowStatement),
    #[serde(rename = "analysis")]
    Analysis(Analysis),
}

impl ReportBody {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::BalanceSheet(_) => ReportKind::BalanceSheet,
            Self::IncomeStatement(_) => ReportKind::IncomeStatement,
            Self::CashFlow(_) => ReportKind::CashFlow,
            Self::Analysis(_) => ReportKind::Analysis,
        }
    }

    /// Statement insights; for the analysis these are its trend sentences.
    pub fn insights(&self) -> &[String] {
        match self {
            Self::BalanceSheet(sheet) => &sheet.insights,
            Self::IncomeStatement(statement) => &statement.insights,
            Self::CashFlow(statement) => &statement.insights,
            Self::Analysis(analysis) => &analysis.trends,
        }
    }

    /// Zero-valued statement that carries `message` as its only insight.
    pub fn fallback(kind: ReportKind, message: &str) -> Self {
        let insights = vec![message.to_string()];
        match kind {
            ReportKind::BalanceSheet => Self::BalanceSheet(BalanceSheet {
                insights,
                ..BalanceSheet::default()
            }),
            ReportKind::IncomeStatement => Self::IncomeStatement(IncomeStatement {
                insights,
                ..IncomeStatement::default()
            }),
            ReportKind::CashFlow => Self::CashFlow(CashFlowStatement {
                insights,
                ..CashFlowStatement::default()
            }),
            ReportKind::Analysis => Self::Analysis(Analysis {
                summary: message.to_string(),
                trends: insights,
                recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
                ..Analysis::default()
            }),
        }
    }
}

/// Uniform envelope handed to persistence and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    #[serde(flatten)]
    pub body: ReportBody,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub summary: Option<String>,
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(body: ReportBody) -> Self {
        let insights = body.insights().to_vec();
        let (recommendations, summary) = match &body {
            ReportBody::Analysis(analysis) => {
                (analysis.recommendations.clone(), Some(analysis.summary.clone()))
            }
            _ => (Vec::new(), None),
        };

        Self {
            body,
            insights,
            recommendations,
            summary,
            error: None,
            generated_at: Utc::now(),
        }
    }

    /// Turns a builder result into a report, replacing failures with a zero-valued statement
    /// that records the error.
    pub fn from_outcome(kind: ReportKind, outcome: Result<ReportBody>) -> Self {
        match outcome {
            Ok(body) => {
                info!("Generated {}", kind.title());
                Self::new(body)
            }
            Err(err) => {
                error!("Error generating {}: {}", kind.title(), err);
                let message = format!("Error generating {}: {}", kind.title(), err);
                let mut report = Self::new(ReportBody::fallback(kind, &message));
                report.error = Some(err.to_string());
                report
            }
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.body.kind()
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Report)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReports {
    pub balance_sheet: Report,
    pub income_statement: Report,
    pub cash_flow: Report,
    pub analysis: Report,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialReportProcessor {
    config: ReportConfig,
}

impl FinancialReportProcessor {
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn build_body(&self, dataset: &FinancialDataset, kind: ReportKind) -> Result<ReportBody> {
        match kind {
            ReportKind::BalanceSheet => build_balance_sheet(dataset).map(ReportBody::BalanceSheet),
            ReportKind::IncomeStatement => build_income_statement_with(dataset, &self.config)
                .map(ReportBody::IncomeStatement),
            ReportKind::CashFlow => build_cash_flow(dataset).map(ReportBody::CashFlow),
            ReportKind::Analysis => {
                build_analysis_with(dataset, &self.config).map(ReportBody::Analysis)
            }
        }
    }

    /// Always returns a well-formed report; builder failures become fallback statements.
    pub fn build(&self, dataset: &FinancialDataset, kind: ReportKind) -> Report {
        Report::from_outcome(kind, self.build_body(dataset, kind))
    }

    pub fn build_all(&self, dataset: &FinancialDataset) -> FinancialReports {
        FinancialReports {
            balance_sheet: self.build(dataset, ReportKind::BalanceSheet),
            income_statement: self.build(dataset, ReportKind::IncomeStatement),
            cash_flow: self.build(dataset, ReportKind::CashFlow),
            analysis: self.build(dataset, ReportKind::Analysis),
        }
    }

    /// Fails only when the rows cannot be aggregated at all.
    pub fn generate_report(&self, rows: &[TransactionRow], kind: ReportKind) -> Result<Report> {
        let dataset = aggregate(rows)?;
        Ok(self.build(&dataset, kind))
    }

    pub fn generate_all(&self, rows: &[TransactionRow]) -> Result<FinancialReports> {
        let dataset = aggregate(rows)?;
        Ok(self.build_all(&dataset))
    }
}

pub fn generate_report(rows: &[TransactionRow], kind: ReportKind) -> Result<Report> {
    FinancialReportProcessor::default().generate_report(rows, kind)
}

pub fn generate_all_reports(rows: &[TransactionRow]) -> Result<FinancialReports> {
    FinancialReportProcessor::default().generate_all(rows)
}

/// Shorthand for the fallback a caller renders when aggregation itself failed.
pub fn empty_report(kind: ReportKind) -> Report {
    Report::from_outcome(kind, Err(FinancialReportError::EmptyDataset))
}

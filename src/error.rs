use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialReportError {
    #[error("No transactions provided: at least one record is required to build a report")]
    EmptyDataset,

    #[error("Invalid amount '{value}' in row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Unrecognized date '{0}': expected YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY")]
    InvalidDate(String),

    #[error("Error computing {statement}: {details}")]
    Computation { statement: String, details: String },

    #[error("Invalid configuration value for {field}: {details}")]
    InvalidConfig { field: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FinancialReportError>;

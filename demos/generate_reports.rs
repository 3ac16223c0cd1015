use financial_statement_engine::{
    aggregate, answer_query, explain_report, FinancialReportProcessor, ReportConfig, ReportKind,
    TransactionRow,
};
use std::error::Error;

fn sample_rows() -> Vec<TransactionRow> {
    vec![
        TransactionRow::new("2024-01-03", "Checking", "Sales", "Income", 12_500.0),
        TransactionRow::new("2024-01-08", "Checking", "Rent", "Expense", 2_200.0),
        TransactionRow::new("2024-01-21", "Accounts Payable", "Cost of Goods Sold", "Expense", 3_100.0),
        TransactionRow::new("2024-02-02", "Checking", "Sales", "Income", 13_800.0),
        TransactionRow::new("2024-02-12", "Credit Card", "Travel", "Expense", 640.5),
        TransactionRow::new("2024-03-05", "Office Equipment", "Equipment Purchase", "Expense", 5_200.0),
        TransactionRow::new("2024-04-02", "Bank Loan", "Loan Proceeds", "Income", 20_000.0),
        TransactionRow::new("2024-04-16", "Checking", "Sales", "Income", 15_900.0),
        TransactionRow::new("2024-05-24", "Checking", "Interest Expense", "Expense", 310.0),
        TransactionRow::new("2024-06-07", "Checking", "Sales", "Income", 16_700.0),
    ]
}

/// Reads `Date,Account,Category,Type,Amount` rows from the CSV file given as the first argument,
/// or falls back to a built-in sample ledger.
fn load_rows() -> Result<Vec<TransactionRow>, Box<dyn Error>> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(sample_rows());
    };

    let mut reader = csv::Reader::from_path(&path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    println!("Loaded {} rows from {}", rows.len(), path);
    Ok(rows)
}

fn main() -> Result<(), Box<dyn Error>> {
    let rows = load_rows()?;
    let dataset = aggregate(&rows)?;

    if !dataset.skipped_rows.is_empty() {
        println!("Skipped {} malformed rows:", dataset.skipped_rows.len());
        for skipped in &dataset.skipped_rows {
            println!(" - row {}: {}", skipped.index, skipped.reason);
        }
    }

    let processor = FinancialReportProcessor::new(ReportConfig::default())?;

    for kind in ReportKind::ALL {
        let report = processor.build(&dataset, kind);
        println!("\n=== {} ===", kind.title().to_uppercase());
        println!("{}", report.to_json()?);

        let explanation = explain_report(&report);
        println!("Confidence: {:?}", explanation.confidence);
        for step in &explanation.process {
            println!(" * {}", step);
        }
    }

    println!("\n=== QUESTIONS ===");
    for question in [
        "What is my revenue?",
        "Where are my biggest expenses?",
        "How is my profit margin?",
        "Show me the monthly trend",
    ] {
        println!("Q: {}\nA: {}\n", question, answer_query(question, Some(&dataset)));
    }

    Ok(())
}

use crate::ingestion::{AggregatedBucket, FinancialDataset};
use crate::utils::{format_currency, percentage_change};
use log::debug;

const TOP_N: usize = 3;

const REVENUE_TERMS: &[&str] = &["revenue", "income", "earnings", "sales"];
const EXPENSE_TERMS: &[&str] = &["expense", "cost", "spending"];
const PROFIT_TERMS: &[&str] = &["profit", "margin"];
const TREND_TERMS: &[&str] = &["trend", "growth", "over time", "monthly", "quarterly"];
const ACCOUNT_TERMS: &[&str] = &["account", "cash"];

const DEFINITION_CUES: &[&str] = &["what is", "explain", "define", "how does"];

/// Fixed explanations for definitional questions asked without any data. Checked in order.
const GLOSSARY: &[(&[&str], &str)] = &[
    (
        &["cash flow", "cashflow"],
        "Cash flow refers to the net amount of cash moving in and out of a business during a specific period. Positive cash flow indicates more money coming in than going out, while negative cash flow means more money is leaving than coming in. Cash flow is divided into three categories: operating (from core business activities), investing (from assets and investments), and financing (from debt and equity financing).",
    ),
    (
        &["balance sheet"],
        "A balance sheet is a financial statement that reports a company's assets, liabilities, and equity at a specific point in time. It shows what a company owns (assets), what it owes (liabilities), and the value that's left for owners (equity). The accounting equation that governs it is: Assets = Liabilities + Equity.",
    ),
    (
        &["income statement", "profit and loss", "p&l"],
        "An income statement, also known as a profit and loss statement (P&L), shows a company's revenues, expenses, and profits over a specific period. It follows a simple formula: Revenue - Expenses = Profit/Loss, and helps evaluate profitability and operational efficiency.",
    ),
    (
        &["revenue", "sales", "income"],
        "Revenue, or sales, represents the total amount of money generated from selling products or services before any expenses are deducted. It's the top line of an income statement, and its growth often signals business expansion, though it doesn't indicate profitability without considering associated costs.",
    ),
    (
        &["expense", "cost", "expenditure"],
        "Expenses are the costs incurred by a business to generate revenue. They include operating expenses (like rent, salaries, utilities), cost of goods sold (direct costs of products), and non-operating expenses (like interest payments). Managing expenses directly impacts bottom-line profit.",
    ),
    (
        &["profit", "margin", "net income"],
        "Profit represents the financial gain when revenue exceeds expenses. Gross profit is revenue minus cost of goods sold, operating profit subtracts operating expenses from gross profit, and net profit subtracts taxes and interest. Profit margins express profit as a percentage of revenue.",
    ),
    (
        &["asset"],
        "Assets are resources owned by a company that have economic value and are expected to provide future benefits. They appear on the balance sheet as current assets (convertible to cash within a year, like inventory) or non-current assets (long-term, like property and equipment).",
    ),
    (
        &["liability", "debt"],
        "Liabilities are financial obligations a company owes to others. They appear on the balance sheet as current liabilities (due within a year, like accounts payable) or non-current liabilities (long-term, like mortgages), and are central to assessing financial risk and leverage.",
    ),
    (
        &["roi", "return on investment"],
        "Return on Investment (ROI) measures the profitability of an investment relative to its cost: ROI = (Net Profit / Cost of Investment) x 100%. A positive ROI indicates a profitable investment, while a negative ROI shows a loss. It doesn't account for the time value of money or risk.",
    ),
];

const EMPTY_QUESTION: &str = "Please provide a question about your financial data.";
const NO_DATA: &str = "I couldn't find specific information in your financial data to answer this question accurately. For personalized insights, please upload transactions and ask about your revenue, expenses, profits, or specific accounts.";

fn mentions_any(question: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| question.contains(term))
}

/// Answers a free-form question about a dataset with deterministic, template-based text.
pub fn answer_query(question: &str, dataset: Option<&FinancialDataset>) -> String {
    let question = question.trim().to_lowercase();
    if question.is_empty() {
        return EMPTY_QUESTION.to_string();
    }

    match dataset.filter(|d| !d.is_empty()) {
        Some(dataset) => answer_from_data(&question, dataset),
        None => answer_from_glossary(&question),
    }
}

fn answer_from_data(question: &str, dataset: &FinancialDataset) -> String {
    if mentions_any(question, REVENUE_TERMS) {
        debug!("Routing question to revenue breakdown");
        let mut answer = format!(
            "Based on your financial data, your total revenue is {}.",
            format_currency(dataset.income)
        );
        let top = top_categories(dataset, |bucket| bucket.income);
        if !top.is_empty() {
            answer.push_str(&format!(" Your top revenue categories are {}.", top));
        }
        answer
    } else if mentions_any(question, EXPENSE_TERMS) {
        debug!("Routing question to expense breakdown");
        let mut answer = format!(
            "Based on your financial data, your total expenses are {}.",
            format_currency(dataset.expenses)
        );
        let top = top_categories(dataset, |bucket| bucket.expenses);
        if !top.is_empty() {
            answer.push_str(&format!(" Your top expense categories are {}.", top));
        }
        answer
    } else if mentions_any(question, PROFIT_TERMS) {
        profit_answer(dataset)
    } else if mentions_any(question, TREND_TERMS) {
        trend_answer(dataset)
    } else if mentions_any(question, ACCOUNT_TERMS) {
        account_answer(dataset)
    } else {
        let mut answer = format!(
            "Based on your financial data, your total revenue is {} and total expenses are {}, resulting in a net income of {}.",
            format_currency(dataset.income),
            format_currency(dataset.expenses),
            format_currency(dataset.net_income)
        );
        if dataset.income > 0.0 {
            answer.push_str(&format!(
                " Your profit margin is {:.1}%.",
                dataset.net_income / dataset.income * 100.0
            ));
        }
        answer
    }
}

/// `Name ($1,234.00), ...` for the largest positive values, highest first.
fn top_categories(dataset: &FinancialDataset, value: impl Fn(&AggregatedBucket) -> f64) -> String {
    let mut ranked: Vec<(&String, f64)> = dataset
        .by_category
        .iter()
        .map(|(name, bucket)| (name, value(bucket)))
        .filter(|(_, amount)| *amount > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_N)
        .map(|(name, amount)| format!("{} ({})", name, format_currency(amount)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn profit_answer(dataset: &FinancialDataset) -> String {
    let margin = if dataset.income > 0.0 {
        dataset.net_income / dataset.income * 100.0
    } else {
        0.0
    };

    let verdict = if margin > 20.0 {
        "This is a strong profit margin compared to industry averages."
    } else if margin > 10.0 {
        "This is a good profit margin within normal industry ranges."
    } else if margin > 0.0 {
        "This is a positive but below-average profit margin."
    } else {
        "You are currently operating at a loss."
    };

    format!(
        "Your net income is {} with a profit margin of {:.1}%. {}",
        format_currency(dataset.net_income),
        margin,
        verdict
    )
}

fn trend_answer(dataset: &FinancialDataset) -> String {
    if dataset.by_month.len() > 1 {
        if let (Some((first_key, first)), Some((last_key, last))) =
            (dataset.first_month(), dataset.last_month())
        {
            let mut answer = String::new();
            if first.income > 0.0 {
                if let Some(growth) = percentage_change(first.income, last.income) {
                    answer.push_str(&format!(
                        "Your revenue growth from {} to {} was {:.1}%. ",
                        first_key, last_key, growth
                    ));
                }
            }
            answer.push_str(&format!(
                "Your most recent monthly revenue was {}.",
                format_currency(last.income)
            ));
            return answer;
        }
    }

    let mut recent = dataset.quarters.iter().rev();
    if let (Some((last_key, last)), Some((_, previous))) = (recent.next(), recent.next()) {
        let mut answer = format!(
            "Revenue for {} was {}",
            last_key,
            format_currency(last.income)
        );
        match percentage_change(previous.income, last.income) {
            Some(change) if change > 0.0 => {
                answer.push_str(&format!(", up {:.1}% from the previous quarter.", change))
            }
            Some(change) => answer.push_str(&format!(
                ", down {:.1}% from the previous quarter.",
                change.abs()
            )),
            None => answer.push('.'),
        }
        return answer;
    }

    "There are not enough dated transactions to describe a trend yet.".to_string()
}

fn account_answer(dataset: &FinancialDataset) -> String {
    let mut ranked: Vec<(&String, f64)> = dataset
        .by_account
        .iter()
        .map(|(name, bucket)| (name, bucket.net))
        .collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let balances = ranked
        .into_iter()
        .take(TOP_N)
        .map(|(name, net)| format!("{}: {}", name, format_currency(net)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Your top account balances are: {}.", balances)
}

fn answer_from_glossary(question: &str) -> String {
    if mentions_any(question, DEFINITION_CUES) {
        if let Some((_, text)) = GLOSSARY
            .iter()
            .find(|(terms, _)| mentions_any(question, terms))
        {
            return text.to_string();
        }
    }
    NO_DATA.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::aggregate;
    use crate::schema::TransactionRow;

    fn dataset() -> FinancialDataset {
        let rows = vec![
            TransactionRow::new("2024-01-05", "Cash", "Sales", "Income", 1_000.0),
            TransactionRow::new("2024-01-10", "Cash", "Consulting", "Income", 400.0),
            TransactionRow::new("2024-01-12", "Accounts Payable", "Rent", "Expense", 300.0),
            TransactionRow::new("2024-03-05", "Cash", "Sales", "Income", 1_500.0),
            TransactionRow::new("2024-03-09", "Credit Card", "Travel", "Expense", 200.0),
        ];
        aggregate(&rows).unwrap()
    }

    #[test]
    fn test_empty_question() {
        assert_eq!(answer_query("   ", Some(&dataset())), EMPTY_QUESTION);
    }

    #[test]
    fn test_revenue_question_lists_top_categories() {
        let answer = answer_query("What was my revenue?", Some(&dataset()));
        assert_eq!(
            answer,
            "Based on your financial data, your total revenue is $2,900.00. Your top revenue categories are Sales ($2,500.00), Consulting ($400.00)."
        );
    }

    #[test]
    fn test_expense_question() {
        let answer = answer_query("Where is my spending going", Some(&dataset()));
        assert!(answer.starts_with("Based on your financial data, your total expenses are $500.00."));
        assert!(answer.ends_with("Rent ($300.00), Travel ($200.00)."));
    }

    #[test]
    fn test_profit_question() {
        let answer = answer_query("How is my margin?", Some(&dataset()));
        assert_eq!(
            answer,
            "Your net income is $2,400.00 with a profit margin of 82.8%. This is a strong profit margin compared to industry averages."
        );
    }

    #[test]
    fn test_trend_question() {
        let answer = answer_query("Show me the growth", Some(&dataset()));
        assert_eq!(
            answer,
            "Your revenue growth from 2024-01 to 2024-03 was 7.1%. Your most recent monthly revenue was $1,500.00."
        );
    }

    #[test]
    fn test_account_question_ranks_by_magnitude() {
        let answer = answer_query("which accounts matter", Some(&dataset()));
        assert_eq!(
            answer,
            "Your top account balances are: Cash: $2,900.00, Accounts Payable: $-300.00, Credit Card: $-200.00."
        );
    }

    #[test]
    fn test_default_answer() {
        let answer = answer_query("Give me an overview", Some(&dataset()));
        assert!(answer.contains("resulting in a net income of $2,400.00."));
        assert!(answer.ends_with("Your profit margin is 82.8%."));
    }

    #[test]
    fn test_glossary_without_data() {
        let answer = answer_query("What is a balance sheet?", None);
        assert!(answer.starts_with("A balance sheet is a financial statement"));

        let answer = answer_query("Explain cash flow", None);
        assert!(answer.starts_with("Cash flow refers to"));

        assert_eq!(answer_query("How much did I make?", None), NO_DATA);
        assert_eq!(answer_query("What is the weather?", None), NO_DATA);
    }
}

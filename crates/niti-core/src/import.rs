//! Expense and budget import from CSV or JSON files
//!
//! CSV files need a header row. Columns are matched by name (case-insensitive),
//! so their order does not matter:
//! - expenses: `date,category,amount[,description]`
//! - budgets: `category,limit`
//!
//! JSON files hold an array of objects with the same field names.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{BudgetRecord, ExpenseRecord};

/// File format, chosen from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::Import(format!(
                "Unsupported file type for {} (expected .csv or .json)",
                path.display()
            ))),
        }
    }
}

/// Load expenses from a `.csv` or `.json` file
pub fn load_expenses(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let format = ImportFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let expenses = match format {
        ImportFormat::Csv => parse_expenses_csv(content.as_bytes())?,
        ImportFormat::Json => parse_expenses_json(&content)?,
    };
    info!(path = %path.display(), count = expenses.len(), "Loaded expenses");
    Ok(expenses)
}

/// Load budgets from a `.csv` or `.json` file
pub fn load_budgets(path: &Path) -> Result<Vec<BudgetRecord>> {
    let format = ImportFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let budgets = match format {
        ImportFormat::Csv => parse_budgets_csv(content.as_bytes())?,
        ImportFormat::Json => parse_budgets_json(&content)?,
    };
    info!(path = %path.display(), count = budgets.len(), "Loaded budgets");
    Ok(budgets)
}

/// Parse expense CSV
pub fn parse_expenses_csv<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_col = require_column(&headers, "date")?;
    let category_col = require_column(&headers, "category")?;
    let amount_col = require_column(&headers, "amount")?;
    let description_col = find_column(&headers, "description");

    let mut expenses = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Line 1 is the header
        let row = i + 2;
        let record = result?;

        let date = parse_date(field(&record, date_col, "date", row)?, row)?;
        let category = field(&record, category_col, "category", row)?;
        let amount = parse_amount(field(&record, amount_col, "amount", row)?, row)?;
        let description = description_col
            .and_then(|c| record.get(c))
            .filter(|s| !s.is_empty());

        if let Some(expense) = build_expense(row, date, category, amount, description)? {
            expenses.push(expense);
        }
    }

    debug!("Parsed {} expenses from CSV", expenses.len());
    Ok(expenses)
}

/// Parse budget CSV
pub fn parse_budgets_csv<R: Read>(reader: R) -> Result<Vec<BudgetRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let category_col = require_column(&headers, "category")?;
    let limit_col = require_column(&headers, "limit")?;

    let mut budgets = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 2;
        let record = result?;

        let category = field(&record, category_col, "category", row)?;
        let limit = parse_amount(field(&record, limit_col, "limit", row)?, row)?;
        budgets.push(build_budget(row, category, limit)?);
    }

    debug!("Parsed {} budgets from CSV", budgets.len());
    Ok(budgets)
}

#[derive(Debug, Deserialize)]
struct RawExpense {
    date: String,
    category: String,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    category: String,
    limit: f64,
}

/// Parse a JSON array of expenses
pub fn parse_expenses_json(content: &str) -> Result<Vec<ExpenseRecord>> {
    let raw: Vec<RawExpense> = serde_json::from_str(content)?;

    let mut expenses = Vec::with_capacity(raw.len());
    for (i, item) in raw.iter().enumerate() {
        let row = i + 1;
        let date = parse_date(&item.date, row)?;
        let description = item.description.as_deref().filter(|s| !s.trim().is_empty());
        if let Some(expense) = build_expense(row, date, &item.category, item.amount, description)? {
            expenses.push(expense);
        }
    }

    debug!("Parsed {} expenses from JSON", expenses.len());
    Ok(expenses)
}

/// Parse a JSON array of budgets
pub fn parse_budgets_json(content: &str) -> Result<Vec<BudgetRecord>> {
    let raw: Vec<RawBudget> = serde_json::from_str(content)?;

    raw.iter()
        .enumerate()
        .map(|(i, item)| build_budget(i + 1, &item.category, item.limit))
        .collect()
}

/// Validate and normalize one expense; `None` means the row is skipped
fn build_expense(
    row: usize,
    date: NaiveDate,
    category: &str,
    amount: f64,
    description: Option<&str>,
) -> Result<Option<ExpenseRecord>> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::Import(format!("Row {}: empty category", row)));
    }
    if !amount.is_finite() {
        return Err(Error::Import(format!("Row {}: amount is not a number", row)));
    }
    if amount == 0.0 {
        debug!(row, category, "Skipping zero-amount expense");
        return Ok(None);
    }

    // Bank exports often record debits as negative numbers
    let mut expense = ExpenseRecord::new(amount.abs(), category, date);
    if let Some(description) = description {
        expense = expense.with_description(description.trim());
    }
    Ok(Some(expense))
}

fn build_budget(row: usize, category: &str, limit: f64) -> Result<BudgetRecord> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::Import(format!("Row {}: empty category", row)));
    }
    if !limit.is_finite() || limit < 0.0 {
        return Err(Error::Import(format!(
            "Row {}: budget limit must be a non-negative number",
            row
        )));
    }
    Ok(BudgetRecord::new(category, limit))
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name)
        .ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
}

fn field<'r>(record: &'r StringRecord, col: usize, name: &str, row: usize) -> Result<&'r str> {
    record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
}

/// Parse `YYYY-MM-DD` or `MM/DD/YYYY`
fn parse_date(s: &str, row: usize) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!(
        "Row {}: unable to parse date: {}",
        row, s
    )))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str, row: usize) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['₹', '$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Row {}: unable to parse amount: {}", row, s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("01/15/2024", 2).unwrap(), ymd(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15", 2).unwrap(), ymd(2024, 1, 15));
        assert!(parse_date("15.01.2024", 2).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("₹1,234.56", 2).unwrap(), 1234.56);
        assert_eq!(parse_amount("-123.45", 2).unwrap(), -123.45);
        assert_eq!(parse_amount("(100.00)", 2).unwrap(), -100.00);
        assert!(parse_amount("lots", 2).is_err());
    }

    #[test]
    fn test_parse_expenses_csv() {
        let csv = "date,category,amount,description
2026-06-01,Food & Dining,450.50,Groceries
06/02/2026,Transport,-120,
2026-06-03,Misc,0,ignored";

        let expenses = parse_expenses_csv(csv.as_bytes()).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].category, "Food & Dining");
        assert_eq!(expenses[0].amount, 450.50);
        assert_eq!(expenses[0].description.as_deref(), Some("Groceries"));
        assert_eq!(expenses[1].date, ymd(2026, 6, 2));
        assert_eq!(expenses[1].amount, 120.0);
        assert!(expenses[1].description.is_none());
    }

    #[test]
    fn test_parse_expenses_csv_column_order() {
        let csv = "Amount,Category,Date\n99,Rent,2026-05-01";

        let expenses = parse_expenses_csv(csv.as_bytes()).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category, "Rent");
        assert_eq!(expenses[0].date, ymd(2026, 5, 1));
    }

    #[test]
    fn test_parse_expenses_csv_reports_row() {
        let csv = "date,category,amount\n2026-06-01,Food,10\n2026-06-02,Food,abc";

        let err = parse_expenses_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(ref msg) if msg.starts_with("Row 3:")));
    }

    #[test]
    fn test_parse_expenses_csv_missing_column() {
        let csv = "date,amount\n2026-06-01,10";
        let err = parse_expenses_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_parse_budgets_csv() {
        let csv = "category,limit\nFood & Dining,\"5,000\"\nShopping,2000";

        let budgets = parse_budgets_csv(csv.as_bytes()).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Food & Dining");
        assert_eq!(budgets[0].limit, 5000.0);

        let err = parse_budgets_csv("category,limit\nFood,-5".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn test_parse_expenses_json() {
        let json = r#"[
            {"date": "2026-06-01", "category": "Food", "amount": 100},
            {"date": "06/05/2026", "category": "Travel", "amount": -40.5, "description": "Cab"},
            {"date": "2026-06-06", "category": "Misc", "amount": 0}
        ]"#;

        let expenses = parse_expenses_json(json).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[1].amount, 40.5);
        assert_eq!(expenses[1].description.as_deref(), Some("Cab"));

        let err = parse_expenses_json(r#"[{"date": "x", "category": "Food", "amount": 1}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn test_parse_budgets_json() {
        let budgets = parse_budgets_json(r#"[{"category": "Food", "limit": 3000}]"#).unwrap();
        assert_eq!(budgets, vec![BudgetRecord::new("Food", 3000.0)]);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("expenses.CSV");
        std::fs::write(&csv_path, "date,category,amount\n2026-06-01,Food,10").unwrap();
        assert_eq!(load_expenses(&csv_path).unwrap().len(), 1);

        let json_path = dir.path().join("budgets.json");
        std::fs::write(&json_path, r#"[{"category": "Food", "limit": 10}]"#).unwrap();
        assert_eq!(load_budgets(&json_path).unwrap().len(), 1);

        let txt_path = dir.path().join("expenses.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(load_expenses(&txt_path), Err(Error::Import(_))));
    }
}

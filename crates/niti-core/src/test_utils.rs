//! Test utilities for niti-core
//!
//! Small builders for expense/budget fixtures and a canned context, shared by
//! unit tests here and by the CLI test suite (via the `test-utils`
//! feature).

use chrono::{Months, NaiveDate};

use crate::models::{
    BudgetRecord, ExpenseRecord, FinancialContext, FinancialSituation, LifeStage, RiskProfile,
    SpendingPatterns, SpendingTrend,
};

/// Fixed "today" so month arithmetic in tests is deterministic
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid fixture date")
}

/// The same day-of-month `n` months before [`fixed_today`]
pub fn months_ago(n: u32) -> NaiveDate {
    fixed_today()
        .checked_sub_months(Months::new(n))
        .expect("fixture date in range")
}

pub fn expense(amount: f64, category: &str, date: NaiveDate) -> ExpenseRecord {
    ExpenseRecord::new(amount, category, date)
}

pub fn budget(category: &str, limit: f64) -> BudgetRecord {
    BudgetRecord::new(category, limit)
}

/// A context with modest round numbers: 100 spent, 125 estimated income,
/// 20% savings, professional with a moderate risk profile
pub fn sample_context(situation: FinancialSituation) -> FinancialContext {
    FinancialContext {
        current_situation: situation,
        spending_patterns: SpendingPatterns {
            monthly_expenses: 100.0,
            top_categories: vec!["Food & Dining".to_string()],
            monthly_average: 100.0,
            estimated_income: 125.0,
            monthly_income: None,
            savings_rate: 0.2,
            spending_trend: SpendingTrend::Stable,
        },
        financial_goals: vec![
            "Financial stability".to_string(),
            "Emergency fund building".to_string(),
        ],
        risk_profile: RiskProfile::Moderate,
        life_stage: LifeStage::Professional,
    }
}

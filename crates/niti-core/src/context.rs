//! Context Analyzer
//!
//! Derives a [`FinancialContext`] snapshot from raw expense and budget records:
//! - Current-month spend and top categories
//! - Long-run monthly average and an estimated income
//! - Savings rate and spending trend
//! - Situation, goals, risk profile and life stage heuristics
//!
//! The analyzer is a pure function of its inputs plus "today". It never fails:
//! empty inputs produce a fully populated context with conservative defaults.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::models::{
    BudgetRecord, ContextOverrides, ExpenseRecord, FinancialContext, FinancialSituation,
    LifeStage, RiskProfile, SpendingPatterns, SpendingTrend,
};

const GOAL_TRAVEL: &str = "Travel and experiences";
const GOAL_EDUCATION: &str = "Education and skill development";
const GOAL_WEALTH: &str = "Wealth building";
const GOAL_INDEPENDENCE: &str = "Financial independence";
const GOAL_EMERGENCY_FUND: &str = "Emergency fund building";
const GOAL_STABILITY: &str = "Financial stability";

/// Builds financial context snapshots
pub struct ContextAnalyzer<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> ContextAnalyzer<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze using the local clock for "current month"
    pub fn analyze_now(
        &self,
        expenses: &[ExpenseRecord],
        budgets: &[BudgetRecord],
        overrides: Option<&ContextOverrides>,
    ) -> FinancialContext {
        let today = chrono::Local::now().date_naive();
        self.analyze(expenses, budgets, overrides, today)
    }

    /// Analyze records as of `today`
    pub fn analyze(
        &self,
        expenses: &[ExpenseRecord],
        budgets: &[BudgetRecord],
        overrides: Option<&ContextOverrides>,
        today: NaiveDate,
    ) -> FinancialContext {
        let current: Vec<&ExpenseRecord> = expenses
            .iter()
            .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
            .collect();

        let monthly_expenses: f64 = current.iter().map(|e| e.amount).sum();
        let category_totals = totals_by_category(&current);
        let top_categories: Vec<String> = category_totals
            .iter()
            .take(self.config.top_category_limit)
            .map(|(category, _)| category.clone())
            .collect();

        let monthly_average = monthly_average(expenses);
        let estimated_income = monthly_average * self.config.income_multiplier;
        let savings_rate = if estimated_income > 0.0 {
            ((estimated_income - monthly_expenses) / estimated_income).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let spending_trend = self.spending_trend(monthly_expenses, monthly_average);

        let patterns = SpendingPatterns {
            monthly_expenses,
            top_categories,
            monthly_average,
            estimated_income,
            monthly_income: None,
            savings_rate,
            spending_trend,
        };

        let current_situation = self.situation(&patterns, &category_totals, &current, budgets);
        let financial_goals = self.goals(budgets, savings_rate);
        let risk_profile = self.risk_profile(expenses, savings_rate);
        let life_stage = self.life_stage(&patterns.top_categories);

        debug!(
            expenses = expenses.len(),
            current_month = current.len(),
            budgets = budgets.len(),
            situation = current_situation.as_str(),
            savings_rate,
            trend = spending_trend.as_str(),
            "Analyzed financial context"
        );

        let mut ctx = FinancialContext {
            current_situation,
            spending_patterns: patterns,
            financial_goals,
            risk_profile,
            life_stage,
        };

        if let Some(overrides) = overrides {
            overrides.apply(&mut ctx);
        }

        ctx
    }

    fn spending_trend(&self, monthly_expenses: f64, monthly_average: f64) -> SpendingTrend {
        if monthly_average <= 0.0 {
            return SpendingTrend::Stable;
        }
        let band = self.config.trend_dead_band;
        if monthly_expenses > monthly_average * (1.0 + band) {
            SpendingTrend::Increasing
        } else if monthly_expenses < monthly_average * (1.0 - band) {
            SpendingTrend::Decreasing
        } else {
            SpendingTrend::Stable
        }
    }

    /// First matching rule wins; the order is significant
    fn situation(
        &self,
        patterns: &SpendingPatterns,
        category_totals: &[(String, f64)],
        current: &[&ExpenseRecord],
        budgets: &[BudgetRecord],
    ) -> FinancialSituation {
        let over_budget = budgets.iter().find(|budget| {
            let key = category_key(&budget.category);
            let spent: f64 = category_totals
                .iter()
                .filter(|(category, _)| category_key(category) == key)
                .map(|(_, total)| total)
                .sum();
            spent > budget.limit
        });
        if let Some(budget) = over_budget {
            debug!(category = %budget.category, limit = budget.limit, "Budget exceeded");
            return FinancialSituation::Overspending;
        }

        // A zero savings rate with no history at all is absence of data, not a shortfall
        if patterns.estimated_income > 0.0 && patterns.savings_rate < self.config.low_savings_rate
        {
            return FinancialSituation::Saving;
        }

        if patterns.spending_trend == SpendingTrend::Increasing {
            return FinancialSituation::Overspending;
        }

        if budgets.is_empty() {
            return FinancialSituation::Budgeting;
        }

        let investing = current.iter().any(|e| {
            contains_any(&e.category.to_lowercase(), &self.config.investment_keywords)
        });
        if investing {
            return FinancialSituation::Investing;
        }

        FinancialSituation::FinancialPlanning
    }

    fn goals(&self, budgets: &[BudgetRecord], savings_rate: f64) -> Vec<String> {
        let mut goals: Vec<String> = Vec::new();
        let mut push = |goal: &str| {
            if !goals.iter().any(|g| g == goal) {
                goals.push(goal.to_string());
            }
        };

        for budget in budgets {
            let category = budget.category.to_lowercase();
            if category.contains("travel") {
                push(GOAL_TRAVEL);
            }
            if category.contains("education") {
                push(GOAL_EDUCATION);
            }
            if category.contains("investment") || category.contains("savings") {
                push(GOAL_WEALTH);
            }
        }

        if savings_rate > self.config.independence_savings_rate {
            push(GOAL_INDEPENDENCE);
        } else if savings_rate > self.config.emergency_fund_savings_rate {
            push(GOAL_EMERGENCY_FUND);
        }

        if goals.is_empty() {
            goals.push(GOAL_STABILITY.to_string());
            goals.push(GOAL_EMERGENCY_FUND.to_string());
        }

        goals
    }

    fn risk_profile(&self, expenses: &[ExpenseRecord], savings_rate: f64) -> RiskProfile {
        if savings_rate > self.config.conservative_savings_rate {
            return RiskProfile::Conservative;
        }
        let variation = coefficient_of_variation(expenses);
        if variation > self.config.aggressive_variation {
            RiskProfile::Aggressive
        } else {
            RiskProfile::Moderate
        }
    }

    fn life_stage(&self, top_categories: &[String]) -> LifeStage {
        let lowered: Vec<String> = top_categories.iter().map(|c| c.to_lowercase()).collect();
        if lowered
            .iter()
            .any(|c| contains_any(c, &self.config.student_keywords))
        {
            LifeStage::Student
        } else if lowered
            .iter()
            .any(|c| contains_any(c, &self.config.family_keywords))
        {
            LifeStage::Family
        } else {
            LifeStage::Professional
        }
    }
}

/// Category totals, highest first; ties keep first-seen order
fn totals_by_category(expenses: &[&ExpenseRecord]) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for expense in expenses {
        match index.get(expense.category.as_str()) {
            Some(&i) => totals[i].1 += expense.amount,
            None => {
                index.insert(expense.category.as_str(), totals.len());
                totals.push((expense.category.clone(), expense.amount));
            }
        }
    }

    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals
}

/// Average of per-calendar-month totals across all expenses
fn monthly_average(expenses: &[ExpenseRecord]) -> f64 {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for expense in expenses {
        *by_month
            .entry((expense.date.year(), expense.date.month()))
            .or_insert(0.0) += expense.amount;
    }
    if by_month.is_empty() {
        return 0.0;
    }
    by_month.values().sum::<f64>() / by_month.len() as f64
}

/// Population standard deviation over mean of individual amounts
fn coefficient_of_variation(expenses: &[ExpenseRecord]) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }
    let n = expenses.len() as f64;
    let mean = expenses.iter().map(|e| e.amount).sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = expenses
        .iter()
        .map(|e| (e.amount - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt() / mean
}

/// Budget and expense categories match ignoring case and surrounding whitespace
fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{budget, expense, fixed_today, months_ago};

    fn analyze(expenses: &[ExpenseRecord], budgets: &[BudgetRecord]) -> FinancialContext {
        let config = AnalyzerConfig::default();
        ContextAnalyzer::new(&config).analyze(expenses, budgets, None, fixed_today())
    }

    #[test]
    fn test_empty_input_defaults() {
        let ctx = analyze(&[], &[]);

        assert_eq!(ctx.spending_patterns.monthly_expenses, 0.0);
        assert!(ctx.spending_patterns.top_categories.is_empty());
        assert_eq!(ctx.spending_patterns.savings_rate, 0.0);
        assert_eq!(ctx.spending_patterns.spending_trend, SpendingTrend::Stable);
        assert_eq!(ctx.current_situation, FinancialSituation::Budgeting);
        assert_eq!(
            ctx.financial_goals,
            vec![GOAL_STABILITY.to_string(), GOAL_EMERGENCY_FUND.to_string()]
        );
        assert_eq!(ctx.risk_profile, RiskProfile::Moderate);
        assert_eq!(ctx.life_stage, LifeStage::Professional);
    }

    #[test]
    fn test_single_expense_no_budgets_is_budgeting() {
        let ctx = analyze(&[expense(100.0, "Food & Dining", fixed_today())], &[]);

        assert_eq!(ctx.current_situation, FinancialSituation::Budgeting);
        assert_eq!(ctx.spending_patterns.top_categories, vec!["Food & Dining"]);
        assert_eq!(ctx.spending_patterns.monthly_expenses, 100.0);
        assert_eq!(ctx.spending_patterns.estimated_income, 125.0);
        assert!((ctx.spending_patterns.savings_rate - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_budget_exceeded_is_overspending() {
        let today = fixed_today();
        let ctx = analyze(
            &[expense(150.0, "Shopping", today)],
            &[budget("shopping", 100.0)],
        );
        assert_eq!(ctx.current_situation, FinancialSituation::Overspending);
    }

    #[test]
    fn test_budget_match_ignores_padding_and_case() {
        let today = fixed_today();
        let ctx = analyze(&[expense(150.0, "Food ", today)], &[budget("Food", 100.0)]);
        assert_eq!(ctx.current_situation, FinancialSituation::Overspending);

        let ctx = analyze(
            &[expense(150.0, "ÉPICERIE", today)],
            &[budget(" épicerie", 100.0)],
        );
        assert_eq!(ctx.current_situation, FinancialSituation::Overspending);
    }

    #[test]
    fn test_rising_spend_within_savings_target_is_overspending() {
        // Average of (100, 125) = 112.5 → income 140.6, rate 0.11; 125 > 112.5 * 1.1
        let ctx = analyze(
            &[
                expense(100.0, "Groceries", months_ago(1)),
                expense(125.0, "Groceries", fixed_today()),
            ],
            &[budget("Groceries", 500.0)],
        );
        assert_eq!(ctx.spending_patterns.spending_trend, SpendingTrend::Increasing);
        assert!(ctx.spending_patterns.savings_rate >= 0.1);
        assert_eq!(ctx.current_situation, FinancialSituation::Overspending);
    }

    #[test]
    fn test_budget_check_only_counts_current_month() {
        let ctx = analyze(
            &[
                expense(80.0, "Shopping", fixed_today()),
                expense(500.0, "Shopping", months_ago(1)),
            ],
            &[budget("Shopping", 100.0)],
        );
        assert_ne!(ctx.current_situation, FinancialSituation::Overspending);
    }

    #[test]
    fn test_low_savings_rate_is_saving() {
        // Average of (100, 300) = 200 → income 250, this month 300 → rate 0
        let ctx = analyze(
            &[
                expense(100.0, "Rent", months_ago(1)),
                expense(300.0, "Rent", fixed_today()),
            ],
            &[budget("Rent", 1000.0)],
        );
        assert_eq!(ctx.spending_patterns.savings_rate, 0.0);
        assert_eq!(ctx.current_situation, FinancialSituation::Saving);
    }

    #[test]
    fn test_trend_dead_band() {
        let config = AnalyzerConfig::default();
        let analyzer = ContextAnalyzer::new(&config);
        assert_eq!(analyzer.spending_trend(100.0, 100.0), SpendingTrend::Stable);
        assert_eq!(analyzer.spending_trend(109.0, 100.0), SpendingTrend::Stable);
        assert_eq!(analyzer.spending_trend(111.0, 100.0), SpendingTrend::Increasing);
        assert_eq!(analyzer.spending_trend(89.0, 100.0), SpendingTrend::Decreasing);
        assert_eq!(analyzer.spending_trend(50.0, 0.0), SpendingTrend::Stable);
    }

    #[test]
    fn test_investment_category_is_investing() {
        // Two equal months keep the trend stable and the savings rate at 0.2
        let ctx = analyze(
            &[
                expense(100.0, "Mutual Funds", fixed_today()),
                expense(100.0, "Groceries", months_ago(1)),
            ],
            &[budget("Groceries", 500.0)],
        );
        assert_eq!(ctx.current_situation, FinancialSituation::Investing);
    }

    #[test]
    fn test_default_is_financial_planning() {
        let ctx = analyze(
            &[
                expense(100.0, "Groceries", fixed_today()),
                expense(100.0, "Groceries", months_ago(1)),
            ],
            &[budget("Groceries", 500.0)],
        );
        assert_eq!(ctx.current_situation, FinancialSituation::FinancialPlanning);
    }

    #[test]
    fn test_top_categories_sorted_and_limited() {
        let today = fixed_today();
        let expenses = vec![
            expense(10.0, "A", today),
            expense(60.0, "B", today),
            expense(30.0, "C", today),
            expense(30.0, "D", today),
            expense(5.0, "E", today),
            expense(1.0, "F", today),
            expense(25.0, "A", today),
        ];
        let ctx = analyze(&expenses, &[]);
        assert_eq!(
            ctx.spending_patterns.top_categories,
            vec!["B", "A", "C", "D", "E"]
        );
    }

    #[test]
    fn test_goals_from_budgets_and_savings() {
        let ctx = analyze(
            &[
                expense(50.0, "Travel", fixed_today()),
                expense(200.0, "Travel", months_ago(1)),
            ],
            &[
                budget("Travel", 1000.0),
                budget("Education", 500.0),
                budget("Savings", 100.0),
                budget("Investments", 100.0),
            ],
        );
        assert_eq!(
            ctx.financial_goals,
            vec![
                GOAL_TRAVEL.to_string(),
                GOAL_EDUCATION.to_string(),
                GOAL_WEALTH.to_string(),
                GOAL_INDEPENDENCE.to_string(),
            ]
        );
    }

    #[test]
    fn test_risk_profile_rules() {
        // High savings rate wins over variation
        let ctx = analyze(
            &[
                expense(10.0, "Misc", fixed_today()),
                expense(1000.0, "Misc", months_ago(1)),
            ],
            &[],
        );
        assert_eq!(ctx.risk_profile, RiskProfile::Conservative);

        // Same month, very uneven amounts: CoV above 1.5
        let today = fixed_today();
        let mut expenses: Vec<ExpenseRecord> =
            (0..9).map(|_| expense(1.0, "Snacks", today)).collect();
        expenses.push(expense(500.0, "Electronics", today));
        let ctx = analyze(&expenses, &[]);
        assert_eq!(ctx.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn test_life_stage_from_top_categories() {
        let today = fixed_today();
        let ctx = analyze(&[expense(40.0, "Books", today)], &[]);
        assert_eq!(ctx.life_stage, LifeStage::Student);

        let ctx = analyze(&[expense(40.0, "Kids Activities", today)], &[]);
        assert_eq!(ctx.life_stage, LifeStage::Family);
    }

    #[test]
    fn test_overrides_win() {
        let config = AnalyzerConfig::default();
        let overrides = ContextOverrides {
            current_situation: Some(FinancialSituation::DebtManagement),
            monthly_income: Some(50_000.0),
            ..Default::default()
        };
        let ctx = ContextAnalyzer::new(&config).analyze(
            &[expense(100.0, "Food", fixed_today())],
            &[],
            Some(&overrides),
            fixed_today(),
        );
        assert_eq!(ctx.current_situation, FinancialSituation::DebtManagement);
        assert_eq!(ctx.spending_patterns.monthly_income, Some(50_000.0));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let expenses = vec![
            expense(100.0, "Food", fixed_today()),
            expense(250.0, "Rent", months_ago(2)),
        ];
        let budgets = vec![budget("Food", 300.0)];
        assert_eq!(analyze(&expenses, &budgets), analyze(&expenses, &budgets));
    }

    #[test]
    fn test_savings_rate_always_in_range() {
        let today = fixed_today();
        let cases: Vec<Vec<ExpenseRecord>> = vec![
            vec![expense(0.01, "A", today)],
            vec![expense(1_000_000.0, "A", today), expense(1.0, "A", months_ago(5))],
            vec![expense(5.0, "A", months_ago(3))],
        ];
        for expenses in cases {
            let rate = analyze(&expenses, &[]).spending_patterns.savings_rate;
            assert!((0.0..=1.0).contains(&rate), "rate {} out of range", rate);
        }
    }
}

//! Domain models for Niti

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single expense, as recorded by the user's expense store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Amount spent (always positive)
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExpenseRecord {
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            category: category.into(),
            date,
            description: None,
        }
    }

    /// Add a free-text description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A per-category monthly spending limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub category: String,
    pub limit: f64,
}

impl BudgetRecord {
    pub fn new(category: impl Into<String>, limit: f64) -> Self {
        Self {
            category: category.into(),
            limit,
        }
    }
}

/// The user's overall financial situation, also used as the scenario id
/// in the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialSituation {
    Budgeting,
    Saving,
    Investing,
    DebtManagement,
    FinancialPlanning,
    Overspending,
}

impl FinancialSituation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budgeting => "budgeting",
            Self::Saving => "saving",
            Self::Investing => "investing",
            Self::DebtManagement => "debt_management",
            Self::FinancialPlanning => "financial_planning",
            Self::Overspending => "overspending",
        }
    }

    /// Human-readable label for prompts and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Budgeting => "Budgeting",
            Self::Saving => "Saving",
            Self::Investing => "Investing",
            Self::DebtManagement => "Debt management",
            Self::FinancialPlanning => "Financial planning",
            Self::Overspending => "Overspending",
        }
    }

    pub fn all() -> &'static [FinancialSituation] {
        &[
            Self::Budgeting,
            Self::Saving,
            Self::Investing,
            Self::DebtManagement,
            Self::FinancialPlanning,
            Self::Overspending,
        ]
    }
}

impl std::str::FromStr for FinancialSituation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "budgeting" => Ok(Self::Budgeting),
            "saving" => Ok(Self::Saving),
            "investing" => Ok(Self::Investing),
            "debt_management" => Ok(Self::DebtManagement),
            "financial_planning" => Ok(Self::FinancialPlanning),
            "overspending" => Ok(Self::Overspending),
            _ => Err(format!("Unknown financial situation: {}", s)),
        }
    }
}

impl std::fmt::Display for FinancialSituation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of this month's spending relative to the long-run average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingTrend {
    Increasing,
    Stable,
    Decreasing,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
            Self::Decreasing => "decreasing",
        }
    }
}

impl std::str::FromStr for SpendingTrend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "increasing" => Ok(Self::Increasing),
            "stable" => Ok(Self::Stable),
            "decreasing" => Ok(Self::Decreasing),
            _ => Err(format!("Unknown spending trend: {}", s)),
        }
    }
}

impl std::fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(format!("Unknown risk profile: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Student,
    Professional,
    Family,
    Retired,
}

impl LifeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professional => "professional",
            Self::Family => "family",
            Self::Retired => "retired",
        }
    }
}

impl std::str::FromStr for LifeStage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "professional" => Ok(Self::Professional),
            "family" => Ok(Self::Family),
            "retired" => Ok(Self::Retired),
            _ => Err(format!("Unknown life stage: {}", s)),
        }
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending statistics derived from the expense history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPatterns {
    /// Total spent in the current calendar month
    pub monthly_expenses: f64,
    /// Current-month categories, highest spend first
    pub top_categories: Vec<String>,
    /// Average of per-month totals over the whole history
    pub monthly_average: f64,
    /// Income implied by the average spend (see `AnalyzerConfig::income_multiplier`)
    pub estimated_income: f64,
    /// Actual income, when the user has told us
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    /// Fraction of estimated income left unspent, in [0, 1]
    pub savings_rate: f64,
    pub spending_trend: SpendingTrend,
}

/// Snapshot of a user's finances, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialContext {
    pub current_situation: FinancialSituation,
    pub spending_patterns: SpendingPatterns,
    pub financial_goals: Vec<String>,
    pub risk_profile: RiskProfile,
    pub life_stage: LifeStage,
}

/// Caller-supplied values that replace computed context fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOverrides {
    pub current_situation: Option<FinancialSituation>,
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub top_categories: Option<Vec<String>>,
    pub monthly_average: Option<f64>,
    pub savings_rate: Option<f64>,
    pub spending_trend: Option<SpendingTrend>,
    pub financial_goals: Option<Vec<String>>,
    pub risk_profile: Option<RiskProfile>,
    pub life_stage: Option<LifeStage>,
}

impl ContextOverrides {
    /// Apply every supplied field onto a computed context
    pub fn apply(&self, ctx: &mut FinancialContext) {
        let patterns = &mut ctx.spending_patterns;
        if let Some(situation) = self.current_situation {
            ctx.current_situation = situation;
        }
        if let Some(income) = self.monthly_income {
            patterns.monthly_income = Some(income);
        }
        if let Some(expenses) = self.monthly_expenses {
            patterns.monthly_expenses = expenses;
        }
        if let Some(ref categories) = self.top_categories {
            patterns.top_categories = categories.clone();
        }
        if let Some(average) = self.monthly_average {
            patterns.monthly_average = average;
        }
        if let Some(rate) = self.savings_rate {
            patterns.savings_rate = rate.clamp(0.0, 1.0);
        }
        if let Some(trend) = self.spending_trend {
            patterns.spending_trend = trend;
        }
        if let Some(ref goals) = self.financial_goals {
            if !goals.is_empty() {
                ctx.financial_goals = goals.clone();
            }
        }
        if let Some(risk) = self.risk_profile {
            ctx.risk_profile = risk;
        }
        if let Some(stage) = self.life_stage {
            ctx.life_stage = stage;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//! Niti Core Library
//!
//! Shared functionality for the Niti financial wisdom engine:
//! - Context analysis: expenses + budgets -> `FinancialContext`
//! - Wisdom matching against a static knowledge base of Arthashastra principles
//! - Prompt assembly for a downstream text-generation backend
//! - Expense/budget import from CSV and JSON
//! - Layered configuration (data-dir override, then embedded defaults)

pub mod advisor;
pub mod assembler;
pub mod config;
pub mod context;
pub mod error;
pub mod import;
pub mod models;
pub mod prompts;
pub mod wisdom;

/// Fixture builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{Advice, WisdomAdvisor};
pub use assembler::{PromptAssembler, PromptMessages};
pub use config::{AnalyzerConfig, MatcherConfig, NitiConfig};
pub use context::ContextAnalyzer;
pub use error::{Error, Result};
pub use import::{load_budgets, load_expenses, ImportFormat};
pub use models::{
    BudgetRecord, ContextOverrides, ExpenseRecord, FinancialContext, FinancialSituation,
    LifeStage, RiskProfile, SpendingPatterns, SpendingTrend,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use wisdom::{
    ActionPlan, KnowledgeBase, Principle, RankedWisdom, ScenarioMatch, WisdomMatcher,
    WisdomResult,
};

//! Shared utilities for loading the advisor and user data

use std::path::Path;

use anyhow::{bail, Context, Result};
use niti_core::{
    load_budgets, load_expenses, BudgetRecord, ContextOverrides, ExpenseRecord,
    FinancialContext, KnowledgeBase, NitiConfig, PromptAssembler, PromptLibrary, WisdomAdvisor,
};

use crate::cli::DataArgs;

/// Load config, knowledge base and prompt template
///
/// Explicit paths must exist; otherwise the data dir override or the
/// built-in default is used.
pub fn load_advisor(config_path: Option<&Path>, knowledge_path: Option<&Path>) -> Result<WisdomAdvisor> {
    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            NitiConfig::from_path(path)
        }
        None => NitiConfig::load(),
    }
    .context("Failed to load configuration")?;

    let knowledge = match knowledge_path {
        Some(path) => {
            if !path.exists() {
                bail!("Knowledge base not found: {}", path.display());
            }
            KnowledgeBase::from_path(path)
        }
        None => KnowledgeBase::load(),
    }
    .context("Failed to load knowledge base")?;

    let assembler = PromptAssembler::from_library(&mut PromptLibrary::new(), &config)
        .context("Failed to load prompt template")?;

    tracing::debug!(
        "Advisor ready: {} principles, prompt '{}' v{}{}",
        knowledge.principles().len(),
        assembler.prompt().metadata.id,
        assembler.prompt().metadata.version,
        if assembler.prompt().is_override { " (override)" } else { "" }
    );

    Ok(WisdomAdvisor::new(knowledge, config, assembler))
}

/// Read the expense file and optional budget file
pub fn load_data(data: &DataArgs) -> Result<(Vec<ExpenseRecord>, Vec<BudgetRecord>)> {
    let expenses = load_expenses(&data.expenses)
        .with_context(|| format!("Failed to load expenses from {}", data.expenses.display()))?;

    let budgets = match &data.budgets {
        Some(path) => load_budgets(path)
            .with_context(|| format!("Failed to load budgets from {}", path.display()))?,
        None => Vec::new(),
    };

    tracing::debug!(
        "Loaded {} expenses and {} budgets from {}",
        expenses.len(),
        budgets.len(),
        data.expenses.display()
    );

    Ok((expenses, budgets))
}

/// Turn `--income` / `--life-stage` into context overrides
pub fn overrides_from_args(data: &DataArgs) -> Result<Option<ContextOverrides>> {
    if let Some(income) = data.income {
        if !income.is_finite() || income <= 0.0 {
            bail!("--income must be a positive number");
        }
    }

    let overrides = ContextOverrides {
        monthly_income: data.income,
        life_stage: data.life_stage,
        ..Default::default()
    };

    Ok((!overrides.is_empty()).then_some(overrides))
}

/// Load data and run the analyzer
pub fn analyze(advisor: &WisdomAdvisor, data: &DataArgs) -> Result<FinancialContext> {
    let (expenses, budgets) = load_data(data)?;
    let overrides = overrides_from_args(data)?;
    let today = data
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(advisor.analyze(&expenses, &budgets, overrides.as_ref(), today))
}

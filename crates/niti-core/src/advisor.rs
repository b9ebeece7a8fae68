//! End-to-end pipeline: analyze -> match -> assemble
//!
//! `WisdomAdvisor` owns the loaded knowledge base, config, and prompt
//! template. It is immutable after construction and safe to share across
//! threads (the server keeps one in its `AppState`).

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::assembler::PromptAssembler;
use crate::config::NitiConfig;
use crate::context::ContextAnalyzer;
use crate::error::Result;
use crate::models::{BudgetRecord, ContextOverrides, ExpenseRecord, FinancialContext};
use crate::prompts::PromptLibrary;
use crate::wisdom::{KnowledgeBase, WisdomMatcher, WisdomResult};

/// Output of a full run
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub context: FinancialContext,
    pub wisdom: WisdomResult,
    pub prompt: String,
}

#[derive(Debug)]
pub struct WisdomAdvisor {
    knowledge: KnowledgeBase,
    config: NitiConfig,
    assembler: PromptAssembler,
}

impl WisdomAdvisor {
    pub fn new(knowledge: KnowledgeBase, config: NitiConfig, assembler: PromptAssembler) -> Self {
        Self {
            knowledge,
            config,
            assembler,
        }
    }

    /// Load everything from the default locations (overrides, then embedded)
    pub fn load() -> Result<Self> {
        let config = NitiConfig::load()?;
        let knowledge = KnowledgeBase::load()?;
        let assembler = PromptAssembler::from_library(&mut PromptLibrary::new(), &config)?;
        info!(
            principles = knowledge.principles().len(),
            scenarios = knowledge.scenarios().len(),
            "Wisdom advisor ready"
        );
        Ok(Self::new(knowledge, config, assembler))
    }

    /// Embedded defaults only; no filesystem access
    pub fn embedded() -> Result<Self> {
        let config = NitiConfig::embedded()?;
        let knowledge = KnowledgeBase::embedded()?;
        let assembler = PromptAssembler::embedded(&config)?;
        Ok(Self::new(knowledge, config, assembler))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn config(&self) -> &NitiConfig {
        &self.config
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    pub fn analyze(
        &self,
        expenses: &[ExpenseRecord],
        budgets: &[BudgetRecord],
        overrides: Option<&ContextOverrides>,
        today: NaiveDate,
    ) -> FinancialContext {
        ContextAnalyzer::new(&self.config.analyzer).analyze(expenses, budgets, overrides, today)
    }

    pub fn find_relevant_wisdom(&self, context: &FinancialContext, query: &str) -> WisdomResult {
        WisdomMatcher::new(&self.knowledge, &self.config).find_relevant_wisdom(context, query)
    }

    pub fn build_prompt(
        &self,
        query: &str,
        context: &FinancialContext,
        wisdom: &WisdomResult,
    ) -> String {
        self.assembler.build_prompt(query, context, wisdom)
    }

    /// Run the whole pipeline for one query
    pub fn advise(
        &self,
        expenses: &[ExpenseRecord],
        budgets: &[BudgetRecord],
        overrides: Option<&ContextOverrides>,
        today: NaiveDate,
        query: &str,
    ) -> Advice {
        let context = self.analyze(expenses, budgets, overrides, today);
        let wisdom = self.find_relevant_wisdom(&context, query);
        let prompt = self.build_prompt(query, &context, &wisdom);
        Advice {
            context,
            wisdom,
            prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FinancialSituation;
    use crate::test_utils::{budget, expense, fixed_today};

    #[test]
    fn test_advise_overspending() {
        let advisor = WisdomAdvisor::embedded().unwrap();
        let advice = advisor.advise(
            &[expense(150.0, "Shopping", fixed_today())],
            &[budget("Shopping", 100.0)],
            None,
            fixed_today(),
            "why do I keep running out of money",
        );

        assert_eq!(
            advice.context.current_situation,
            FinancialSituation::Overspending
        );
        assert!(advice
            .wisdom
            .ranked()
            .any(|w| w.principle.applies_to(FinancialSituation::Overspending)));
        assert!(advice.prompt.contains("why do I keep running out of money"));
    }

    #[test]
    fn test_overrides_flow_into_prompt() {
        let advisor = WisdomAdvisor::embedded().unwrap();
        let overrides = ContextOverrides {
            monthly_income: Some(80000.0),
            ..Default::default()
        };
        let advice = advisor.advise(&[], &[], Some(&overrides), fixed_today(), "plan");

        assert_eq!(advice.context.spending_patterns.monthly_income, Some(80000.0));
        assert!(advice.prompt.contains("Monthly income: ₹80000"));
    }
}

//! Prompt assembly: context + wisdom + query -> text for a generation backend

use std::collections::HashMap;

use serde::Serialize;

use crate::config::NitiConfig;
use crate::error::Result;
use crate::models::FinancialContext;
use crate::prompts::{Prompt, PromptId, PromptLibrary};
use crate::wisdom::WisdomResult;

/// A prompt split into chat-style messages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessages {
    pub system: String,
    pub user: String,
}

/// Renders the `wisdom_advisor` template
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    prompt: Prompt,
    config: NitiConfig,
}

impl PromptAssembler {
    pub fn new(prompt: Prompt, config: &NitiConfig) -> Self {
        Self {
            prompt,
            config: config.clone(),
        }
    }

    /// Resolve the template through a prompt library (override, then embedded)
    pub fn from_library(library: &mut PromptLibrary, config: &NitiConfig) -> Result<Self> {
        let prompt = library.get(PromptId::WisdomAdvisor)?.clone();
        Ok(Self::new(prompt, config))
    }

    /// Use the embedded template only
    pub fn embedded(config: &NitiConfig) -> Result<Self> {
        Self::from_library(&mut PromptLibrary::embedded_only(), config)
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Full prompt text: system preamble, context, wisdom, query, instructions
    pub fn build_prompt(
        &self,
        query: &str,
        context: &FinancialContext,
        wisdom: &WisdomResult,
    ) -> String {
        self.prompt
            .render(&self.template_vars(query, context, wisdom))
    }

    /// Same content, split into system and user messages
    pub fn build_messages(
        &self,
        query: &str,
        context: &FinancialContext,
        wisdom: &WisdomResult,
    ) -> PromptMessages {
        let vars = self.template_vars(query, context, wisdom);
        PromptMessages {
            system: self.prompt.render_system(&vars),
            user: self.prompt.render_user(&vars),
        }
    }

    fn template_vars(
        &self,
        query: &str,
        context: &FinancialContext,
        wisdom: &WisdomResult,
    ) -> HashMap<&'static str, String> {
        let patterns = &context.spending_patterns;
        let mut vars = HashMap::new();

        vars.insert("situation", context.current_situation.label().to_string());
        let money = |amount: f64| self.config.money(amount);
        vars.insert("monthly_expenses", money(patterns.monthly_expenses));
        vars.insert("monthly_average", money(patterns.monthly_average));
        vars.insert("estimated_income", money(patterns.estimated_income));
        vars.insert(
            "monthly_income",
            patterns.monthly_income.map(money).unwrap_or_default(),
        );
        vars.insert(
            "savings_rate",
            format!("{:.1}%", patterns.savings_rate * 100.0),
        );
        vars.insert("spending_trend", patterns.spending_trend.as_str().to_string());
        vars.insert("top_categories", patterns.top_categories.join(", "));
        vars.insert("financial_goals", context.financial_goals.join(", "));
        vars.insert("risk_profile", context.risk_profile.as_str().to_string());
        vars.insert("life_stage", context.life_stage.as_str().to_string());
        vars.insert("wisdom", wisdom_block(wisdom));
        vars.insert("query", query.to_string());

        vars
    }
}

/// The "Relevant Wisdom" body: primary principle with its steps, then supporting ones
fn wisdom_block(wisdom: &WisdomResult) -> String {
    let primary = &wisdom.primary;
    let mut lines = vec![
        format!(
            "Primary principle: {} - \"{}\"",
            primary.principle.name, primary.principle.short_text
        ),
        primary.personalized_text.clone(),
    ];

    if !primary.actionable_steps.is_empty() {
        lines.push("Recommended steps:".to_string());
        lines.extend(primary.actionable_steps.iter().map(|s| format!("- {}", s)));
    }

    if !wisdom.supporting.is_empty() {
        lines.push("Supporting principles:".to_string());
        lines.extend(wisdom.supporting.iter().map(|w| {
            format!("- {}: \"{}\"", w.principle.name, w.principle.short_text)
        }));
    }

    if !wisdom.cultural_note.is_empty() {
        lines.push(format!("Cultural context: {}", wisdom.cultural_note));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FinancialSituation;
    use crate::test_utils::sample_context;
    use crate::wisdom::{KnowledgeBase, WisdomMatcher};

    fn assemble(query: &str, context: &FinancialContext) -> String {
        let config = NitiConfig::default();
        let kb = KnowledgeBase::embedded().unwrap();
        let wisdom = WisdomMatcher::new(&kb, &config).find_relevant_wisdom(context, query);
        PromptAssembler::embedded(&config)
            .unwrap()
            .build_prompt(query, context, &wisdom)
    }

    #[test]
    fn test_query_appears_verbatim() {
        let ctx = sample_context(FinancialSituation::Saving);
        let query = "  How do I save {{monthly_income}} for {{#if x}}emergencies{{/if}}?  ";
        let prompt = assemble(query, &ctx);

        assert!(prompt.contains(&format!("User Question: {}", query)));
    }

    #[test]
    fn test_income_line_omitted_without_monthly_income() {
        let ctx = sample_context(FinancialSituation::Budgeting);
        let prompt = assemble("help me budget", &ctx);

        assert!(!prompt.contains("Monthly income:"));
        assert!(prompt.contains("Estimated income (from spending): ₹125"));
    }

    #[test]
    fn test_income_line_present_with_monthly_income() {
        let mut ctx = sample_context(FinancialSituation::Budgeting);
        ctx.spending_patterns.monthly_income = Some(50000.0);
        let prompt = assemble("help me budget", &ctx);

        assert!(prompt.contains("- Monthly income: ₹50000"));
    }

    #[test]
    fn test_amounts_use_configured_currency() {
        let config = NitiConfig {
            currency_symbol: "$".to_string(),
            ..NitiConfig::default()
        };
        let kb = KnowledgeBase::embedded().unwrap();
        let ctx = sample_context(FinancialSituation::Saving);
        let wisdom = WisdomMatcher::new(&kb, &config).find_relevant_wisdom(&ctx, "save");
        let prompt = PromptAssembler::embedded(&config)
            .unwrap()
            .build_prompt("save", &ctx, &wisdom);

        assert!(prompt.contains(&config.money(ctx.spending_patterns.monthly_expenses)));
        assert!(prompt.contains("$125"));
        assert!(!prompt.contains('₹'));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let mut ctx = sample_context(FinancialSituation::Budgeting);
        ctx.spending_patterns.top_categories.clear();
        ctx.financial_goals.clear();
        let prompt = assemble("help me budget", &ctx);

        assert!(!prompt.contains("Top categories:"));
        assert!(!prompt.contains("Financial goals:"));
        assert!(prompt.contains("- Risk profile: moderate"));
    }

    #[test]
    fn test_context_and_wisdom_sections() {
        let ctx = sample_context(FinancialSituation::Budgeting);
        let prompt = assemble("help me budget", &ctx);

        assert!(prompt.contains("Kautilya's Arthashastra"));
        assert!(prompt.contains("- Top categories: Food & Dining"));
        assert!(prompt.contains("- Savings rate: 20.0%"));
        assert!(prompt.contains("Relevant Wisdom:\nPrimary principle: "));
        assert!(prompt.contains("Please respond by:"));
    }

    #[test]
    fn test_build_messages_splits_sections() {
        let config = NitiConfig::default();
        let kb = KnowledgeBase::embedded().unwrap();
        let ctx = sample_context(FinancialSituation::Saving);
        let query = "how do I save for emergencies";
        let wisdom = WisdomMatcher::new(&kb, &config).find_relevant_wisdom(&ctx, query);
        let messages = PromptAssembler::embedded(&config)
            .unwrap()
            .build_messages(query, &ctx, &wisdom);

        assert!(messages.system.starts_with("You are Niti"));
        assert!(!messages.system.contains("User Question"));
        assert!(messages.user.starts_with("User's Financial Context:"));
        assert!(messages.user.contains(query));
    }
}

//! Wisdom Matcher - ranks principles against a context and a query
//!
//! Pipeline:
//! 1. Detect scenarios from query keywords and patterns
//! 2. Fuse in the user's current situation (and `saving` when savings are low)
//! 3. Select principles covering any fused scenario
//! 4. Score, stable-sort, and personalize the top results
//!
//! The matcher never fails. An unrecognized query falls back to the first
//! scenario, and an empty selection falls back to the first principle.

use tracing::debug;

use crate::config::{NitiConfig, MAX_SUPPORTING};
use crate::models::{FinancialContext, FinancialSituation};

use super::knowledge::{KnowledgeBase, Principle, AUDIENCE_PLACEHOLDER};
use super::types::{ActionPlan, RankedWisdom, ScenarioMatch, WisdomResult};

pub struct WisdomMatcher<'a> {
    knowledge: &'a KnowledgeBase,
    config: &'a NitiConfig,
}

impl<'a> WisdomMatcher<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, config: &'a NitiConfig) -> Self {
        Self { knowledge, config }
    }

    /// Rank the knowledge base for this context and query
    pub fn find_relevant_wisdom(&self, context: &FinancialContext, query: &str) -> WisdomResult {
        let query_lower = query.to_lowercase();

        let matched_scenarios = self.detect_scenarios(&query_lower);
        let scenarios = self.fuse_scenarios(&matched_scenarios, context);

        let mut candidates: Vec<&Principle> = self
            .knowledge
            .principles()
            .iter()
            .filter(|p| p.applicable_scenarios.iter().any(|s| scenarios.contains(s)))
            .collect();
        if candidates.is_empty() {
            candidates.push(self.knowledge.default_principle());
        }

        let mut scored: Vec<(&Principle, f64)> = candidates
            .into_iter()
            .map(|p| (p, self.relevance(p, context, &query_lower)))
            .collect();
        // sort_by is stable, so ties keep knowledge-base order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(1 + self.config.matcher.max_supporting.min(MAX_SUPPORTING));

        debug!(
            scenarios = ?scenarios.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            ranked = ?scored.iter().map(|(p, s)| format!("{}={:.2}", p.id, s)).collect::<Vec<_>>(),
            "Ranked principles"
        );

        let mut ranked = scored.into_iter();
        // candidates is never empty, so there is always a first entry
        let (primary_principle, primary_score) = ranked
            .next()
            .unwrap_or((self.knowledge.default_principle(), 0.0));

        let primary = RankedWisdom {
            principle: primary_principle.clone(),
            relevance_score: primary_score,
            personalized_text: self.personalize(primary_principle, context, true),
            actionable_steps: self.actionable_steps(primary_principle, context),
        };

        let supporting: Vec<RankedWisdom> = ranked
            .map(|(principle, score)| RankedWisdom {
                principle: principle.clone(),
                relevance_score: score,
                personalized_text: self.personalize(principle, context, false),
                actionable_steps: principle.practical_advice.clone(),
            })
            .collect();

        let (cultural_note, modern_parallels) = match self.knowledge.insight(&primary_principle.id)
        {
            Some(insight) => (
                insight.cultural_note.clone(),
                insight.modern_parallels.clone(),
            ),
            None => (
                format!(
                    "{} is drawn from Kautilya's Arthashastra, a classical Indian treatise on statecraft and economics.",
                    primary_principle.name
                ),
                Vec::new(),
            ),
        };

        let guidance_text = guidance_text(context.current_situation, &primary, &supporting);
        let action_plan = ActionPlan::from_advice(&primary_principle.practical_advice);

        WisdomResult {
            primary,
            supporting,
            guidance_text,
            cultural_note,
            modern_parallels,
            action_plan,
            matched_scenarios,
        }
    }

    /// Score every scenario against a lowercased query
    ///
    /// score = keyword hits / keyword count + pattern_weight × pattern hits / keyword count
    pub fn detect_scenarios(&self, query_lower: &str) -> Vec<ScenarioMatch> {
        let threshold = self.config.matcher.scenario_threshold;
        let pattern_weight = self.config.matcher.pattern_weight;

        let matches: Vec<ScenarioMatch> = self
            .knowledge
            .scenarios()
            .iter()
            .filter_map(|scenario| {
                if scenario.keywords.is_empty() {
                    return None;
                }
                let total = scenario.keywords.len() as f64;
                let keyword_hits = count_hits(query_lower, &scenario.keywords) as f64;
                let pattern_hits = count_hits(query_lower, &scenario.patterns) as f64;
                let score = keyword_hits / total + pattern_weight * pattern_hits / total;

                debug!(scenario = scenario.id.as_str(), score, "Scenario score");
                (score > threshold).then_some(ScenarioMatch {
                    scenario: scenario.id,
                    score,
                })
            })
            .collect();

        if matches.is_empty() {
            return vec![ScenarioMatch {
                scenario: self.knowledge.default_scenario().id,
                score: 0.0,
            }];
        }
        matches
    }

    fn fuse_scenarios(
        &self,
        detected: &[ScenarioMatch],
        context: &FinancialContext,
    ) -> Vec<FinancialSituation> {
        let mut scenarios: Vec<FinancialSituation> = detected.iter().map(|m| m.scenario).collect();

        if !scenarios.contains(&context.current_situation) {
            scenarios.insert(0, context.current_situation);
        }
        if context.spending_patterns.savings_rate < self.config.analyzer.low_savings_rate
            && !scenarios.contains(&FinancialSituation::Saving)
        {
            scenarios.push(FinancialSituation::Saving);
        }

        scenarios
    }

    fn relevance(&self, principle: &Principle, context: &FinancialContext, query_lower: &str) -> f64 {
        let m = &self.config.matcher;
        let mut score = 0.0;

        if principle.applies_to(context.current_situation) {
            score += m.situation_base;
        }

        for tag in &principle.tags {
            let phrase = tag.replace('_', " ").to_lowercase();
            if !phrase.is_empty() && query_lower.contains(&phrase) {
                score += m.tag_bonus;
            }
        }

        if let Some(insight) = self.knowledge.insight(&principle.id) {
            let bonuses = insight
                .bonuses
                .iter()
                .filter(|b| b.matches(context.life_stage, context.risk_profile))
                .count();
            score += m.profile_bonus * bonuses as f64;
        }

        score.clamp(0.0, 1.0)
    }

    fn personalize(&self, principle: &Principle, context: &FinancialContext, lead_in: bool) -> String {
        let phrasing = self.knowledge.phrasing(context.life_stage);
        let body = principle
            .long_interpretation
            .replace(AUDIENCE_PLACEHOLDER, &phrasing.audience);
        if lead_in {
            format!("{} {}", phrasing.lead_in, body)
        } else {
            body
        }
    }

    /// Rewrite generic advice with numbers from the context
    fn actionable_steps(&self, principle: &Principle, context: &FinancialContext) -> Vec<String> {
        let m = &self.config.matcher;
        let income = context
            .spending_patterns
            .monthly_income
            .filter(|i| *i > 0.0);
        let top_category = context.spending_patterns.top_categories.first();

        principle
            .practical_advice
            .iter()
            .map(|step| {
                let lower = step.to_lowercase();
                match (income, top_category) {
                    (Some(income), _) if lower.contains("emergency fund") => format!(
                        "Build an emergency fund of {} to {} ({}-{} months of income)",
                        self.config.money(income * m.emergency_fund_min_months as f64),
                        self.config.money(income * m.emergency_fund_max_months as f64),
                        m.emergency_fund_min_months,
                        m.emergency_fund_max_months,
                    ),
                    (Some(income), _) if lower.contains("save") => format!(
                        "{} (target: {}/month, {:.0}% of income)",
                        step,
                        self.config.money(income * m.savings_target_rate),
                        m.savings_target_rate * 100.0,
                    ),
                    (_, Some(category)) if lower.contains("track") => {
                        format!("{}, starting with {}", step, category)
                    }
                    _ => step.clone(),
                }
            })
            .collect()
    }
}

fn count_hits(haystack: &str, needles: &[String]) -> usize {
    needles
        .iter()
        .filter(|n| !n.is_empty() && haystack.contains(n.as_str()))
        .count()
}

fn guidance_text(
    situation: FinancialSituation,
    primary: &RankedWisdom,
    supporting: &[RankedWisdom],
) -> String {
    let mut text = format!(
        "For your current focus on {}, {} teaches: \"{}\" {}",
        situation.label().to_lowercase(),
        primary.principle.name,
        primary.principle.short_text,
        primary.personalized_text
    );

    if !supporting.is_empty() {
        let names: Vec<&str> = supporting
            .iter()
            .map(|w| w.principle.name.as_str())
            .collect();
        text.push_str(&format!(" Related principles: {}.", names.join(" and ")));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LifeStage;
    use crate::test_utils::sample_context;

    fn setup() -> (KnowledgeBase, NitiConfig) {
        (
            KnowledgeBase::embedded().unwrap(),
            NitiConfig::embedded().unwrap(),
        )
    }

    #[test]
    fn test_save_query_matches_saving_scenario() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let detected = matcher.detect_scenarios("how do i save for emergencies");
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].scenario, FinancialSituation::Saving);
        assert!((detected[0].score - 0.5).abs() < 1e-9);

        let ctx = sample_context(FinancialSituation::Budgeting);
        let result = matcher.find_relevant_wisdom(&ctx, "how do I save for emergencies");
        assert!(result
            .ranked()
            .any(|w| w.principle.applies_to(FinancialSituation::Saving)));
    }

    #[test]
    fn test_unrecognized_query_falls_back_to_default_scenario() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let detected = matcher.detect_scenarios("hello there");
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].scenario, FinancialSituation::Budgeting);
        assert_eq!(detected[0].score, 0.0);

        let ctx = sample_context(FinancialSituation::FinancialPlanning);
        let result = matcher.find_relevant_wisdom(&ctx, "");
        assert!(!result.primary.principle.id.is_empty());
    }

    #[test]
    fn test_result_shape_and_order() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        for situation in FinancialSituation::all() {
            for query in ["", "I want to invest in stocks", "my credit card debt", "xyz"] {
                let ctx = sample_context(*situation);
                let result = matcher.find_relevant_wisdom(&ctx, query);

                assert!(result.supporting.len() <= 2);
                for w in &result.supporting {
                    assert!(result.primary.relevance_score >= w.relevance_score);
                }
                for pair in result.supporting.windows(2) {
                    assert!(pair[0].relevance_score >= pair[1].relevance_score);
                }
                for w in result.ranked() {
                    assert!((0.0..=1.0).contains(&w.relevance_score));
                }
            }
        }
    }

    #[test]
    fn test_ties_keep_knowledge_base_order() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        // Budgeting: income_over_expenditure and measured_spending both score
        // the 0.5 base with no tag hits; the former comes first in the file.
        let ctx = sample_context(FinancialSituation::Budgeting);
        let result = matcher.find_relevant_wisdom(&ctx, "hello");
        assert_eq!(result.primary.principle.id, "income_over_expenditure");
        assert_eq!(result.supporting[0].principle.id, "measured_spending");
        assert_eq!(
            result.primary.relevance_score,
            result.supporting[0].relevance_score
        );
    }

    #[test]
    fn test_tag_bonus_raises_score() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);
        let ctx = sample_context(FinancialSituation::DebtManagement);

        let result = matcher.find_relevant_wisdom(&ctx, "how do I clear my credit card debt and loan");
        assert_eq!(result.primary.principle.id, "freedom_from_debt");
        // 0.5 base + 3 tags × 0.2, clamped
        assert_eq!(result.primary.relevance_score, 1.0);
    }

    #[test]
    fn test_profile_bonus_applies() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let mut ctx = sample_context(FinancialSituation::Saving);
        ctx.life_stage = LifeStage::Family;
        let result = matcher.find_relevant_wisdom(&ctx, "hello");
        assert_eq!(result.primary.principle.id, "treasury_is_root");
        assert!((result.primary.relevance_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_low_savings_fuses_saving_scenario() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let mut ctx = sample_context(FinancialSituation::Investing);
        ctx.spending_patterns.savings_rate = 0.05;
        let fused = matcher.fuse_scenarios(&matcher.detect_scenarios("hello"), &ctx);
        assert_eq!(
            fused,
            vec![
                FinancialSituation::Investing,
                FinancialSituation::Budgeting,
                FinancialSituation::Saving,
            ]
        );
    }

    #[test]
    fn test_personalization_and_rewritten_steps() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let mut ctx = sample_context(FinancialSituation::Saving);
        ctx.life_stage = LifeStage::Family;
        ctx.spending_patterns.monthly_income = Some(50_000.0);
        let result = matcher.find_relevant_wisdom(&ctx, "emergency fund");

        let primary = &result.primary;
        assert_eq!(primary.principle.id, "treasury_is_root");
        assert!(primary.personalized_text.starts_with("With a family"));
        assert!(primary.personalized_text.contains("For families"));
        assert!(!primary.personalized_text.contains(AUDIENCE_PLACEHOLDER));
        assert_eq!(
            primary.actionable_steps[0],
            "Build an emergency fund of ₹300000 to ₹600000 (6-12 months of income)"
        );
        assert_eq!(
            primary.actionable_steps[1],
            "Save automatically on the day income arrives (target: ₹10000/month, 20% of income)"
        );

        for w in &result.supporting {
            assert!(!w.personalized_text.starts_with("With a family"));
            assert_eq!(w.actionable_steps, w.principle.practical_advice);
        }
    }

    #[test]
    fn test_steps_unchanged_without_income() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let ctx = sample_context(FinancialSituation::Saving);
        let result = matcher.find_relevant_wisdom(&ctx, "emergency fund");
        assert_eq!(
            result.primary.actionable_steps[0],
            "Build an emergency fund before any other goal"
        );
    }

    #[test]
    fn test_track_step_names_top_category() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let ctx = sample_context(FinancialSituation::Budgeting);
        let result = matcher.find_relevant_wisdom(&ctx, "help me budget");
        assert_eq!(result.primary.principle.id, "income_over_expenditure");
        assert_eq!(
            result.primary.actionable_steps[0],
            "Track every expense for the next 30 days, starting with Food & Dining"
        );
    }

    #[test]
    fn test_cultural_note_lookup_and_fallback() {
        let (kb, config) = setup();
        let matcher = WisdomMatcher::new(&kb, &config);

        let ctx = sample_context(FinancialSituation::Saving);
        let result = matcher.find_relevant_wisdom(&ctx, "save");
        assert!(result.cultural_note.contains("kosha mula danda"));
        assert!(!result.modern_parallels.is_empty());
        assert_eq!(result.action_plan.immediate.len(), 2);
        assert!(result.guidance_text.contains("saving"));

        // knowledge_as_wealth has no insight entry
        let ctx = sample_context(FinancialSituation::FinancialPlanning);
        let result = matcher.find_relevant_wisdom(&ctx, "education and learning new skill");
        assert_eq!(result.primary.principle.id, "knowledge_as_wealth");
        assert!(result.cultural_note.contains("Arthashastra"));
        assert!(result.modern_parallels.is_empty());
    }

    #[test]
    fn test_supporting_capped_even_when_configured_higher() {
        let (kb, mut config) = setup();
        config.matcher.max_supporting = 5;
        let matcher = WisdomMatcher::new(&kb, &config);

        // financial_planning alone selects five principles
        let ctx = sample_context(FinancialSituation::FinancialPlanning);
        let result = matcher.find_relevant_wisdom(&ctx, "save invest budget plan debt");
        assert_eq!(result.supporting.len(), MAX_SUPPORTING);
    }
}

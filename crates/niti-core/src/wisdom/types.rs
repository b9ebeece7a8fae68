//! Result types produced by the wisdom matcher

use serde::{Deserialize, Serialize};

use crate::models::FinancialSituation;

use super::knowledge::Principle;

/// A scenario detected in the user's query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMatch {
    pub scenario: FinancialSituation,
    /// Keyword/pattern score; 0.0 for the fallback scenario
    pub score: f64,
}

/// A principle ranked for the current request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedWisdom {
    pub principle: Principle,
    /// Relevance in [0, 1]
    pub relevance_score: f64,
    pub personalized_text: String,
    pub actionable_steps: Vec<String>,
}

/// Advice split into time horizons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

impl ActionPlan {
    /// Partition advice into consecutive, non-overlapping buckets:
    /// two immediate steps, the next two short-term, the rest long-term
    pub fn from_advice(advice: &[String]) -> Self {
        let bucket = |start: usize, end: Option<usize>| -> Vec<String> {
            let start = start.min(advice.len());
            let end = end.map_or(advice.len(), |e| e.min(advice.len()));
            advice[start..end].to_vec()
        };

        Self {
            immediate: bucket(0, Some(2)),
            short_term: bucket(2, Some(4)),
            long_term: bucket(4, None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.short_term.is_empty() && self.long_term.is_empty()
    }
}

/// Everything the matcher produces for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WisdomResult {
    pub primary: RankedWisdom,
    /// At most `MatcherConfig::max_supporting` entries, never above primary
    pub supporting: Vec<RankedWisdom>,
    pub guidance_text: String,
    pub cultural_note: String,
    pub modern_parallels: Vec<String>,
    pub action_plan: ActionPlan,
    /// Scenarios detected in the query (before context fusion)
    pub matched_scenarios: Vec<ScenarioMatch>,
}

impl WisdomResult {
    /// Primary followed by supporting entries, in rank order
    pub fn ranked(&self) -> impl Iterator<Item = &RankedWisdom> {
        std::iter::once(&self.primary).chain(self.supporting.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advice(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("step {}", i)).collect()
    }

    #[test]
    fn test_action_plan_buckets_do_not_overlap() {
        let plan = ActionPlan::from_advice(&advice(5));
        assert_eq!(plan.immediate, vec!["step 1", "step 2"]);
        assert_eq!(plan.short_term, vec!["step 3", "step 4"]);
        assert_eq!(plan.long_term, vec!["step 5"]);
    }

    #[test]
    fn test_action_plan_short_advice() {
        let plan = ActionPlan::from_advice(&advice(3));
        assert_eq!(plan.immediate.len(), 2);
        assert_eq!(plan.short_term, vec!["step 3"]);
        assert!(plan.long_term.is_empty());

        assert!(ActionPlan::from_advice(&[]).is_empty());
    }
}

//! Wisdom Engine - contextual matching of financial principles
//!
//! A small, static knowledge base of principles is scored against the user's
//! [`FinancialContext`](crate::models::FinancialContext) and free-text query.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use niti_core::wisdom::{KnowledgeBase, WisdomMatcher};
//!
//! let kb = KnowledgeBase::load()?;
//! let matcher = WisdomMatcher::new(&kb, &config);
//! let wisdom = matcher.find_relevant_wisdom(&context, "how do I save for emergencies");
//! ```

pub mod knowledge;
pub mod matcher;
pub mod types;

pub use knowledge::{
    default_knowledge_path, KnowledgeBase, LifeStagePhrasing, Principle, PrincipleInsight,
    ProfileBonus, Scenario,
};
pub use matcher::WisdomMatcher;
pub use types::{ActionPlan, RankedWisdom, ScenarioMatch, WisdomResult};

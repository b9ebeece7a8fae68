//! Static knowledge base of financial principles
//!
//! The knowledge base is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/niti/knowledge.yaml)
//! 2. Fall back to the embedded default (compiled into binary)
//!
//! Once loaded it is never mutated, so a single instance can be shared across
//! threads and requests without locking.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{FinancialSituation, LifeStage, RiskProfile};

/// Embedded default knowledge base (compiled into binary)
const DEFAULT_KNOWLEDGE: &str = include_str!("../../../../knowledge/arthashastra.yaml");

/// Placeholder in `long_interpretation` replaced with life-stage phrasing
pub const AUDIENCE_PLACEHOLDER: &str = "{audience}";

/// A financial principle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub id: String,
    pub name: String,
    pub short_text: String,
    pub long_interpretation: String,
    pub applicable_scenarios: Vec<FinancialSituation>,
    pub practical_advice: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Principle {
    pub fn applies_to(&self, situation: FinancialSituation) -> bool {
        self.applicable_scenarios.contains(&situation)
    }
}

/// Query vocabulary that signals a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: FinancialSituation,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Extra relevance for a principle when the user's profile matches
///
/// Every field that is set must match for the bonus to apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileBonus {
    pub life_stage: Option<LifeStage>,
    pub risk_profile: Option<RiskProfile>,
}

impl ProfileBonus {
    pub fn matches(&self, life_stage: LifeStage, risk_profile: RiskProfile) -> bool {
        if self.life_stage.is_none() && self.risk_profile.is_none() {
            return false;
        }
        self.life_stage.map_or(true, |s| s == life_stage)
            && self.risk_profile.map_or(true, |r| r == risk_profile)
    }
}

/// Hand-authored extras for a principle, looked up by principle id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrincipleInsight {
    pub cultural_note: String,
    pub modern_parallels: Vec<String>,
    pub bonuses: Vec<ProfileBonus>,
}

/// How guidance is phrased for one life stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeStagePhrasing {
    /// Replaces `{audience}` in interpretations
    pub audience: String,
    /// Sentence prefixed to the primary principle's interpretation
    pub lead_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeStagePhrasings {
    pub student: LifeStagePhrasing,
    pub professional: LifeStagePhrasing,
    pub family: LifeStagePhrasing,
    pub retired: LifeStagePhrasing,
}

impl LifeStagePhrasings {
    pub fn for_stage(&self, stage: LifeStage) -> &LifeStagePhrasing {
        match stage {
            LifeStage::Student => &self.student,
            LifeStage::Professional => &self.professional,
            LifeStage::Family => &self.family,
            LifeStage::Retired => &self.retired,
        }
    }
}

/// Raw file layout
#[derive(Debug, Deserialize)]
struct RawKnowledge {
    scenarios: Vec<Scenario>,
    principles: Vec<Principle>,
    #[serde(default)]
    insights: HashMap<String, PrincipleInsight>,
    life_stages: LifeStagePhrasings,
}

/// Validated, read-only knowledge base
///
/// Invariant: `scenarios` and `principles` are non-empty and principle ids are
/// unique, so the matcher's fallbacks always have something to return.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    scenarios: Vec<Scenario>,
    principles: Vec<Principle>,
    insights: HashMap<String, PrincipleInsight>,
    life_stages: LifeStagePhrasings,
    source: Option<PathBuf>,
}

impl KnowledgeBase {
    /// Load from the override location if present, else the embedded default
    pub fn load() -> Result<Self> {
        load_knowledge(None)
    }

    /// Load from an explicit path (falls back to the embedded default if missing)
    pub fn from_path(path: &Path) -> Result<Self> {
        load_knowledge(Some(path))
    }

    /// Parse the embedded default only
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(DEFAULT_KNOWLEDGE)
    }

    /// Parse and validate a knowledge base document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawKnowledge = serde_yaml::from_str(content)
            .map_err(|e| Error::InvalidData(format!("Invalid knowledge base YAML: {}", e)))?;

        if raw.scenarios.is_empty() {
            return Err(Error::InvalidData(
                "Knowledge base must define at least one scenario".into(),
            ));
        }
        if raw.principles.is_empty() {
            return Err(Error::InvalidData(
                "Knowledge base must define at least one principle".into(),
            ));
        }

        let mut seen = HashSet::new();
        for principle in &raw.principles {
            if !seen.insert(principle.id.as_str()) {
                return Err(Error::InvalidData(format!(
                    "Duplicate principle id: {}",
                    principle.id
                )));
            }
            if principle.applicable_scenarios.is_empty() {
                warn!(principle = %principle.id, "Principle has no applicable scenarios");
            }
        }

        for id in raw.insights.keys() {
            if !seen.contains(id.as_str()) {
                warn!(principle = %id, "Insight entry references unknown principle");
            }
        }

        // Keyword matching runs against a lowercased query
        let scenarios = raw
            .scenarios
            .into_iter()
            .map(|s| Scenario {
                id: s.id,
                keywords: s.keywords.iter().map(|k| k.to_lowercase()).collect(),
                patterns: s.patterns.iter().map(|p| p.to_lowercase()).collect(),
            })
            .collect();

        Ok(Self {
            scenarios,
            principles: raw.principles,
            insights: raw.insights,
            life_stages: raw.life_stages,
            source: None,
        })
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn principles(&self) -> &[Principle] {
        &self.principles
    }

    pub fn principle(&self, id: &str) -> Option<&Principle> {
        self.principles.iter().find(|p| p.id == id)
    }

    pub fn scenario(&self, id: FinancialSituation) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Scenario used when a query matches nothing
    pub fn default_scenario(&self) -> &Scenario {
        &self.scenarios[0]
    }

    /// Principle used when no principle covers the detected scenarios
    pub fn default_principle(&self) -> &Principle {
        &self.principles[0]
    }

    pub fn insight(&self, principle_id: &str) -> Option<&PrincipleInsight> {
        self.insights.get(principle_id)
    }

    pub fn phrasing(&self, stage: LifeStage) -> &LifeStagePhrasing {
        self.life_stages.for_stage(stage)
    }

    /// Path the knowledge base was read from (None for embedded)
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Default knowledge base override path
pub fn default_knowledge_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("niti").join("knowledge.yaml"))
}

fn load_knowledge(override_path: Option<&Path>) -> Result<KnowledgeBase> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_knowledge_path)
        .filter(|p| p.exists());

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::InvalidData(format!("Failed to read knowledge base: {}", e))
            })?;
            let mut kb = KnowledgeBase::from_yaml(&content)?;
            info!(
                path = %path.display(),
                principles = kb.principles.len(),
                "Loaded knowledge base override"
            );
            kb.source = Some(path);
            Ok(kb)
        }
        None => KnowledgeBase::embedded(),
    }
}

//! Tuning configuration for the analyzer and matcher
//!
//! Every threshold and weight the pipeline uses lives here rather than inline,
//! so deployments can retune without a rebuild.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/niti/config/niti.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/niti.toml");

/// Constants used by [`crate::context::ContextAnalyzer`]
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Estimated income = monthly average spend × this multiplier
    pub income_multiplier: f64,
    /// Fractional band around the average treated as a stable trend
    pub trend_dead_band: f64,
    pub low_savings_rate: f64,
    pub top_category_limit: usize,
    pub conservative_savings_rate: f64,
    pub aggressive_variation: f64,
    pub independence_savings_rate: f64,
    pub emergency_fund_savings_rate: f64,
    pub investment_keywords: Vec<String>,
    pub student_keywords: Vec<String>,
    pub family_keywords: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            income_multiplier: 1.25,
            trend_dead_band: 0.10,
            low_savings_rate: 0.10,
            top_category_limit: 5,
            conservative_savings_rate: 0.25,
            aggressive_variation: 1.5,
            independence_savings_rate: 0.20,
            emergency_fund_savings_rate: 0.10,
            investment_keywords: to_strings(&["invest", "stock", "mutual fund", "crypto"]),
            student_keywords: to_strings(&["education", "books"]),
            family_keywords: to_strings(&["childcare", "family", "kids"]),
        }
    }
}

/// Upper bound on supporting principles returned alongside the primary one
pub const MAX_SUPPORTING: usize = 2;

/// Weights used by [`crate::wisdom::WisdomMatcher`]
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum score for a scenario to count as detected
    pub scenario_threshold: f64,
    /// Weight of a pattern hit relative to a keyword hit
    pub pattern_weight: f64,
    /// Base relevance for principles covering the user's situation
    pub situation_base: f64,
    /// Bonus per principle tag found in the query
    pub tag_bonus: f64,
    /// Bonus for a matching life-stage/risk-profile rule
    pub profile_bonus: f64,
    /// At most [`MAX_SUPPORTING`]
    pub max_supporting: usize,
    pub savings_target_rate: f64,
    pub emergency_fund_min_months: u32,
    pub emergency_fund_max_months: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            scenario_threshold: 0.3,
            pattern_weight: 0.5,
            situation_base: 0.5,
            tag_bonus: 0.2,
            profile_bonus: 0.3,
            max_supporting: 2,
            savings_target_rate: 0.20,
            emergency_fund_min_months: 6,
            emergency_fund_max_months: 12,
        }
    }
}

/// Complete Niti configuration
#[derive(Debug, Clone)]
pub struct NitiConfig {
    pub analyzer: AnalyzerConfig,
    pub matcher: MatcherConfig,
    /// Symbol prefixed to amounts in generated text
    pub currency_symbol: String,
}

impl Default for NitiConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            matcher: MatcherConfig::default(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl NitiConfig {
    /// Load from the override location if present, else the embedded default
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (falls back to the embedded default if missing)
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse the embedded default only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Format an amount with the configured currency symbol
    pub fn money(&self, amount: f64) -> String {
        format!("{}{:.0}", self.currency_symbol, amount)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("niti").join("config").join("niti.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<NitiConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            info!(path = %path.display(), "Loaded config override");
            parse_config(&content)
        }
        None => parse_config(DEFAULT_CONFIG),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analyzer: Option<RawAnalyzer>,
    matcher: Option<RawMatcher>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawAnalyzer {
    income_multiplier: Option<f64>,
    trend_dead_band: Option<f64>,
    low_savings_rate: Option<f64>,
    top_category_limit: Option<usize>,
    conservative_savings_rate: Option<f64>,
    aggressive_variation: Option<f64>,
    independence_savings_rate: Option<f64>,
    emergency_fund_savings_rate: Option<f64>,
    investment_keywords: Option<Vec<String>>,
    student_keywords: Option<Vec<String>>,
    family_keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawMatcher {
    scenario_threshold: Option<f64>,
    pattern_weight: Option<f64>,
    situation_base: Option<f64>,
    tag_bonus: Option<f64>,
    profile_bonus: Option<f64>,
    max_supporting: Option<usize>,
    savings_target_rate: Option<f64>,
    emergency_fund_min_months: Option<u32>,
    emergency_fund_max_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency_symbol: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<NitiConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = NitiConfig::default();

    if let Some(a) = raw.analyzer {
        let c = &mut config.analyzer;
        set(&mut c.income_multiplier, a.income_multiplier);
        set(&mut c.trend_dead_band, a.trend_dead_band);
        set(&mut c.low_savings_rate, a.low_savings_rate);
        set(&mut c.top_category_limit, a.top_category_limit);
        set(&mut c.conservative_savings_rate, a.conservative_savings_rate);
        set(&mut c.aggressive_variation, a.aggressive_variation);
        set(&mut c.independence_savings_rate, a.independence_savings_rate);
        set(&mut c.emergency_fund_savings_rate, a.emergency_fund_savings_rate);
        set(&mut c.investment_keywords, lowercase(a.investment_keywords));
        set(&mut c.student_keywords, lowercase(a.student_keywords));
        set(&mut c.family_keywords, lowercase(a.family_keywords));
    }

    if let Some(m) = raw.matcher {
        let c = &mut config.matcher;
        set(&mut c.scenario_threshold, m.scenario_threshold);
        set(&mut c.pattern_weight, m.pattern_weight);
        set(&mut c.situation_base, m.situation_base);
        set(&mut c.tag_bonus, m.tag_bonus);
        set(&mut c.profile_bonus, m.profile_bonus);
        set(&mut c.max_supporting, m.max_supporting);
        set(&mut c.savings_target_rate, m.savings_target_rate);
        set(&mut c.emergency_fund_min_months, m.emergency_fund_min_months);
        set(&mut c.emergency_fund_max_months, m.emergency_fund_max_months);
    }

    if let Some(d) = raw.display {
        set(&mut config.currency_symbol, d.currency_symbol);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &NitiConfig) -> Result<()> {
    if config.analyzer.income_multiplier <= 0.0 {
        return Err(Error::Config(
            "analyzer.income_multiplier must be positive".into(),
        ));
    }
    if config.analyzer.trend_dead_band < 0.0 {
        return Err(Error::Config(
            "analyzer.trend_dead_band must not be negative".into(),
        ));
    }
    if config.matcher.max_supporting > MAX_SUPPORTING {
        return Err(Error::Config(format!(
            "matcher.max_supporting must be at most {}",
            MAX_SUPPORTING
        )));
    }
    if config.matcher.emergency_fund_min_months > config.matcher.emergency_fund_max_months {
        return Err(Error::Config(
            "matcher.emergency_fund_min_months exceeds emergency_fund_max_months".into(),
        ));
    }
    Ok(())
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

// Keyword matching is case-insensitive against lowercased input
fn lowercase(words: Option<Vec<String>>) -> Option<Vec<String>> {
    words.map(|w| w.into_iter().map(|s| s.to_lowercase()).collect())
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = NitiConfig::embedded().unwrap();
        assert_eq!(config.analyzer.income_multiplier, 1.25);
        assert_eq!(config.analyzer.top_category_limit, 5);
        assert_eq!(config.matcher.max_supporting, 2);
        assert_eq!(config.currency_symbol, "₹");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
[analyzer]
income_multiplier = 1.5
student_keywords = ["Tuition"]

[display]
currency_symbol = "$"
"#,
        )
        .unwrap();

        assert_eq!(config.analyzer.income_multiplier, 1.5);
        assert_eq!(config.analyzer.student_keywords, vec!["tuition"]);
        assert_eq!(config.analyzer.trend_dead_band, 0.10);
        assert_eq!(config.matcher.scenario_threshold, 0.3);
        assert_eq!(config.money(1234.4), "$1234");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[analyzer]\nincome_multiplier = 0.0").is_err());
        assert!(parse_config(
            "[matcher]\nemergency_fund_min_months = 12\nemergency_fund_max_months = 6"
        )
        .is_err());
        assert!(parse_config("not toml at all [").is_err());
    }

    #[test]
    fn test_max_supporting_bounded() {
        let err = parse_config("[matcher]\nmax_supporting = 5").unwrap_err();
        assert!(err.to_string().contains("max_supporting"));

        let config = parse_config("[matcher]\nmax_supporting = 1").unwrap();
        assert_eq!(config.matcher.max_supporting, 1);
    }

    #[test]
    fn test_from_path_missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = NitiConfig::from_path(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.analyzer.income_multiplier, 1.25);
    }

    #[test]
    fn test_from_path_reads_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("niti.toml");
        std::fs::write(&path, "[matcher]\ntag_bonus = 0.25\n").unwrap();

        let config = NitiConfig::from_path(&path).unwrap();
        assert_eq!(config.matcher.tag_bonus, 0.25);
    }
}

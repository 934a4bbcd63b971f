//! Declarative catalog configuration. Defaults carry the built-in tables;
//! any table supplied by a config file replaces the built-in one wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

type Table = BTreeMap<String, Vec<String>>;

fn table(entries: &[(&str, &[&str])]) -> Table {
    entries
        .iter()
        .map(|(key, candidates)| {
            (
                (*key).to_string(),
                candidates.iter().map(|c| (*c).to_string()).collect(),
            )
        })
        .collect()
}

/// Numeric knobs for the detectors and the selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Thresholds {
    /// Em-dashes tolerated per page before the rest are flagged.
    pub em_dashes_per_page: usize,
    pub words_per_page: usize,
    /// Width, in words, of the buzzword proximity window.
    pub cluster_window_words: usize,
    /// Characters inspected on each side of a match for domain cues.
    pub context_window_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            em_dashes_per_page: 2,
            words_per_page: 300,
            cluster_window_words: 50,
            context_window_chars: 100,
        }
    }
}

/// A spaced-dash compound that should be joined, e.g. `co — founder`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HyphenationFix {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Typography {
    /// Punctuation that stands in for an excess em-dash.
    pub em_dash_substitute: String,
    /// Used instead of `em_dash_substitute` when the text after the dash
    /// opens with a capital letter.
    pub sentence_break_substitute: String,
    pub hyphenation_fixes: Vec<HyphenationFix>,
}

impl Default for Typography {
    fn default() -> Self {
        let fix = |from: &str, to: &str| HyphenationFix {
            from: from.into(),
            to: to.into(),
        };
        Self {
            em_dash_substitute: ", ".into(),
            sentence_break_substitute: ". ".into(),
            hyphenation_fixes: vec![
                fix("co — founder", "co-founder"),
                fix("well — known", "well-known"),
                fix("long — term", "long-term"),
                fix("real — time", "real-time"),
            ],
        }
    }
}

/// Raw, unvalidated catalog tables. Turn into a
/// [`PatternCatalog`](crate::PatternCatalog) with `PatternCatalog::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub overused_phrases: BTreeMap<String, Vec<String>>,
    pub formal_transitions: BTreeMap<String, Vec<String>>,
    pub buzzword_clusters: Vec<Vec<String>>,
    pub cluster_alternatives: BTreeMap<String, Vec<String>>,
    pub domain_priorities: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub context_cues: BTreeMap<String, Vec<String>>,
    pub typography: Typography,
    pub thresholds: Thresholds,
}

impl CatalogConfig {
    /// A catalog skeleton with no tables, default thresholds, and default
    /// dash substitutes but no hyphenation fixes.
    pub fn empty() -> Self {
        Self {
            overused_phrases: BTreeMap::new(),
            formal_transitions: BTreeMap::new(),
            buzzword_clusters: Vec::new(),
            cluster_alternatives: BTreeMap::new(),
            domain_priorities: BTreeMap::new(),
            context_cues: BTreeMap::new(),
            typography: Typography {
                hyphenation_fixes: Vec::new(),
                ..Typography::default()
            },
            thresholds: Thresholds::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            overused_phrases: table(&[
                ("delve into", &["explore", "examine", "look at", "investigate"]),
                ("delves into", &["explores", "examines", "looks at"]),
                ("groundbreaking", &["new", "novel", "first", "pioneering"]),
                ("revolutionary", &["significant", "major", "far-reaching"]),
                ("transformative", &["significant", "meaningful", "lasting"]),
                ("innovative", &["new", "creative", "original"]),
                ("leverage", &["use", "utilize", "apply", "employ"]),
                ("seamless", &["smooth", "unified", "consistent"]),
                ("paradigm", &["model", "framework", "approach"]),
                ("paradigm shift", &["major change", "shift", "turning point"]),
                ("cutting-edge", &["advanced", "latest", "modern"]),
                ("state-of-the-art", &["advanced", "current", "leading"]),
                ("game-changing", &["significant", "important", "major"]),
                ("game changer", &["significant factor", "key element", "major influence"]),
                ("disruptive", &["influential", "far-reaching"]),
                ("synergy", &["cooperation", "collaboration", "teamwork"]),
                ("holistic", &["complete", "whole", "full"]),
                ("optimize", &["improve", "enhance", "refine"]),
                ("streamline", &["simplify", "speed up"]),
                ("robust", &["strong", "reliable", "solid"]),
                ("scalable", &["expandable", "adaptable", "flexible"]),
                ("multifaceted", &["complex", "varied", "diverse"]),
                ("pivotal", &["crucial", "key", "central"]),
                ("unprecedented", &["new", "unique", "first"]),
                ("exponential", &["rapid", "steep", "substantial"]),
                ("next level", &["improved", "better", "advanced"]),
                ("best practices", &["proven methods", "effective approaches", "good techniques"]),
            ]),
            formal_transitions: table(&[
                ("furthermore", &["also", "plus", "next"]),
                ("moreover", &["plus", "also", "what's more"]),
                ("additionally", &["also", "plus"]),
                ("consequently", &["so", "as a result"]),
                ("nevertheless", &["but", "still", "even so"]),
                ("nonetheless", &["still", "even so"]),
                ("therefore", &["so"]),
                ("thus", &["this way", "so"]),
                ("hence", &["so"]),
                ("in conclusion", &["finally", "to sum up"]),
                ("to conclude", &["in the end", "finally"]),
                ("in summary", &["to sum up", "in short"]),
                ("to summarize", &["in short"]),
                ("in essence", &["basically"]),
            ]),
            buzzword_clusters: vec![
                vec!["innovative".into(), "groundbreaking".into(), "revolutionary".into()],
                vec!["leverage".into(), "utilize".into(), "optimize".into()],
                vec!["seamless".into(), "integrated".into(), "comprehensive".into()],
                vec!["transformative".into(), "paradigm".into(), "disruptive".into()],
            ],
            cluster_alternatives: table(&[
                ("innovative", &["new"]),
                ("groundbreaking", &["first"]),
                ("revolutionary", &["big"]),
                ("leverage", &["use"]),
                ("utilize", &["use"]),
                ("optimize", &["improve"]),
                ("seamless", &["smooth"]),
                ("integrated", &["connected"]),
                ("comprehensive", &["complete", "thorough"]),
                ("transformative", &["important"]),
                ("paradigm", &["model"]),
                ("disruptive", &["changing"]),
            ]),
            domain_priorities: BTreeMap::from([
                (
                    "academic".to_string(),
                    table(&[
                        ("delve into", &["examine", "investigate", "explore", "look at"]),
                        ("delves into", &["examines", "explores", "looks at"]),
                        ("leverage", &["employ", "apply", "use"]),
                        ("groundbreaking", &["novel", "pioneering", "new"]),
                        ("innovative", &["novel", "original", "new"]),
                        ("comprehensive", &["thorough", "complete"]),
                        ("furthermore", &["in addition", "also"]),
                    ]),
                ),
                (
                    "business".to_string(),
                    table(&[
                        ("leverage", &["use", "apply", "employ"]),
                        ("optimize", &["improve", "refine"]),
                        ("synergy", &["collaboration", "teamwork"]),
                        ("best practices", &["proven methods", "good techniques"]),
                    ]),
                ),
                (
                    "grant_writing".to_string(),
                    table(&[
                        ("innovative", &["novel", "original"]),
                        ("groundbreaking", &["first", "pioneering"]),
                        ("transformative", &["meaningful", "significant"]),
                        ("comprehensive", &["thorough", "complete"]),
                        ("robust", &["reliable", "strong"]),
                    ]),
                ),
            ]),
            context_cues: table(&[
                ("academic", &["research", "study", "studies", "analysis", "hypothesis", "methodology"]),
                ("business", &["business", "market", "revenue", "customer", "customers", "stakeholder"]),
                ("grant_writing", &["grant", "proposal", "funding", "applicant", "award"]),
            ]),
            typography: Typography::default(),
            thresholds: Thresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let cfg = CatalogConfig::from_json_str(
            r#"{ "overused_phrases": { "leverage": ["use"] }, "thresholds": { "em_dashes_per_page": 4 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.overused_phrases.len(), 1);
        assert_eq!(cfg.thresholds.em_dashes_per_page, 4);
        assert_eq!(cfg.thresholds.words_per_page, 300);
        assert!(!cfg.formal_transitions.is_empty());
    }

    #[test]
    fn yaml_config_parses() {
        let cfg = CatalogConfig::from_yaml_str(
            "buzzword_clusters:\n  - [synergy, paradigm]\ntypography:\n  em_dash_substitute: \"; \"\n",
        )
        .unwrap();
        assert_eq!(cfg.buzzword_clusters, vec![vec!["synergy".to_string(), "paradigm".to_string()]]);
        assert_eq!(cfg.typography.em_dash_substitute, "; ");
        assert_eq!(cfg.typography.sentence_break_substitute, ". ");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = CatalogConfig::from_json_str(r#"{"invalid": json}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn wrong_shape_is_a_config_error() {
        let err = CatalogConfig::from_json_str(r#"{"overused_phrases": ["leverage"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }
}

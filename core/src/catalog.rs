//! Validated, immutable pattern catalog shared by every pipeline stage.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};

use crate::config::{CatalogConfig, Thresholds, Typography};
use crate::error::ConfigError;
use crate::text::{normalize_key, on_word_boundary};

/// One boundary-respecting hit of a catalog key in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub start: usize,
    pub end: usize,
    pub key: usize,
}

/// Keys compiled into a case-insensitive multi-pattern matcher.
#[derive(Debug)]
pub(crate) struct PhraseMatcher {
    keys: Vec<String>,
    automaton: Option<AhoCorasick>,
}

impl PhraseMatcher {
    fn new(keys: Vec<String>) -> Self {
        let automaton = if keys.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .ascii_case_insensitive(true)
                    .build(&keys),
            )
        };
        Self { keys, automaton }
    }

    pub(crate) fn key(&self, idx: usize) -> &str {
        &self.keys[idx]
    }

    /// Every occurrence of every key, overlapping ones included, that sits
    /// on word boundaries. Sorted by start, then by longer span first.
    pub(crate) fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        let mut found: Vec<Occurrence> = automaton
            .find_overlapping_iter(text)
            .filter(|mat| on_word_boundary(text, mat.start(), mat.end()))
            .map(|mat| Occurrence {
                start: mat.start(),
                end: mat.end(),
                key: mat.pattern(),
            })
            .collect();
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        found
    }
}

/// A set of mutually reinforcing buzzwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: usize,
    pub members: BTreeSet<String>,
}

/// Immutable detection and replacement rules. Build once with
/// [`PatternCatalog::new`] and share by reference; it is `Send + Sync`.
#[derive(Debug)]
pub struct PatternCatalog {
    phrases: BTreeMap<String, Vec<String>>,
    transitions: BTreeMap<String, Vec<String>>,
    clusters: Vec<Cluster>,
    cluster_of: HashMap<String, usize>,
    cluster_alternatives: BTreeMap<String, Vec<String>>,
    domain_priorities: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    context_cues: BTreeMap<String, BTreeSet<String>>,
    hyphenation: BTreeMap<String, String>,
    typography: Typography,
    thresholds: Thresholds,
    phrase_matcher: PhraseMatcher,
    transition_matcher: PhraseMatcher,
    cluster_matcher: PhraseMatcher,
    hyphenation_matcher: PhraseMatcher,
}

impl PatternCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, ConfigError> {
        check_threshold("words_per_page", config.thresholds.words_per_page)?;
        check_threshold("cluster_window_words", config.thresholds.cluster_window_words)?;

        let phrases = normalize_table("overused_phrases", config.overused_phrases)?;
        let transitions = normalize_table("formal_transitions", config.formal_transitions)?;
        let cluster_alternatives =
            normalize_table("cluster_alternatives", config.cluster_alternatives)?;

        let mut clusters = Vec::with_capacity(config.buzzword_clusters.len());
        let mut cluster_of: HashMap<String, usize> = HashMap::new();
        for (id, raw_members) in config.buzzword_clusters.into_iter().enumerate() {
            let mut members = BTreeSet::new();
            for raw in raw_members {
                let member = normalize_key(&raw);
                if member.is_empty() {
                    return Err(ConfigError::EmptyKey {
                        table: "buzzword_clusters",
                    });
                }
                if let Some(&first) = cluster_of.get(&member) {
                    if first != id {
                        return Err(ConfigError::DuplicateClusterMember {
                            member,
                            first,
                            second: id,
                        });
                    }
                }
                cluster_of.insert(member.clone(), id);
                members.insert(member);
            }
            if members.is_empty() {
                return Err(ConfigError::EmptyCluster { index: id });
            }
            clusters.push(Cluster { id, members });
        }

        let mut domain_priorities = BTreeMap::new();
        for (raw_domain, overrides) in config.domain_priorities {
            let domain = normalize_key(&raw_domain);
            if domain.is_empty() {
                return Err(ConfigError::EmptyKey {
                    table: "domain_priorities",
                });
            }
            let overrides = normalize_table("domain_priorities", overrides)?;
            for phrase in overrides.keys() {
                let known = phrases.contains_key(phrase)
                    || transitions.contains_key(phrase)
                    || cluster_alternatives.contains_key(phrase);
                if !known {
                    return Err(ConfigError::UnknownPriorityPhrase {
                        domain,
                        phrase: phrase.clone(),
                    });
                }
            }
            domain_priorities.insert(domain, overrides);
        }

        let context_cues: BTreeMap<String, BTreeSet<String>> = config
            .context_cues
            .into_iter()
            .map(|(domain, cues)| {
                let cues = cues
                    .iter()
                    .map(|c| normalize_key(c))
                    .filter(|c| !c.is_empty())
                    .collect::<BTreeSet<_>>();
                (normalize_key(&domain), cues)
            })
            .collect();

        let mut hyphenation = BTreeMap::new();
        for fix in &config.typography.hyphenation_fixes {
            let from = normalize_key(&fix.from);
            if from.is_empty() {
                return Err(ConfigError::EmptyKey {
                    table: "hyphenation_fixes",
                });
            }
            if hyphenation.insert(from.clone(), fix.to.clone()).is_some() {
                return Err(ConfigError::DuplicateKey {
                    table: "hyphenation_fixes",
                    key: from,
                });
            }
        }

        let phrase_matcher = PhraseMatcher::new(phrases.keys().cloned().collect());
        let transition_matcher = PhraseMatcher::new(transitions.keys().cloned().collect());
        let cluster_matcher = PhraseMatcher::new(
            clusters
                .iter()
                .flat_map(|c| c.members.iter().cloned())
                .collect(),
        );
        let hyphenation_matcher = PhraseMatcher::new(hyphenation.keys().cloned().collect());

        tracing::debug!(
            phrases = phrases.len(),
            transitions = transitions.len(),
            clusters = clusters.len(),
            domains = domain_priorities.len(),
            "pattern catalog built"
        );

        Ok(Self {
            phrases,
            transitions,
            clusters,
            cluster_of,
            cluster_alternatives,
            domain_priorities,
            context_cues,
            hyphenation,
            typography: config.typography,
            thresholds: config.thresholds,
            phrase_matcher,
            transition_matcher,
            cluster_matcher,
            hyphenation_matcher,
        })
    }

    pub fn lookup_phrase(&self, text: &str) -> Option<&[String]> {
        self.phrases.get(&normalize_key(text)).map(Vec::as_slice)
    }

    pub fn lookup_transition(&self, text: &str) -> Option<&[String]> {
        self.transitions.get(&normalize_key(text)).map(Vec::as_slice)
    }

    /// The cluster `word` belongs to. Validation guarantees at most one.
    pub fn clusters_containing(&self, word: &str) -> Option<&Cluster> {
        self.cluster_of
            .get(&normalize_key(word))
            .map(|&id| &self.clusters[id])
    }

    /// Candidates for a flagged cluster member: its overused-phrase list if
    /// it has one, otherwise its simple alternatives.
    pub fn cluster_candidates(&self, word: &str) -> Option<&[String]> {
        let key = normalize_key(word);
        self.phrases
            .get(&key)
            .or_else(|| self.cluster_alternatives.get(&key))
            .map(Vec::as_slice)
    }

    /// Default candidate order for any registered phrase.
    pub fn default_candidates(&self, phrase: &str) -> Option<&[String]> {
        let key = normalize_key(phrase);
        self.phrases
            .get(&key)
            .or_else(|| self.transitions.get(&key))
            .or_else(|| self.cluster_alternatives.get(&key))
            .map(Vec::as_slice)
    }

    /// Domain-specific order for `phrase`, falling back to the default
    /// order when the domain is unknown or has no override.
    pub fn priority_for(&self, domain: &str, phrase: &str) -> Option<&[String]> {
        self.domain_override(domain, phrase)
            .or_else(|| self.default_candidates(phrase))
    }

    /// Only the domain's own reordering, if it has one for `phrase`.
    pub fn domain_override(&self, domain: &str, phrase: &str) -> Option<&[String]> {
        self.domain_priorities
            .get(&normalize_key(domain))
            .and_then(|overrides| overrides.get(&normalize_key(phrase)))
            .map(Vec::as_slice)
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain_priorities.contains_key(&normalize_key(domain))
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domain_priorities.keys().map(String::as_str)
    }

    pub fn hyphenation_replacement(&self, from: &str) -> Option<&str> {
        self.hyphenation.get(&normalize_key(from)).map(String::as_str)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub(crate) fn context_cues(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.context_cues
    }

    pub(crate) fn phrase_matcher(&self) -> &PhraseMatcher {
        &self.phrase_matcher
    }

    pub(crate) fn transition_matcher(&self) -> &PhraseMatcher {
        &self.transition_matcher
    }

    pub(crate) fn cluster_matcher(&self) -> &PhraseMatcher {
        &self.cluster_matcher
    }

    pub(crate) fn hyphenation_matcher(&self) -> &PhraseMatcher {
        &self.hyphenation_matcher
    }
}

fn check_threshold(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidThreshold { name, value });
    }
    Ok(())
}

fn normalize_table(
    table: &'static str,
    raw: BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    let mut normalized = BTreeMap::new();
    for (raw_key, raw_candidates) in raw {
        let key = normalize_key(&raw_key);
        if key.is_empty() {
            return Err(ConfigError::EmptyKey { table });
        }
        let candidates: Vec<String> = raw_candidates
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if candidates.is_empty() {
            return Err(ConfigError::EmptyReplacements { table, key });
        }
        if normalized.insert(key.clone(), candidates).is_some() {
            return Err(ConfigError::DuplicateKey { table, key });
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_catalog_is_valid() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        assert!(catalog.lookup_phrase("Delve  Into").is_some());
        assert_eq!(catalog.lookup_transition("FURTHERMORE").unwrap()[0], "also");
        assert_eq!(catalog.domains().count(), 3);
    }

    #[test]
    fn rejects_duplicate_cluster_membership() {
        let mut cfg = CatalogConfig::empty();
        cfg.buzzword_clusters = vec![
            strings(&["innovative", "groundbreaking"]),
            strings(&["synergy", "Innovative"]),
        ];
        let err = PatternCatalog::new(cfg).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateClusterMember {
                member: "innovative".into(),
                first: 0,
                second: 1,
            }
        );
    }

    #[test]
    fn rejects_empty_replacement_list() {
        let mut cfg = CatalogConfig::empty();
        cfg.overused_phrases.insert("leverage".into(), vec!["  ".into()]);
        let err = PatternCatalog::new(cfg).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyReplacements { table: "overused_phrases", ref key } if key == "leverage"
        ));
    }

    #[test]
    fn rejects_keys_that_collide_after_normalization() {
        let mut cfg = CatalogConfig::empty();
        cfg.overused_phrases.insert("Delve into".into(), strings(&["explore"]));
        cfg.overused_phrases.insert("delve  into".into(), strings(&["examine"]));
        let err = PatternCatalog::new(cfg).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey { .. }));
    }

    #[test]
    fn rejects_zero_window() {
        let mut cfg = CatalogConfig::empty();
        cfg.thresholds.cluster_window_words = 0;
        assert_eq!(
            PatternCatalog::new(cfg).unwrap_err(),
            ConfigError::InvalidThreshold {
                name: "cluster_window_words",
                value: 0
            }
        );
    }

    #[test]
    fn rejects_priority_for_unregistered_phrase() {
        let mut cfg = CatalogConfig::empty();
        cfg.domain_priorities.insert(
            "academic".into(),
            BTreeMap::from([("synergy".to_string(), strings(&["teamwork"]))]),
        );
        assert!(matches!(
            PatternCatalog::new(cfg).unwrap_err(),
            ConfigError::UnknownPriorityPhrase { .. }
        ));
    }

    #[test]
    fn priority_falls_back_to_default_order() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        assert_eq!(catalog.priority_for("academic", "leverage").unwrap()[0], "employ");
        assert_eq!(catalog.priority_for("academic", "synergy").unwrap()[0], "cooperation");
        assert_eq!(catalog.priority_for("poetry", "leverage").unwrap()[0], "use");
        assert!(catalog.priority_for("academic", "unknown phrase").is_none());
    }

    #[test]
    fn clusters_containing_finds_single_cluster() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let cluster = catalog.clusters_containing("Utilize").unwrap();
        assert!(cluster.members.contains("leverage"));
        assert!(catalog.clusters_containing("teamwork").is_none());
    }

    #[test]
    fn cluster_candidates_prefer_phrase_table() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        assert_eq!(catalog.cluster_candidates("innovative").unwrap()[0], "new");
        assert_eq!(catalog.cluster_candidates("integrated").unwrap(), ["connected"]);
    }

    #[test]
    fn matcher_respects_word_boundaries_and_case() {
        let matcher = PhraseMatcher::new(strings(&["paradigm", "paradigm shift"]));
        let text = "A Paradigm Shift, not paradigms.";
        let hits = matcher.occurrences(text);
        assert_eq!(hits.len(), 2);
        assert_eq!(&text[hits[0].start..hits[0].end], "Paradigm Shift");
        assert_eq!(&text[hits[1].start..hits[1].end], "Paradigm");
    }

    #[test]
    fn catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PatternCatalog>();
    }
}

//! Replacement selection: candidate lookup, domain and reference-style
//! ranking, cluster avoidance, and case carry-over.

use crate::catalog::PatternCatalog;
use crate::detect::{is_pad, Match, MatchKind, Span};
use crate::style::{Register, StyleProfile, Tone};
use crate::text::{match_case, normalize_key, words, TextIndex};

/// A cluster member sitting at a word position in the text.
#[derive(Debug, Clone, Copy)]
struct ClusterMark {
    word: usize,
    cluster: usize,
    span: Span,
}

/// Fills in `Match::replacement` for resolved matches of one text.
///
/// Selection is stateful across a single text: once a replacement that
/// belongs to a buzzword cluster is placed, later selections avoid placing
/// another member of that cluster within the detection window.
pub struct ReplacementSelector<'a> {
    catalog: &'a PatternCatalog,
    text: &'a str,
    index: TextIndex<'a>,
    self_profile: &'a StyleProfile,
    reference: Option<&'a StyleProfile>,
    domain: Option<String>,
    anchors: Vec<ClusterMark>,
    placed: Vec<ClusterMark>,
}

impl<'a> ReplacementSelector<'a> {
    pub fn new(catalog: &'a PatternCatalog, text: &'a str, self_profile: &'a StyleProfile) -> Self {
        let index = TextIndex::new(text);
        let matcher = catalog.cluster_matcher();
        let anchors = matcher
            .occurrences(text)
            .into_iter()
            .filter_map(|occ| {
                let cluster = catalog.clusters_containing(matcher.key(occ.key))?;
                Some(ClusterMark {
                    word: index.word_index(occ.start),
                    cluster: cluster.id,
                    span: Span::new(occ.start, occ.end),
                })
            })
            .collect();
        Self {
            catalog,
            text,
            index,
            self_profile,
            reference: None,
            domain: None,
            anchors,
            placed: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: Option<&'a StyleProfile>) -> Self {
        self.reference = reference;
        self
    }

    /// Unknown domains are accepted and fall back to default priorities.
    pub fn with_domain(mut self, domain: Option<&str>) -> Self {
        self.domain = domain.map(normalize_key).filter(|d| !d.is_empty());
        self
    }

    /// Complete every match, left to right. Cluster words covered by any of
    /// `matches` are about to be rewritten and no longer count as present.
    pub fn select_all(&mut self, matches: Vec<Match>) -> Vec<Match> {
        self.anchors
            .retain(|a| !matches.iter().any(|m| m.span.intersects(&a.span)));
        matches.into_iter().map(|m| self.select(m)).collect()
    }

    pub fn select(&mut self, mut m: Match) -> Match {
        let replacement = match m.kind {
            MatchKind::EmDashOveruse => self.dash_replacement(m.span),
            MatchKind::HyphenationFix => match self.catalog.hyphenation_replacement(&m.key) {
                Some(fixed) => match_case(&m.original, fixed),
                None => m.original.clone(),
            },
            MatchKind::OverusedPhrase | MatchKind::FormalTransition | MatchKind::BuzzwordCluster => {
                self.phrase_replacement(&m)
            }
        };
        m.replacement = Some(replacement);
        m
    }

    fn phrase_replacement(&mut self, m: &Match) -> String {
        let domain = self.domain_for(m.span);
        let Some(candidates) = self.candidates_for(m, domain.as_deref()) else {
            tracing::warn!(key = %m.key, kind = %m.kind, "no replacement candidates; leaving text as is");
            return m.original.clone();
        };
        let ranked = rank_candidates(candidates, self.reference);
        let Some(&first) = ranked.first() else {
            return m.original.clone();
        };

        let word = self.index.word_index(m.span.start);
        let chosen = ranked
            .iter()
            .copied()
            .find(|candidate| {
                let clash = self.reintroduces_cluster(candidate, word, m.span);
                if clash {
                    tracing::trace!(%candidate, key = %m.key, "skipping clustered candidate");
                }
                !clash
            })
            .unwrap_or(first);

        if let Some(cluster) = self.catalog.clusters_containing(chosen) {
            self.placed.push(ClusterMark {
                word,
                cluster: cluster.id,
                span: m.span,
            });
        }
        match_case(&m.original, chosen)
    }

    fn candidates_for(&self, m: &Match, domain: Option<&str>) -> Option<&'a [String]> {
        let catalog = self.catalog;
        if let Some(list) = domain.and_then(|d| catalog.domain_override(d, &m.key)) {
            return Some(list);
        }
        match m.kind {
            MatchKind::OverusedPhrase => catalog.lookup_phrase(&m.key),
            MatchKind::FormalTransition => catalog.lookup_transition(&m.key),
            MatchKind::BuzzwordCluster => catalog.cluster_candidates(&m.key),
            MatchKind::EmDashOveruse | MatchKind::HyphenationFix => None,
        }
    }

    fn reintroduces_cluster(&self, candidate: &str, word: usize, span: Span) -> bool {
        let Some(cluster) = self.catalog.clusters_containing(candidate) else {
            return false;
        };
        let window = self.catalog.thresholds().cluster_window_words;
        self.anchors
            .iter()
            .filter(|mark| !mark.span.intersects(&span))
            .chain(self.placed.iter())
            .any(|mark| mark.cluster == cluster.id && mark.word.abs_diff(word) < window)
    }

    /// Explicit domain first, then cue words around the match, then the
    /// tone of the text itself.
    fn domain_for(&self, span: Span) -> Option<String> {
        if let Some(domain) = &self.domain {
            return Some(domain.clone());
        }
        if let Some(domain) = self.domain_from_context(span) {
            return Some(domain);
        }
        let from_tone = match self.self_profile.tone {
            Tone::Academic => "academic",
            Tone::Business => "business",
            Tone::Casual | Tone::Unknown => return None,
        };
        self.catalog
            .has_domain(from_tone)
            .then(|| from_tone.to_string())
    }

    fn domain_from_context(&self, span: Span) -> Option<String> {
        let reach = self.catalog.thresholds().context_window_chars;
        let mut start = span.start.saturating_sub(reach);
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = (span.end + reach).min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        let context = self.text[start..end].to_lowercase();
        let tokens: Vec<&str> = words(&context).into_iter().map(|(_, w)| w).collect();

        let mut best: Option<(&str, usize)> = None;
        let mut tied = false;
        for (domain, cues) in self.catalog.context_cues() {
            if !self.catalog.has_domain(domain) {
                continue;
            }
            let hits: usize = cues
                .iter()
                .map(|cue| {
                    if cue.contains(' ') {
                        context.matches(cue.as_str()).count()
                    } else {
                        tokens.iter().filter(|t| **t == cue.as_str()).count()
                    }
                })
                .sum();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits < top => {}
                Some((_, top)) if hits == top => tied = true,
                _ => {
                    best = Some((domain.as_str(), hits));
                    tied = false;
                }
            }
        }
        if tied {
            return None;
        }
        best.map(|(domain, _)| domain.to_string())
    }

    /// Punctuation for an excess em-dash: nothing at a line edge or straight
    /// after a previous dash's replacement, a sentence break before a capital,
    /// a plain space after existing punctuation.
    fn dash_replacement(&self, span: Span) -> String {
        let typography = self.catalog.typography();
        let before = self.text[..span.start].chars().next_back();
        let after = self.text[span.end..].chars().next();
        let (Some(before), Some(after)) = (before, after) else {
            return String::new();
        };
        if before == '\n' || after == '\n' || after == '\r' || is_pad(before) {
            return String::new();
        }
        if matches!(before, ',' | ';' | ':' | '.' | '!' | '?' | '(') {
            return " ".to_string();
        }
        if after.is_uppercase() {
            return typography.sentence_break_substitute.clone();
        }
        typography.em_dash_substitute.clone()
    }
}

/// Complete a single match without cross-match cluster state.
pub fn select(
    catalog: &PatternCatalog,
    m: Match,
    text: &str,
    self_profile: &StyleProfile,
    reference: Option<&StyleProfile>,
    domain: Option<&str>,
) -> Match {
    ReplacementSelector::new(catalog, text, self_profile)
        .with_reference(reference)
        .with_domain(domain)
        .select(m)
}

/// Order candidates for a reference style. Without a reference the catalog
/// order is kept. Ties keep catalog order.
pub fn rank_candidates<'c>(candidates: &'c [String], reference: Option<&StyleProfile>) -> Vec<&'c str> {
    let Some(reference) = reference else {
        return candidates.iter().map(String::as_str).collect();
    };
    let mut scored: Vec<(f64, usize, &str)> = candidates
        .iter()
        .enumerate()
        .map(|(rank, c)| (score_candidate(c, rank, reference), rank, c.as_str()))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, c)| c).collect()
}

/// Compatibility of `candidate` with `reference`; higher is better.
///
/// Rewards word lengths close to the reference average, pushes toward
/// short plain wording for casual references and longer wording for formal
/// ones, and charges a small penalty per step down the catalog order.
pub fn score_candidate(candidate: &str, rank: usize, reference: &StyleProfile) -> f64 {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    if tokens.is_empty() {
        return f64::MIN;
    }
    let letters: usize = tokens.iter().map(|w| w.chars().count()).sum();
    let avg = letters as f64 / tokens.len() as f64;
    let extra_words = (tokens.len() - 1) as f64;

    let fit = if reference.avg_word_length > 0.0 {
        -(avg - reference.avg_word_length).abs()
    } else {
        0.0
    };
    let bias = match reference.register() {
        Register::Casual => -0.5 * avg - 0.5 * extra_words,
        Register::Formal => 0.5 * avg,
        Register::Neutral => 0.0,
    };
    fit + bias - 0.75 * rank as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::detect::detect;
    use crate::resolve::resolve;
    use crate::style::profile;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run(catalog: &PatternCatalog, text: &str, domain: Option<&str>) -> Vec<Match> {
        let own = profile(text);
        let mut selector = ReplacementSelector::new(catalog, text, &own).with_domain(domain);
        selector.select_all(resolve(detect(text, catalog)))
    }

    fn replacement_for<'m>(matches: &'m [Match], original: &str) -> &'m str {
        matches
            .iter()
            .find(|m| m.original == original)
            .and_then(|m| m.replacement.as_deref())
            .unwrap_or_else(|| panic!("no match for {original}: {matches:#?}"))
    }

    fn casual_reference() -> StyleProfile {
        StyleProfile {
            avg_sentence_length: 8.0,
            avg_word_length: 3.8,
            em_dash_density: 0.0,
            tone: Tone::Casual,
            formality_score: 0.2,
            word_count: 200,
            sentence_count: 25,
        }
    }

    #[test]
    fn uses_first_candidate_by_default() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "We delve into it.", None);
        assert_eq!(replacement_for(&matches, "delve into"), "explore");
    }

    #[test]
    fn explicit_domain_reorders_candidates() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "We delve into it.", Some("Academic"));
        assert_eq!(replacement_for(&matches, "delve into"), "examine");
    }

    #[test]
    fn unknown_domain_falls_back_to_default_order() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "We delve into it.", Some("poetry"));
        assert_eq!(replacement_for(&matches, "delve into"), "explore");
    }

    #[test]
    fn context_cues_pick_a_domain() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "Our research will delve into soil.", None);
        assert_eq!(replacement_for(&matches, "delve into"), "examine");
    }

    #[test]
    fn casual_reference_prefers_plain_candidates() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let text = "We delve into it.";
        let own = profile(text);
        let reference = casual_reference();
        let m = resolve(detect(text, &catalog)).remove(0);
        let selected = select(&catalog, m, text, &own, Some(&reference), None);
        assert_eq!(selected.replacement.as_deref(), Some("look at"));
    }

    #[test]
    fn ranking_without_reference_keeps_order() {
        let candidates = strings(&["explore", "look at"]);
        assert_eq!(rank_candidates(&candidates, None), vec!["explore", "look at"]);
    }

    #[test]
    fn formal_reference_keeps_longer_candidates_ahead() {
        let reference = StyleProfile {
            avg_word_length: 6.0,
            tone: Tone::Academic,
            formality_score: 0.8,
            word_count: 100,
            ..StyleProfile::default()
        };
        let candidates = strings(&["examine", "look at"]);
        assert_eq!(
            rank_candidates(&candidates, Some(&reference)),
            vec!["examine", "look at"]
        );
    }

    #[test]
    fn preserves_leading_capital() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "Moreover, it helps. It is, moreover, cheap.", None);
        let replacements: Vec<&str> = matches
            .iter()
            .filter_map(|m| m.replacement.as_deref())
            .collect();
        assert_eq!(replacements, vec!["Plus", "plus"]);
    }

    #[test]
    fn skips_candidate_that_rebuilds_a_cluster() {
        let mut cfg = CatalogConfig::empty();
        cfg.overused_phrases
            .insert("leverage".into(), strings(&["utilize", "use"]));
        cfg.buzzword_clusters = vec![strings(&["utilize", "optimize"])];
        let catalog = PatternCatalog::new(cfg).unwrap();
        let matches = run(&catalog, "We optimize flows and leverage data.", None);
        assert_eq!(replacement_for(&matches, "leverage"), "use");
    }

    #[test]
    fn placed_replacements_count_toward_clusters() {
        let mut cfg = CatalogConfig::empty();
        cfg.overused_phrases
            .insert("leverage".into(), strings(&["utilize", "use"]));
        cfg.overused_phrases
            .insert("harness".into(), strings(&["optimize", "apply"]));
        cfg.buzzword_clusters = vec![strings(&["utilize", "optimize"])];
        let catalog = PatternCatalog::new(cfg).unwrap();
        let matches = run(&catalog, "We leverage data and harness tools.", None);
        assert_eq!(replacement_for(&matches, "leverage"), "utilize");
        assert_eq!(replacement_for(&matches, "harness"), "apply");
    }

    #[test]
    fn cluster_member_without_candidates_is_left_unchanged() {
        let mut cfg = CatalogConfig::empty();
        cfg.buzzword_clusters = vec![strings(&["synergy", "alignment"])];
        let catalog = PatternCatalog::new(cfg).unwrap();
        let matches = run(&catalog, "Synergy and alignment.", None);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, MatchKind::BuzzwordCluster);
        assert_eq!(matches[0].replacement.as_deref(), Some("alignment"));
    }

    #[test]
    fn em_dash_replacements_follow_surrounding_text() {
        let mut cfg = CatalogConfig::empty();
        cfg.thresholds.em_dashes_per_page = 0;
        let catalog = PatternCatalog::new(cfg).unwrap();
        let matches = run(&catalog, "fast — cheap — Good,— fine", None);
        let replacements: Vec<&str> = matches
            .iter()
            .filter_map(|m| m.replacement.as_deref())
            .collect();
        assert_eq!(replacements, vec![", ", ". ", " "]);
    }

    #[test]
    fn hyphenation_fix_uses_configured_join() {
        let catalog = PatternCatalog::new(CatalogConfig::default()).unwrap();
        let matches = run(&catalog, "Co — founder notes.", None);
        assert_eq!(replacement_for(&matches, "Co — founder"), "Co-founder");
    }
}

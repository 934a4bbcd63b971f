//! Candidate detection. Each strategy scans the text independently and may
//! produce overlapping candidates; [`crate::resolve`] sorts them out.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::PatternCatalog;
use crate::text::TextIndex;

const EM_DASH: char = '—';

/// Detection strategy that produced a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    OverusedPhrase,
    FormalTransition,
    BuzzwordCluster,
    EmDashOveruse,
    HyphenationFix,
}

impl MatchKind {
    pub fn base_confidence(self) -> f32 {
        match self {
            MatchKind::OverusedPhrase => 0.9,
            MatchKind::HyphenationFix => 0.9,
            MatchKind::FormalTransition => 0.8,
            MatchKind::BuzzwordCluster => 0.6,
            MatchKind::EmDashOveruse => 0.5,
        }
    }

    /// Heading used in text reports.
    pub fn title(self) -> &'static str {
        match self {
            MatchKind::OverusedPhrase => "OVERUSED PHRASE",
            MatchKind::FormalTransition => "FORMAL TRANSITION",
            MatchKind::BuzzwordCluster => "BUZZWORD CLUSTER",
            MatchKind::EmDashOveruse => "EM DASH OVERUSE",
            MatchKind::HyphenationFix => "HYPHENATION FIX",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchKind::OverusedPhrase => "overused-phrase",
            MatchKind::FormalTransition => "formal-transition",
            MatchKind::BuzzwordCluster => "buzzword-cluster",
            MatchKind::EmDashOveruse => "em-dash-overuse",
            MatchKind::HyphenationFix => "hyphenation-fix",
        };
        f.write_str(name)
    }
}

/// Half-open byte range `[start, end)` into the analysed text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A flagged stretch of text. `replacement` stays `None` until the
/// selector fills it in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub span: Span,
    /// Exact text at `span`, case preserved.
    pub original: String,
    /// Normalized catalog key that triggered the match.
    pub key: String,
    pub kind: MatchKind,
    pub confidence: f32,
    pub replacement: Option<String>,
    /// Cleaning pass that produced the match; offsets refer to that pass's input.
    #[serde(default)]
    pub pass: usize,
}

impl Match {
    fn candidate(text: &str, start: usize, end: usize, key: &str, kind: MatchKind) -> Self {
        Self {
            span: Span::new(start, end),
            original: text[start..end].to_string(),
            key: key.to_string(),
            kind,
            confidence: kind.base_confidence(),
            replacement: None,
            pass: 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.replacement.is_some()
    }
}

/// Run every detection strategy over `text`. Pure and deterministic.
pub fn detect(text: &str, catalog: &PatternCatalog) -> Vec<Match> {
    let index = TextIndex::new(text);
    let mut candidates = Vec::new();

    detect_overused_phrases(text, catalog, &mut candidates);
    detect_em_dashes(text, catalog, &index, &mut candidates);
    detect_formal_transitions(text, catalog, &index, &mut candidates);
    detect_buzzword_clusters(text, catalog, &index, &mut candidates);
    detect_hyphenation(text, catalog, &mut candidates);

    candidates
}

fn detect_overused_phrases(text: &str, catalog: &PatternCatalog, out: &mut Vec<Match>) {
    let matcher = catalog.phrase_matcher();
    let before = out.len();
    for occ in matcher.occurrences(text) {
        out.push(Match::candidate(
            text,
            occ.start,
            occ.end,
            matcher.key(occ.key),
            MatchKind::OverusedPhrase,
        ));
    }
    tracing::debug!(candidates = out.len() - before, "overused phrases");
}

/// Flags em-dashes past the per-page allowance. The first ones on a page are
/// left alone; only the surplus is reported.
fn detect_em_dashes(
    text: &str,
    catalog: &PatternCatalog,
    index: &TextIndex<'_>,
    out: &mut Vec<Match>,
) {
    let thresholds = catalog.thresholds();
    let dashes: Vec<usize> = text.match_indices(EM_DASH).map(|(i, _)| i).collect();
    let pages = index.word_count().div_ceil(thresholds.words_per_page).max(1);
    let allowance = thresholds.em_dashes_per_page.saturating_mul(pages);
    if dashes.len() <= allowance {
        return;
    }

    let key = EM_DASH.to_string();
    let mut floor = 0usize;
    for &pos in dashes.iter().skip(allowance) {
        let (start, end) = dash_span(text, pos, floor);
        out.push(Match::candidate(text, start, end, &key, MatchKind::EmDashOveruse));
        floor = end;
    }
    tracing::debug!(
        dashes = dashes.len(),
        allowance,
        flagged = dashes.len() - allowance,
        "em-dash density"
    );
}

/// The dash plus the horizontal whitespace hugging it. Leading whitespace
/// never reaches below `floor`, the end of the previous flagged dash.
fn dash_span(text: &str, pos: usize, floor: usize) -> (usize, usize) {
    let start = text[floor.min(pos)..pos]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_pad(*c))
        .last()
        .map(|(i, _)| floor.min(pos) + i)
        .unwrap_or(pos);
    let after = pos + EM_DASH.len_utf8();
    let end = after
        + text[after..]
            .chars()
            .take_while(|c| is_pad(*c))
            .map(char::len_utf8)
            .sum::<usize>();
    (start, end)
}

pub(crate) fn is_pad(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\u{a0}'
}

fn detect_formal_transitions(
    text: &str,
    catalog: &PatternCatalog,
    index: &TextIndex<'_>,
    out: &mut Vec<Match>,
) {
    let matcher = catalog.transition_matcher();
    let before = out.len();
    for occ in matcher.occurrences(text) {
        let mut candidate = Match::candidate(
            text,
            occ.start,
            occ.end,
            matcher.key(occ.key),
            MatchKind::FormalTransition,
        );
        if index.is_sentence_initial(occ.start) {
            candidate.confidence = 0.85;
        }
        out.push(candidate);
    }
    tracing::debug!(candidates = out.len() - before, "formal transitions");
}

/// Within each cluster, a member is flagged when a different member of the
/// same cluster appeared fewer than `cluster_window_words` words before it.
/// The first member of a run stays untouched, and a word repeated on its own
/// never forms a cluster.
fn detect_buzzword_clusters(
    text: &str,
    catalog: &PatternCatalog,
    index: &TextIndex<'_>,
    out: &mut Vec<Match>,
) {
    let matcher = catalog.cluster_matcher();
    let window = catalog.thresholds().cluster_window_words;
    let before = out.len();

    let mut by_cluster: BTreeMap<usize, Vec<(usize, usize, usize)>> = BTreeMap::new();
    for occ in matcher.occurrences(text) {
        let member = matcher.key(occ.key);
        let Some(cluster) = catalog.clusters_containing(member) else {
            continue;
        };
        by_cluster
            .entry(cluster.id)
            .or_default()
            .push((occ.start, occ.end, occ.key));
    }

    for occurrences in by_cluster.values() {
        // Latest word position of each member seen so far.
        let mut last_seen: BTreeMap<usize, usize> = BTreeMap::new();
        let mut last_end: Option<usize> = None;
        for &(start, end, key) in occurrences {
            // Nested members ("kind" inside "kind of") count once.
            if last_end.is_some_and(|e| start < e) {
                continue;
            }
            let word = index.word_index(start);
            let near_other = last_seen
                .iter()
                .any(|(&other, &prev)| other != key && word - prev < window);
            if near_other {
                out.push(Match::candidate(
                    text,
                    start,
                    end,
                    matcher.key(key),
                    MatchKind::BuzzwordCluster,
                ));
            }
            last_seen.insert(key, word);
            last_end = Some(end);
        }
    }
    tracing::debug!(candidates = out.len() - before, "buzzword clusters");
}

fn detect_hyphenation(text: &str, catalog: &PatternCatalog, out: &mut Vec<Match>) {
    let matcher = catalog.hyphenation_matcher();
    for occ in matcher.occurrences(text) {
        out.push(Match::candidate(
            text,
            occ.start,
            occ.end,
            matcher.key(occ.key),
            MatchKind::HyphenationFix,
        ));
    }
}

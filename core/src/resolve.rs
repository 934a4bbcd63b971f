//! Greedy overlap resolution.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::detect::{Match, Span};

/// Reduce candidates to a non-overlapping set ordered by span start.
///
/// Candidates are ranked by span length (longest first), then confidence
/// (highest first), then start offset (earliest first); each is accepted
/// unless it intersects an already accepted span. The result is a maximal
/// cover, not necessarily the optimal interval schedule.
pub fn resolve(mut candidates: Vec<Match>) -> Vec<Match> {
    let total = candidates.len();
    candidates.retain(|m| !m.span.is_empty());
    candidates.sort_by(precedence);

    let mut accepted: BTreeMap<usize, Match> = BTreeMap::new();
    for candidate in candidates {
        if overlaps_accepted(&accepted, candidate.span) {
            continue;
        }
        accepted.insert(candidate.span.start, candidate);
    }

    tracing::debug!(
        candidates = total,
        accepted = accepted.len(),
        discarded = total - accepted.len(),
        "resolved overlapping matches"
    );
    accepted.into_values().collect()
}

fn precedence(a: &Match, b: &Match) -> Ordering {
    b.span
        .len()
        .cmp(&a.span.len())
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.span.start.cmp(&b.span.start))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Accepted spans are disjoint, so only the nearest neighbour on each side
/// can intersect.
fn overlaps_accepted(accepted: &BTreeMap<usize, Match>, span: Span) -> bool {
    let before = accepted.range(..=span.start).next_back();
    let after = accepted.range(span.start..).next();
    [before, after]
        .into_iter()
        .flatten()
        .any(|(_, m)| m.span.intersects(&span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::MatchKind;

    fn candidate(start: usize, end: usize, kind: MatchKind, confidence: f32) -> Match {
        Match {
            span: Span::new(start, end),
            original: "x".repeat(end - start),
            key: String::new(),
            kind,
            confidence,
            replacement: None,
            pass: 0,
        }
    }

    #[test]
    fn longer_span_beats_contained_shorter_span() {
        let resolved = resolve(vec![
            candidate(0, 8, MatchKind::FormalTransition, 0.8),
            candidate(0, 14, MatchKind::OverusedPhrase, 0.9),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].span, Span::new(0, 14));
    }

    #[test]
    fn longer_span_wins_even_with_lower_confidence() {
        let resolved = resolve(vec![
            candidate(4, 10, MatchKind::OverusedPhrase, 0.9),
            candidate(2, 12, MatchKind::BuzzwordCluster, 0.6),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, MatchKind::BuzzwordCluster);
    }

    #[test]
    fn equal_length_prefers_confidence() {
        let resolved = resolve(vec![
            candidate(5, 15, MatchKind::BuzzwordCluster, 0.6),
            candidate(5, 15, MatchKind::OverusedPhrase, 0.9),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, MatchKind::OverusedPhrase);
    }

    #[test]
    fn full_tie_prefers_earliest_start() {
        let resolved = resolve(vec![
            candidate(3, 8, MatchKind::OverusedPhrase, 0.9),
            candidate(0, 5, MatchKind::OverusedPhrase, 0.9),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].span.start, 0);
    }

    #[test]
    fn output_is_sorted_and_disjoint() {
        let resolved = resolve(vec![
            candidate(20, 25, MatchKind::EmDashOveruse, 0.5),
            candidate(0, 4, MatchKind::OverusedPhrase, 0.9),
            candidate(10, 18, MatchKind::FormalTransition, 0.8),
            candidate(12, 16, MatchKind::BuzzwordCluster, 0.6),
            candidate(4, 9, MatchKind::OverusedPhrase, 0.9),
        ]);
        let spans: Vec<Span> = resolved.iter().map(|m| m.span).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 4),
                Span::new(4, 9),
                Span::new(10, 18),
                Span::new(20, 25)
            ]
        );
    }

    #[test]
    fn empty_spans_and_empty_input() {
        assert!(resolve(Vec::new()).is_empty());
        assert!(resolve(vec![candidate(3, 3, MatchKind::OverusedPhrase, 0.9)]).is_empty());
    }
}

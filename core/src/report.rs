//! Human-readable and machine-readable summaries of a match list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detect::{Match, MatchKind};

const CLEAN_MESSAGE: &str = "No AI jargon patterns detected. Text appears natural.";

/// Render matches grouped by kind, in kind order, with a change total.
pub fn report(matches: &[Match]) -> String {
    if matches.is_empty() {
        return CLEAN_MESSAGE.to_string();
    }

    let mut groups: BTreeMap<MatchKind, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        groups.entry(m.kind).or_default().push(m);
    }

    let mut out = String::new();
    out.push_str("AI JARGON ANALYSIS REPORT\n");
    out.push_str(&"=".repeat(30));
    out.push_str("\n\n");
    for (kind, entries) in &groups {
        out.push_str(&format!("{} ({} issues)\n", kind.title(), entries.len()));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        for m in entries {
            let replacement = m.replacement.as_deref().unwrap_or("(unresolved)");
            out.push_str(&format!(
                "• '{}' → '{}' (confidence: {:.1})\n",
                m.original, replacement, m.confidence
            ));
        }
        out.push('\n');
    }
    out.push_str(&format!("TOTAL CHANGES: {}\n", matches.len()));
    out
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Summary {
    pub total: usize,
    pub per_kind: BTreeMap<MatchKind, usize>,
    pub mean_confidence: f32,
}

pub fn summarize(matches: &[Match]) -> Summary {
    let mut per_kind = BTreeMap::new();
    for m in matches {
        *per_kind.entry(m.kind).or_insert(0) += 1;
    }
    let mean_confidence = if matches.is_empty() {
        0.0
    } else {
        matches.iter().map(|m| m.confidence).sum::<f32>() / matches.len() as f32
    };
    Summary {
        total: matches.len(),
        per_kind,
        mean_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Span;

    fn completed(original: &str, replacement: &str, kind: MatchKind) -> Match {
        Match {
            span: Span::new(0, original.len()),
            original: original.to_string(),
            key: original.to_lowercase(),
            kind,
            confidence: kind.base_confidence(),
            replacement: Some(replacement.to_string()),
            pass: 0,
        }
    }

    #[test]
    fn empty_list_reads_natural() {
        assert_eq!(
            report(&[]),
            "No AI jargon patterns detected. Text appears natural."
        );
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn groups_by_kind_with_counts_and_total() {
        let matches = vec![
            completed("Furthermore", "Also", MatchKind::FormalTransition),
            completed("delves into", "explores", MatchKind::OverusedPhrase),
            completed("leverage", "use", MatchKind::OverusedPhrase),
        ];
        let text = report(&matches);
        let expected = "AI JARGON ANALYSIS REPORT\n\
            ==============================\n\
            \n\
            OVERUSED PHRASE (2 issues)\n\
            ----------------------------------------\n\
            • 'delves into' → 'explores' (confidence: 0.9)\n\
            • 'leverage' → 'use' (confidence: 0.9)\n\
            \n\
            FORMAL TRANSITION (1 issues)\n\
            ----------------------------------------\n\
            • 'Furthermore' → 'Also' (confidence: 0.8)\n\
            \n\
            TOTAL CHANGES: 3\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn unresolved_matches_are_marked() {
        let mut m = completed("innovative", "", MatchKind::BuzzwordCluster);
        m.replacement = None;
        assert!(report(&[m]).contains("'innovative' → '(unresolved)' (confidence: 0.6)"));
    }

    #[test]
    fn summary_counts_and_mean() {
        let matches = vec![
            completed("a", "b", MatchKind::OverusedPhrase),
            completed("—", ", ", MatchKind::EmDashOveruse),
        ];
        let summary = summarize(&matches);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.per_kind.get(&MatchKind::OverusedPhrase), Some(&1));
        assert_eq!(summary.per_kind.get(&MatchKind::EmDashOveruse), Some(&1));
        assert!((summary.mean_confidence - 0.7).abs() < 1e-6);
    }
}

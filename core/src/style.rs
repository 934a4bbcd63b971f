//! Lexical fingerprint of a text: sentence and word length, em-dash
//! density, tone, and formality.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{split_sentences, words};

const ACADEMIC_MARKERS: &[&str] = &[
    "methodology",
    "methodologies",
    "hypothesis",
    "hypotheses",
    "furthermore",
    "research",
    "study",
    "analysis",
    "empirical",
    "findings",
];

const BUSINESS_MARKERS: &[&str] = &[
    "roi",
    "stakeholder",
    "stakeholders",
    "leverage",
    "strategy",
    "market",
    "revenue",
    "customer",
    "customers",
    "deliverables",
    "kpi",
];

const CASUAL_MARKERS: &[&str] = &[
    "really", "pretty", "awesome", "gonna", "kinda", "stuff", "okay", "hey", "cool",
];

const FORMAL_CONNECTORS: &[&str] = &[
    "furthermore",
    "moreover",
    "consequently",
    "nevertheless",
    "nonetheless",
    "therefore",
    "thus",
    "hence",
    "additionally",
    "accordingly",
];

static CONTRACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:\w+n['’]t|\w+['’](?:re|ve|ll|d|m)|(?:it|that|there|what|let|here|he|she)['’]s)\b")
        .expect("valid contraction regex")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Academic,
    Business,
    Casual,
    #[default]
    Unknown,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Academic => "academic",
            Tone::Business => "business",
            Tone::Casual => "casual",
            Tone::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Coarse register used to bias replacement choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Casual,
    Neutral,
    Formal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StyleProfile {
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    /// Em-dashes per 100 words.
    pub em_dash_density: f64,
    pub tone: Tone,
    /// 0 (casual) ..= 1 (formal).
    pub formality_score: f64,
    pub word_count: usize,
    pub sentence_count: usize,
}

impl StyleProfile {
    pub fn register(&self) -> Register {
        match self.tone {
            Tone::Casual => Register::Casual,
            Tone::Academic => Register::Formal,
            _ if self.word_count == 0 => Register::Neutral,
            _ if self.formality_score < 0.35 => Register::Casual,
            _ if self.formality_score > 0.65 => Register::Formal,
            _ => Register::Neutral,
        }
    }
}

/// Profile `text`. Empty or whitespace-only input yields the zero profile.
pub fn profile(text: &str) -> StyleProfile {
    let tokens = words(text);
    if tokens.is_empty() {
        return StyleProfile::default();
    }
    let lowered: Vec<String> = tokens.iter().map(|(_, w)| w.to_lowercase()).collect();

    let word_count = tokens.len();
    let sentence_count = split_sentences(text).len().max(1);
    let letters: usize = tokens.iter().map(|(_, w)| w.chars().count()).sum();
    let avg_word_length = letters as f64 / word_count as f64;
    let em_dashes = text.matches('—').count();

    let contractions = CONTRACTION_RE.find_iter(text).count();
    let exclamations = text.matches('!').count();
    let count_in = |list: &[&str]| lowered.iter().filter(|w| list.contains(&w.as_str())).count();

    let academic = count_in(ACADEMIC_MARKERS);
    let business = count_in(BUSINESS_MARKERS);
    let casual = count_in(CASUAL_MARKERS) + contractions + exclamations;
    let formal = count_in(FORMAL_CONNECTORS);

    StyleProfile {
        avg_sentence_length: word_count as f64 / sentence_count as f64,
        avg_word_length,
        em_dash_density: em_dashes as f64 * 100.0 / word_count as f64,
        tone: infer_tone(academic, business, casual),
        formality_score: formality(avg_word_length, formal, contractions),
        word_count,
        sentence_count,
    }
}

fn infer_tone(academic: usize, business: usize, casual: usize) -> Tone {
    let scores = [
        (Tone::Academic, academic),
        (Tone::Business, business),
        (Tone::Casual, casual),
    ];
    let best = scores.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if best == 0 {
        return Tone::Unknown;
    }
    let mut leaders = scores.iter().filter(|(_, n)| *n == best);
    match (leaders.next(), leaders.next()) {
        (Some((tone, _)), None) => *tone,
        _ => Tone::Unknown,
    }
}

/// Half lexical (longer words read as more formal), half connector balance
/// (formal connectors against contractions).
fn formality(avg_word_length: f64, formal: usize, contractions: usize) -> f64 {
    let lexical = ((avg_word_length - 3.5) / 3.0).clamp(0.0, 1.0);
    let markers = if formal + contractions == 0 {
        0.5
    } else {
        formal as f64 / (formal + contractions) as f64
    };
    0.5 * lexical + 0.5 * markers
}

//! Shared tokenization helpers. All offsets are byte offsets into the
//! original `&str` and always fall on char boundaries.

use unicode_segmentation::UnicodeSegmentation;

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "al", "fig",
    "no", "approx", "inc", "ltd", "co", "dept", "est",
];

/// Word and sentence boundaries computed once per text.
pub(crate) struct TextIndex<'a> {
    text: &'a str,
    word_starts: Vec<usize>,
    sentences: Vec<(usize, usize)>,
}

impl<'a> TextIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let word_starts = words(text).into_iter().map(|(start, _)| start).collect();
        let sentences = split_sentences(text);
        Self {
            text,
            word_starts,
            sentences,
        }
    }

    pub(crate) fn word_count(&self) -> usize {
        self.word_starts.len()
    }

    /// Index of the word that starts at `offset`, or of the next word after it.
    pub(crate) fn word_index(&self, offset: usize) -> usize {
        self.word_starts.partition_point(|start| *start < offset)
    }

    /// True when only non-word characters separate `offset` from the start
    /// of its sentence (leading quotes, list markers).
    pub(crate) fn is_sentence_initial(&self, offset: usize) -> bool {
        let idx = self.sentences.partition_point(|(start, _)| *start <= offset);
        if idx == 0 {
            return false;
        }
        let (start, end) = self.sentences[idx - 1];
        if offset >= end {
            return false;
        }
        !self.text[start..offset].chars().any(is_word_char)
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Word tokens with their byte offsets, per UAX #29 word boundaries.
pub(crate) fn words(text: &str) -> Vec<(usize, &str)> {
    text.unicode_word_indices()
        .filter(|(_, w)| w.chars().any(char::is_alphanumeric))
        .collect()
}

/// `\b`-style check: the match must not continue a word on either side.
pub(crate) fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let (Some(head), Some(tail)) = (text.get(start..end), text.get(..start)) else {
        return false;
    };
    let first = head.chars().next();
    let last = head.chars().next_back();
    let before = tail.chars().next_back();
    let after = text[end..].chars().next();

    let left_ok = !matches!((before, first), (Some(b), Some(f)) if is_word_char(b) && is_word_char(f));
    let right_ok = !matches!((last, after), (Some(l), Some(a)) if is_word_char(l) && is_word_char(a));
    left_ok && right_ok
}

/// Lowercase, trim, and collapse internal whitespace.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Carry the case of `original`'s first letter over to `replacement`.
/// Only the first character is touched.
pub(crate) fn match_case(original: &str, replacement: &str) -> String {
    let Some(first) = original.chars().next() else {
        return replacement.to_string();
    };
    if !first.is_alphabetic() {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    let Some(head) = chars.next() else {
        return String::new();
    };
    let mut out = String::with_capacity(replacement.len());
    if first.is_uppercase() {
        out.extend(head.to_uppercase());
    } else {
        out.extend(head.to_lowercase());
    }
    out.push_str(chars.as_str());
    out
}

/// Sentence spans (trimmed) using terminal punctuation, with guards for
/// abbreviations and decimals. Blank lines also end a sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut prev_terminal = false;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if start.is_none() {
            if ch.is_whitespace() {
                continue;
            }
            start = Some(idx);
        }
        let end = idx + ch.len_utf8();
        let next_is_break = match chars.peek() {
            Some((_, next)) => next.is_whitespace(),
            None => true,
        };

        let flush = match ch {
            '.' => next_is_break && !ends_with_abbreviation(&text[..idx]),
            '!' | '?' => next_is_break,
            '"' | '\'' | '”' | '’' | ')' => prev_terminal && next_is_break,
            '\n' => text[end..]
                .chars()
                .take_while(|c| c.is_whitespace())
                .any(|c| c == '\n'),
            _ => false,
        };
        prev_terminal = matches!(ch, '.' | '!' | '?');

        if flush {
            if let Some(s) = start.take() {
                push_trimmed(text, s, end, &mut spans);
            }
        }
    }

    if let Some(s) = start {
        push_trimmed(text, s, text.len(), &mut spans);
    }
    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let trimmed = text[start..end].trim_end();
    if !trimmed.is_empty() {
        spans.push((start, start + trimmed.len()));
    }
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    let token = prefix
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
        .next()
        .unwrap_or("");
    if token.is_empty() {
        return false;
    }
    let mut letters = token.chars();
    if let (Some(only), None) = (letters.next(), letters.next()) {
        // Initials such as "J. Smith".
        if only.is_uppercase() {
            return true;
        }
    }
    let lower = token.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

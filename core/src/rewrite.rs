//! Apply completed matches back onto the text.

use crate::detect::Match;

/// Substitute every completed match into a copy of `text`.
///
/// Edits run from the rightmost span leftwards so offsets of the edits still
/// to come stay valid. Unresolved matches are skipped, as are matches whose
/// span no longer holds `original` or that overlap an edit already applied.
pub fn rewrite(text: &str, matches: &[Match]) -> String {
    let mut ordered: Vec<&Match> = matches.iter().filter(|m| m.is_resolved()).collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start).then(b.span.end.cmp(&a.span.end)));

    let mut output = text.to_string();
    let mut frontier = text.len();
    let mut applied = 0usize;
    for m in ordered {
        let Some(replacement) = m.replacement.as_deref() else {
            continue;
        };
        if m.span.end > frontier {
            tracing::warn!(start = m.span.start, end = m.span.end, kind = %m.kind, "skipping overlapping edit");
            continue;
        }
        if text.get(m.span.start..m.span.end) != Some(m.original.as_str()) {
            tracing::warn!(start = m.span.start, end = m.span.end, kind = %m.kind, "span does not match text; skipping edit");
            continue;
        }
        output.replace_range(m.span.start..m.span.end, replacement);
        frontier = m.span.start;
        applied += 1;
    }

    tracing::debug!(applied, "rewrote text");
    output
}

//! Dejargon core engine.
//! Detects stock machine-generated phrasing in prose, chooses replacements
//! that fit the surrounding register, and rewrites the text.
//!
//! The pipeline runs leaf-first: [`detect`] finds candidate spans,
//! [`resolve`] keeps a non-overlapping subset, [`ReplacementSelector`]
//! fills in replacements and [`rewrite`] applies them. [`Cleaner`] wires the
//! stages together around one shared [`PatternCatalog`].

pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod report;
pub mod resolve;
pub mod rewrite;
pub mod select;
pub mod style;
mod text;

use serde::{Deserialize, Serialize};

pub use catalog::{Cluster, PatternCatalog};
pub use config::{CatalogConfig, HyphenationFix, Thresholds, Typography};
pub use detect::{detect, Match, MatchKind, Span};
pub use error::{ConfigError, Error, InputError};
pub use report::{report, summarize, Summary};
pub use resolve::resolve;
pub use rewrite::rewrite;
pub use select::{rank_candidates, score_candidate, select, ReplacementSelector};
pub use style::{profile, Register, StyleProfile, Tone};

/// Result of cleaning one text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cleaned {
    pub text: String,
    /// Completed matches in pass order, then span order.
    pub matches: Vec<Match>,
    /// Profile of the input text.
    pub self_profile: StyleProfile,
    /// Passes that produced at least one match.
    pub passes: usize,
}

impl Cleaned {
    pub fn report(&self) -> String {
        report(&self.matches)
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.matches)
    }

    pub fn changed(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Runs the full pipeline against one catalog. Cheap to build; share the
/// catalog across threads and give each worker its own cleaner if needed.
#[derive(Debug, Clone)]
pub struct Cleaner<'a> {
    catalog: &'a PatternCatalog,
    domain: Option<String>,
    reference: Option<StyleProfile>,
}

impl<'a> Cleaner<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            domain: None,
            reference: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        if !self.catalog.has_domain(&domain) {
            tracing::debug!(%domain, "unknown domain; default priorities apply");
        }
        self.domain = Some(domain);
        self
    }

    pub fn with_reference(mut self, reference: StyleProfile) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn catalog(&self) -> &'a PatternCatalog {
        self.catalog
    }

    pub fn clean(&self, text: &str) -> Cleaned {
        let self_profile = profile(text);
        let (cleaned, matches) = self.pass(text, &self_profile, 0);
        Cleaned {
            text: cleaned,
            passes: usize::from(!matches.is_empty()),
            matches,
            self_profile,
        }
    }

    pub fn clean_bytes(&self, bytes: &[u8]) -> Result<Cleaned, InputError> {
        Ok(self.clean(decode(bytes)?))
    }

    /// [`Cleaner::clean_iteratively`] over raw bytes.
    pub fn clean_bytes_iteratively(
        &self,
        bytes: &[u8],
        max_passes: usize,
    ) -> Result<Cleaned, InputError> {
        Ok(self.clean_iteratively(decode(bytes)?, max_passes))
    }

    /// Clean repeatedly until a pass finds nothing, the text stops changing,
    /// or `max_passes` is reached. Offsets of each match refer to the input
    /// of the pass recorded in `Match::pass`.
    pub fn clean_iteratively(&self, text: &str, max_passes: usize) -> Cleaned {
        let self_profile = profile(text);
        let mut current = text.to_string();
        let mut matches = Vec::new();
        let mut passes = 0;

        for pass in 0..max_passes.max(1) {
            let pass_profile = if pass == 0 {
                self_profile.clone()
            } else {
                profile(&current)
            };
            let (next, found) = self.pass(&current, &pass_profile, pass);
            if found.is_empty() {
                break;
            }
            passes += 1;
            matches.extend(found);
            if next == current {
                break;
            }
            current = next;
        }

        tracing::debug!(passes, matches = matches.len(), "iterative cleaning finished");
        Cleaned {
            text: current,
            matches,
            self_profile,
            passes,
        }
    }

    fn pass(&self, text: &str, self_profile: &StyleProfile, pass: usize) -> (String, Vec<Match>) {
        let candidates = detect(text, self.catalog);
        let resolved = resolve(candidates);
        let mut selector = ReplacementSelector::new(self.catalog, text, self_profile)
            .with_reference(self.reference.as_ref())
            .with_domain(self.domain.as_deref());
        let mut matches = selector.select_all(resolved);
        for m in &mut matches {
            m.pass = pass;
        }
        let cleaned = rewrite(text, &matches);
        (cleaned, matches)
    }
}

fn decode(bytes: &[u8]) -> Result<&str, InputError> {
    std::str::from_utf8(bytes).map_err(|err| InputError::NotUtf8 {
        valid_up_to: err.valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PatternCatalog {
        PatternCatalog::new(CatalogConfig::default()).unwrap()
    }

    #[test]
    fn clean_replaces_and_reports() {
        let catalog = catalog();
        let cleaned = Cleaner::new(&catalog).clean("We delve into the data.");
        assert_eq!(cleaned.text, "We explore the data.");
        assert_eq!(cleaned.passes, 1);
        assert!(cleaned.report().contains("TOTAL CHANGES: 1"));
        assert_eq!(cleaned.summary().total, 1);
    }

    #[test]
    fn clean_bytes_rejects_invalid_utf8() {
        let catalog = catalog();
        let err = Cleaner::new(&catalog)
            .clean_bytes(&[b'o', b'k', 0xff, b'!'])
            .unwrap_err();
        assert_eq!(err, InputError::NotUtf8 { valid_up_to: 2 });
    }

    #[test]
    fn iterative_bytes_share_the_utf8_check() {
        let catalog = catalog();
        let cleaner = Cleaner::new(&catalog);
        assert_eq!(
            cleaner.clean_bytes_iteratively(&[0xc3, 0x28], 3).unwrap_err(),
            InputError::NotUtf8 { valid_up_to: 0 }
        );
        let cleaned = cleaner
            .clean_bytes_iteratively(b"We delve into the data.", 3)
            .unwrap();
        assert_eq!(cleaned.text, "We explore the data.");
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let catalog = catalog();
        let cleaned = Cleaner::new(&catalog).clean("");
        assert_eq!(cleaned.text, "");
        assert!(!cleaned.changed());
        assert_eq!(cleaned.passes, 0);
        assert_eq!(cleaned.self_profile, StyleProfile::default());
    }

    #[test]
    fn explicit_domain_changes_choice() {
        let catalog = catalog();
        let cleaned = Cleaner::new(&catalog)
            .with_domain("academic")
            .clean("We delve into the data.");
        assert_eq!(cleaned.text, "We examine the data.");
    }
}

//! Error types for catalog construction and text input.

/// Structural defect in a pattern catalog. Raised once, while building the
/// catalog; a catalog that fails validation is never handed out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed catalog configuration: {0}")]
    Malformed(String),

    #[error("empty key in `{table}`")]
    EmptyKey { table: &'static str },

    #[error("`{key}` appears twice in `{table}` after normalization")]
    DuplicateKey { table: &'static str, key: String },

    #[error("`{key}` in `{table}` has no replacement candidates")]
    EmptyReplacements { table: &'static str, key: String },

    #[error("buzzword cluster #{index} has no members")]
    EmptyCluster { index: usize },

    #[error("`{member}` belongs to buzzword clusters #{first} and #{second}")]
    DuplicateClusterMember {
        member: String,
        first: usize,
        second: usize,
    },

    #[error("domain `{domain}` reorders `{phrase}`, which is not a registered phrase")]
    UnknownPriorityPhrase { domain: String, phrase: String },

    #[error("threshold `{name}` must be positive (got {value})")]
    InvalidThreshold { name: &'static str, value: usize },
}

/// Input that cannot be treated as text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    NotUtf8 { valid_up_to: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),
}

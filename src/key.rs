//! Identity keys for matching translations across document revisions

use clap::ValueEnum;
use sha2::{Digest, Sha256};

/// How existing translations are matched against reference units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyPolicy {
    /// Match on (group, id, source text). A source edit invalidates the
    /// stored translation even when the id is reused.
    #[default]
    Standard,
    /// Match on (id, source text), ignoring the group. Lets a translation
    /// survive when a string moves as-is from one file to another.
    Nofile,
    /// Match on id alone. Source edits do not invalidate.
    Matchid,
}

/// Composite identity of a translation unit under a [`KeyPolicy`].
///
/// A tagged value compared field by field, not a concatenated string, so
/// variable-length fields cannot collide. The digest is the leading bytes
/// of a SHA-256 of the source text: stable across runs and platforms,
/// which is what keeps previously valid translations from being discarded
/// wholesale on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    group: Option<String>,
    id: String,
    source_digest: Option<u64>,
}

impl IdentityKey {
    /// Build the key for a unit in group `group` with the given policy.
    pub fn build(policy: KeyPolicy, group: &str, id: &str, source: &str) -> Self {
        match policy {
            KeyPolicy::Standard => Self {
                group: Some(group.to_string()),
                id: id.to_string(),
                source_digest: Some(source_digest(source)),
            },
            KeyPolicy::Nofile => Self {
                group: None,
                id: id.to_string(),
                source_digest: Some(source_digest(source)),
            },
            KeyPolicy::Matchid => Self {
                group: None,
                id: id.to_string(),
                source_digest: None,
            },
        }
    }
}

fn source_digest(source: &str) -> u64 {
    let digest = Sha256::digest(source.as_bytes());
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

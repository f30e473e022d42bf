//! Translation reconciliation: carry existing translations into a fresh
//! copy of the reference document.

use crate::document::XliffDocument;
use crate::key::{IdentityKey, KeyPolicy};
use std::collections::HashMap;

/// Per-document merge counters, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Units whose translation carried over
    pub carried: usize,
    /// Units left (or made) untranslated
    pub untranslated: usize,
}

/// Collect the existing translations of a locale document, keyed by
/// identity under `policy`.
///
/// Only units that currently carry a target contribute. Duplicate keys
/// (duplicate ids under a loose policy) are tolerated: last write wins.
pub fn collect_translations(
    doc: &XliffDocument,
    policy: KeyPolicy,
) -> HashMap<IdentityKey, String> {
    let mut translations = HashMap::new();
    for (group, unit) in doc.units() {
        if let Some(ref target) = unit.target {
            let key = IdentityKey::build(policy, group, &unit.id, &unit.source);
            translations.insert(key, target.clone());
        }
    }
    translations
}

/// Walk every unit of `doc` (a working copy of the reference document)
/// and inject the matching translation, or clear any stray target when
/// no translation matches.
///
/// Every unit is also marked `xml:space="preserve"` so downstream tools
/// keep the text verbatim; the marking is a plain flag, so running the
/// merge twice cannot duplicate it.
pub fn merge_translations(
    doc: &mut XliffDocument,
    translations: &HashMap<IdentityKey, String>,
    policy: KeyPolicy,
) -> MergeStats {
    let mut stats = MergeStats::default();

    for group in &mut doc.groups {
        for unit in &mut group.units {
            unit.preserve_space = true;

            let key = IdentityKey::build(policy, &group.original, &unit.id, &unit.source);
            match translations.get(&key) {
                Some(target) => {
                    unit.target = Some(target.clone());
                    stats.carried += 1;
                }
                None => {
                    unit.target = None;
                    stats.untranslated += 1;
                }
            }
        }
    }

    stats
}

/// Set the target language on every group of the merged document.
pub fn set_target_language(doc: &mut XliffDocument, code: &str) {
    for group in &mut doc.groups {
        group.target_language = Some(code.to_string());
    }
}

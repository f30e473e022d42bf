//! Locale folder name to target-language code mapping

use std::collections::HashMap;

/// Folder-name overrides applied before hyphen normalization.
pub type LocaleOverrides = HashMap<String, String>;

/// Built-in override table for special-cased locale folders.
pub fn default_locale_overrides() -> LocaleOverrides {
    // sv_SE ships under a country-qualified folder but is served as "sv".
    let mut overrides = HashMap::new();
    overrides.insert("sv_SE".to_string(), "sv".to_string());
    overrides
}

/// Turn a locale folder name into a `target-language` code: apply the
/// override table, then replace underscores with hyphens (`en_GB` becomes
/// `en-GB`).
pub fn normalize_locale(folder: &str, overrides: &LocaleOverrides) -> String {
    let code = overrides
        .get(folder)
        .map(String::as_str)
        .unwrap_or(folder);
    code.replace('_', "-")
}

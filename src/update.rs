//! Per-locale update driver
//!
//! For one reference XLIFF file and a set of locale folders, rebuilds
//! every locale file from the current reference structure while keeping
//! the translations that still match.

use crate::document::XliffDocument;
use crate::key::KeyPolicy;
use crate::locale::{normalize_locale, LocaleOverrides};
use crate::merge::{collect_translations, merge_translations, set_target_language, MergeStats};
use crate::{writer, L10nError};
use std::path::{Path, PathBuf};

/// One update run: a reference file crossed with a set of locales.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Root folder holding one subfolder per locale
    pub base_path: PathBuf,
    /// Reference (source-language) locale code
    pub reference_locale: String,
    /// XLIFF file name inside each locale folder
    pub filename: String,
    /// Identity-key policy for matching existing translations
    pub policy: KeyPolicy,
    /// Explicit locales to process; empty means every subfolder except
    /// the reference
    pub locales: Vec<String>,
    /// Locale folder name overrides
    pub overrides: LocaleOverrides,
}

/// Result of updating a single locale.
#[derive(Debug, Clone)]
pub struct LocaleOutcome {
    pub locale: String,
    pub path: PathBuf,
    pub stats: MergeStats,
    /// Whether the locale file existed before this run
    pub created: bool,
}

/// Aggregate result of one update run.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub updated: Vec<LocaleOutcome>,
    /// (locale, reason) pairs that were skipped without aborting the run
    pub skipped: Vec<(String, String)>,
}

/// Update every requested locale from the reference file.
///
/// A missing or unparseable reference file is fatal. An unparseable
/// existing locale file only skips that locale. A locale with no existing
/// file is synthesized from the reference with no translations.
pub fn update_locales(opts: &UpdateOptions) -> Result<UpdateReport, L10nError> {
    let reference_path = opts
        .base_path
        .join(&opts.reference_locale)
        .join(&opts.filename);
    if !reference_path.is_file() {
        return Err(L10nError::MissingReference(reference_path));
    }
    let reference = XliffDocument::load(&reference_path)?;

    let locales = resolve_locales(opts)?;
    let mut report = UpdateReport::default();

    for locale in locales {
        let locale_path = opts.base_path.join(&locale).join(&opts.filename);
        let existed = locale_path.is_file();

        let translations = if existed {
            match XliffDocument::load(&locale_path) {
                Ok(doc) => collect_translations(&doc, opts.policy),
                Err(e) => {
                    report.skipped.push((locale, e.to_string()));
                    continue;
                }
            }
        } else {
            // No existing file: the locale starts from nothing.
            Default::default()
        };

        let mut merged = reference.clone();
        let stats = merge_translations(&mut merged, &translations, opts.policy);
        let code = normalize_locale(&locale, &opts.overrides);
        set_target_language(&mut merged, &code);

        if let Err(e) = writer::write_file(&merged, &locale_path) {
            report.skipped.push((locale, e.to_string()));
            continue;
        }

        report.updated.push(LocaleOutcome {
            locale,
            path: locale_path,
            stats,
            created: !existed,
        });
    }

    Ok(report)
}

/// Resolve the locale list: the explicit request, or every subfolder of
/// the base path except the reference locale and dot-folders.
fn resolve_locales(opts: &UpdateOptions) -> Result<Vec<String>, L10nError> {
    let mut locales = if opts.locales.is_empty() {
        discover_locales(&opts.base_path, &opts.reference_locale)?
    } else {
        opts.locales
            .iter()
            .filter(|l| *l != &opts.reference_locale)
            .cloned()
            .collect()
    };
    locales.sort();
    locales.dedup();

    if locales.is_empty() {
        return Err(L10nError::NoLocalesUpdated);
    }
    Ok(locales)
}

fn discover_locales(base_path: &Path, reference: &str) -> Result<Vec<String>, L10nError> {
    let entries = std::fs::read_dir(base_path).map_err(|e| L10nError::io(base_path, e))?;

    let mut locales = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| L10nError::io(base_path, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != reference && !name.starts_with('.') {
            locales.push(name);
        }
    }
    Ok(locales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REFERENCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
  <file original="A" source-language="en" target-language="en" datatype="plaintext">
    <body>
      <trans-unit id="1">
        <source>Hello %1</source>
      </trans-unit>
      <trans-unit id="2">
        <source>Bye</source>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    const FR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
  <file original="A" source-language="en" target-language="fr" datatype="plaintext">
    <body>
      <trans-unit id="1">
        <source>Hello %1</source>
        <target>Bonjour %1</target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    fn setup(locales: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("en")).unwrap();
        fs::write(dir.path().join("en/app.xliff"), REFERENCE).unwrap();
        for (locale, content) in locales {
            fs::create_dir(dir.path().join(locale)).unwrap();
            fs::write(dir.path().join(locale).join("app.xliff"), content).unwrap();
        }
        dir
    }

    fn options(dir: &TempDir, locales: &[&str]) -> UpdateOptions {
        UpdateOptions {
            base_path: dir.path().to_path_buf(),
            reference_locale: "en".to_string(),
            filename: "app.xliff".to_string(),
            policy: KeyPolicy::Standard,
            locales: locales.iter().map(|s| s.to_string()).collect(),
            overrides: crate::locale::default_locale_overrides(),
        }
    }

    #[test]
    fn test_update_carries_matching_translation() {
        let dir = setup(&[("fr", FR)]);
        let report = update_locales(&options(&dir, &[])).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].stats.carried, 1);
        assert_eq!(report.updated[0].stats.untranslated, 1);

        let merged = XliffDocument::load(&dir.path().join("fr/app.xliff")).unwrap();
        assert_eq!(
            merged.groups[0].units[0].target.as_deref(),
            Some("Bonjour %1")
        );
        assert_eq!(merged.groups[0].units[1].target, None);
        assert_eq!(merged.groups[0].target_language.as_deref(), Some("fr"));
        assert!(merged.units().all(|(_, u)| u.preserve_space));
    }

    #[test]
    fn test_update_invalidates_on_source_change() {
        let dir = setup(&[("fr", FR)]);

        // Edit the reference source for id=1 and rerun.
        let edited = REFERENCE.replace("Hello %1", "Hello %1!");
        fs::write(dir.path().join("en/app.xliff"), edited).unwrap();

        let report = update_locales(&options(&dir, &[])).unwrap();
        assert_eq!(report.updated[0].stats.carried, 0);

        let merged = XliffDocument::load(&dir.path().join("fr/app.xliff")).unwrap();
        assert_eq!(merged.groups[0].units[0].target, None);
    }

    #[test]
    fn test_update_matchid_retains_on_source_change() {
        let dir = setup(&[("fr", FR)]);
        let edited = REFERENCE.replace("Hello %1", "Hello %1!");
        fs::write(dir.path().join("en/app.xliff"), edited).unwrap();

        let mut opts = options(&dir, &[]);
        opts.policy = KeyPolicy::Matchid;
        let report = update_locales(&opts).unwrap();
        assert_eq!(report.updated[0].stats.carried, 1);
    }

    #[test]
    fn test_update_creates_locale_from_nothing() {
        let dir = setup(&[]);
        let report = update_locales(&options(&dir, &["de"])).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert!(report.updated[0].created);

        let created = XliffDocument::load(&dir.path().join("de/app.xliff")).unwrap();
        assert_eq!(created.unit_count(), 2);
        assert!(created.units().all(|(_, u)| u.target.is_none()));
        assert_eq!(created.groups[0].target_language.as_deref(), Some("de"));
    }

    #[test]
    fn test_update_rerun_is_stable() {
        let dir = setup(&[("fr", FR)]);
        update_locales(&options(&dir, &[])).unwrap();
        let first = fs::read_to_string(dir.path().join("fr/app.xliff")).unwrap();

        update_locales(&options(&dir, &[])).unwrap();
        let second = fs::read_to_string(dir.path().join("fr/app.xliff")).unwrap();
        assert_eq!(first, second);
        // Exactly one preserve marking per unit, even after two runs.
        assert_eq!(second.matches("xml:space").count(), 2);
    }

    #[test]
    fn test_update_skips_unparseable_locale() {
        let dir = setup(&[("fr", FR), ("it", "not xml at all")]);
        let report = update_locales(&options(&dir, &[])).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].locale, "fr");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "it");
        // The broken file is left untouched.
        assert_eq!(
            fs::read_to_string(dir.path().join("it/app.xliff")).unwrap(),
            "not xml at all"
        );
    }

    #[test]
    fn test_update_missing_reference_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = update_locales(&options(&dir, &["fr"])).unwrap_err();
        assert!(matches!(err, L10nError::MissingReference(_)));
    }

    #[test]
    fn test_update_unparseable_reference_is_fatal() {
        let dir = setup(&[("fr", FR)]);
        fs::write(dir.path().join("en/app.xliff"), "broken").unwrap();
        assert!(update_locales(&options(&dir, &[])).is_err());
    }

    #[test]
    fn test_update_excludes_reference_locale() {
        let dir = setup(&[]);
        let err = update_locales(&options(&dir, &["en"])).unwrap_err();
        assert!(matches!(err, L10nError::NoLocalesUpdated));
    }

    #[test]
    fn test_update_normalizes_locale_folder_names() {
        let dir = setup(&[]);
        update_locales(&options(&dir, &["sv_SE", "en_GB"])).unwrap();

        let sv = XliffDocument::load(&dir.path().join("sv_SE/app.xliff")).unwrap();
        assert_eq!(sv.groups[0].target_language.as_deref(), Some("sv"));

        let gb = XliffDocument::load(&dir.path().join("en_GB/app.xliff")).unwrap();
        assert_eq!(gb.groups[0].target_language.as_deref(), Some("en-GB"));
    }

    #[test]
    fn test_update_discovery_ignores_dot_folders() {
        let dir = setup(&[("fr", FR)]);
        fs::create_dir(dir.path().join(".git")).unwrap();

        let report = update_locales(&options(&dir, &[])).unwrap();
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].locale, "fr");
    }
}

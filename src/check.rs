//! Structural validation of translated strings
//!
//! Findings are collected across the whole tree and reported in
//! aggregate; nothing here raises on a bad translation.

use crate::document::XliffDocument;
use crate::L10nError;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Exceptions file: ids and locales for which known findings are waived.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckExceptions {
    #[serde(default)]
    pub ellipsis: EllipsisExceptions,
    /// Per-locale ids with intentionally different placeholders
    #[serde(default)]
    pub placeables: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EllipsisExceptions {
    /// Locales whose style guide allows plain dots
    #[serde(default)]
    pub excluded_locales: Vec<String>,
    /// Per-locale ids exempt from the ellipsis checks
    #[serde(default)]
    pub locales: HashMap<String, Vec<String>>,
}

impl CheckExceptions {
    /// Load exceptions from a JSON file.
    pub fn load(path: &Path) -> Result<Self, L10nError> {
        let content = std::fs::read_to_string(path).map_err(|e| L10nError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| L10nError::Parse(e.to_string()).with_path(path))
    }

    fn ellipsis_waived(&self, locale: &str, string_id: &str) -> bool {
        self.ellipsis.excluded_locales.iter().any(|l| l == locale)
            || self
                .ellipsis
                .locales
                .get(locale)
                .is_some_and(|ids| ids.iter().any(|id| id == string_id))
    }

    fn placeables_waived(&self, locale: &str, string_id: &str) -> bool {
        self.placeables
            .get(locale)
            .is_some_and(|ids| ids.iter().any(|id| id == string_id))
    }
}

/// One validation finding on a translated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Relative file path and unit id, `path:id`
    pub string_id: String,
    pub message: String,
    pub translation: String,
    /// Reference text, included where the comparison matters
    pub reference: Option<String>,
}

/// Aggregate result of checking a locale tree.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Findings grouped by locale code, sorted
    pub findings: BTreeMap<String, Vec<Finding>>,
    /// Files that could not be parsed (diagnosed, not fatal)
    pub unreadable: Vec<(PathBuf, String)>,
}

impl CheckReport {
    pub fn total(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Render the per-locale report the way it appears on screen and in
    /// the optional output file.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        for (locale, findings) in &self.findings {
            out.push(format!("\nLocale: {} ({})", locale, findings.len()));
            for finding in findings {
                out.push(format!("\n  {} in {}", finding.message, finding.string_id));
                out.push(format!("    Translation: {}", finding.translation));
                if let Some(ref reference) = finding.reference {
                    out.push(format!("    Reference: {}", reference));
                }
            }
        }
        out.push(format!("\nTotal errors: {}", self.total()));
        out.join("\n")
    }
}

/// Translation checker with compiled patterns and loaded exceptions.
#[derive(Debug)]
pub struct Checker {
    exceptions: CheckExceptions,
    placeable_re: Regex,
    tag_re: Regex,
}

impl Checker {
    pub fn new(exceptions: CheckExceptions) -> Self {
        Self {
            exceptions,
            // Qt numbered placeholders plus iOS-style %@ variants.
            placeable_re: Regex::new(r"%[1-9ds]?\$?@|%[1-9]").expect("placeable pattern"),
            tag_re: Regex::new(r"</?\s*([a-zA-Z][a-zA-Z0-9]*)[^<>]*>").expect("tag pattern"),
        }
    }

    /// Check every `*.xliff` under `root`. The locale code comes from the
    /// top-level folder name, underscores normalized to hyphens.
    pub fn check_tree(&self, root: &Path) -> Result<CheckReport, L10nError> {
        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                e.file_type().is_file()
                    && e.path().extension().is_some_and(|ext| ext == "xliff")
            })
            .map(|e| e.into_path())
            .collect();
        if paths.is_empty() {
            return Err(L10nError::NoXliffFiles(root.to_path_buf()));
        }
        paths.sort();

        let mut report = CheckReport::default();
        for path in paths {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let Some(folder) = rel.components().next() else {
                continue;
            };
            let folder = folder.as_os_str().to_string_lossy().into_owned();
            let locale = folder.replace('_', "-");
            let rel_file = rel
                .strip_prefix(&folder)
                .unwrap_or(rel)
                .to_string_lossy()
                .into_owned();

            let doc = match XliffDocument::load(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    report.unreadable.push((path, e.to_string()));
                    continue;
                }
            };

            let findings = report.findings.entry(locale.clone()).or_default();
            for (_, unit) in doc.units() {
                let Some(ref target) = unit.target else {
                    continue;
                };
                let string_id = format!("{}:{}", rel_file, unit.id);
                self.check_unit(&locale, &string_id, &unit.source, target, findings);
            }
            if report.findings.get(&locale).is_some_and(Vec::is_empty) {
                report.findings.remove(&locale);
            }
        }

        Ok(report)
    }

    /// Run every rule on a single (source, translation) pair.
    pub fn check_unit(
        &self,
        locale: &str,
        string_id: &str,
        source: &str,
        translation: &str,
        findings: &mut Vec<Finding>,
    ) {
        let ellipsis_waived = self.exceptions.ellipsis_waived(locale, string_id);

        // Plain dots where the typographic ellipsis is expected.
        if !ellipsis_waived && translation.contains("...") {
            findings.push(Finding {
                string_id: string_id.to_string(),
                message: "'...' used instead of '…'".to_string(),
                translation: translation.to_string(),
                reference: None,
            });
        }

        // Reference ellipsis lost in translation.
        if !ellipsis_waived && source.contains('…') && !translation.contains('…') {
            findings.push(Finding {
                string_id: string_id.to_string(),
                message: "'…' missing".to_string(),
                translation: translation.to_string(),
                reference: None,
            });
        }

        // Placeholder multiset must carry over exactly.
        let mut ref_placeables = self.placeables(source);
        if !ref_placeables.is_empty() && !self.exceptions.placeables_waived(locale, string_id) {
            let mut l10n_placeables = self.placeables(translation);
            ref_placeables.sort();
            l10n_placeables.sort();
            if ref_placeables != l10n_placeables {
                findings.push(Finding {
                    string_id: string_id.to_string(),
                    message: "Variable mismatch".to_string(),
                    translation: translation.to_string(),
                    reference: Some(source.to_string()),
                });
            }
        }

        // HTML tag multiset (line breaks ignored) must carry over.
        let ref_tags = self.html_tags(source);
        if !ref_tags.is_empty() && self.html_tags(translation) != ref_tags {
            findings.push(Finding {
                string_id: string_id.to_string(),
                message: "Mismatched HTML elements".to_string(),
                translation: translation.to_string(),
                reference: Some(source.to_string()),
            });
        }

        // Pilcrows are placeholders from broken tooling, never legitimate.
        if translation.contains('¶') {
            findings.push(Finding {
                string_id: string_id.to_string(),
                message: "'¶' found".to_string(),
                translation: translation.to_string(),
                reference: None,
            });
        }
    }

    fn placeables(&self, text: &str) -> Vec<String> {
        self.placeable_re
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Sorted multiset of HTML element names, after entity unescaping,
    /// with `br` dropped.
    fn html_tags(&self, text: &str) -> Vec<String> {
        let unescaped = unescape_entities(text);
        let mut tags: Vec<String> = self
            .tag_re
            .captures_iter(&unescaped)
            .map(|c| c[1].to_lowercase())
            .filter(|t| t != "br")
            .collect();
        tags.sort();
        tags
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(CheckExceptions::default())
    }
}

/// Undo one level of entity escaping, for strings carrying escaped HTML.
fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

//! Localization pipeline tools for XLIFF 1.2 locale trees
//!
//! A locale tree has one subfolder per locale code, each mirroring the
//! reference locale's XLIFF files. The library reconciles locale files
//! against an updated reference (keeping translations whose identity
//! still matches), validates translated strings, cleans extractor
//! output, and prunes obsolete files.
//!
//! # Example
//!
//! ```
//! use xliff_l10n::{collect_translations, merge_translations, KeyPolicy, XliffDocument};
//!
//! let reference = XliffDocument::parse(r#"
//!     <xliff version="1.2"><file original="app"><body>
//!       <trans-unit id="hi"><source>Hello</source></trans-unit>
//!     </body></file></xliff>"#).unwrap();
//!
//! let locale = XliffDocument::parse(r#"
//!     <xliff version="1.2"><file original="app"><body>
//!       <trans-unit id="hi"><source>Hello</source><target>Bonjour</target></trans-unit>
//!     </body></file></xliff>"#).unwrap();
//!
//! let translations = collect_translations(&locale, KeyPolicy::Standard);
//! let mut merged = reference.clone();
//! merge_translations(&mut merged, &translations, KeyPolicy::Standard);
//! assert_eq!(merged.groups[0].units[0].target.as_deref(), Some("Bonjour"));
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod check;
pub mod document;
pub mod extract;
pub mod key;
pub mod locale;
pub mod merge;
pub mod prune;
pub mod update;
pub mod writer;

pub use check::{CheckExceptions, CheckReport, Checker, Finding};
pub use document::{FileGroup, TransUnit, XliffDocument};
pub use extract::{
    clean_reference, extract_reference, set_language_all, CleanupOptions, LconvertExtractor,
    PathRewrite, StringExtractor,
};
pub use key::{IdentityKey, KeyPolicy};
pub use locale::{default_locale_overrides, normalize_locale, LocaleOverrides};
pub use merge::{collect_translations, merge_translations, set_target_language, MergeStats};
pub use prune::prune_obsolete;
pub use update::{update_locales, LocaleOutcome, UpdateOptions, UpdateReport};

/// Errors raised by the localization pipeline
#[derive(Error, Debug)]
pub enum L10nError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Can't parse {}: {message}", .path.display())]
    ParseFile { path: PathBuf, message: String },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Requested reference file doesn't exist: {}", .0.display())]
    MissingReference(PathBuf),
    #[error("No locales updated")]
    NoLocalesUpdated,
    #[error("No XLIFF files found in {}", .0.display())]
    NoXliffFiles(PathBuf),
    #[error("Extraction tool failed: {0}")]
    Extractor(String),
}

impl L10nError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Attach a file path to a bare parse error.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Parse(message) => Self::ParseFile {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        }
    }
}

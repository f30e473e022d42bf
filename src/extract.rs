//! Reference-file extraction pipeline
//!
//! The external string-extraction tool is an injected collaborator, so
//! everything after "a fresh XLIFF file exists on disk" is testable
//! without Qt installed.

use crate::document::XliffDocument;
use crate::{writer, L10nError};
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// External tool that turns a translation-source file into XLIFF.
pub trait StringExtractor {
    /// Convert `input` and write the XLIFF result to `output`.
    fn extract(&self, input: &Path, output: &Path) -> Result<(), L10nError>;
}

/// Qt's `lconvert`, the extractor used by the real pipeline.
#[derive(Debug, Clone, Default)]
pub struct LconvertExtractor {
    /// Directory holding the Qt tools; `None` relies on PATH
    pub tool_dir: Option<PathBuf>,
}

impl StringExtractor for LconvertExtractor {
    fn extract(&self, input: &Path, output: &Path) -> Result<(), L10nError> {
        let exe = match self.tool_dir {
            Some(ref dir) => dir.join("lconvert"),
            None => PathBuf::from("lconvert"),
        };

        let status = Command::new(&exe)
            .arg("-if")
            .arg("ts")
            .arg("-i")
            .arg(input)
            .arg("-of")
            .arg("xlf")
            .arg("-o")
            .arg(output)
            .status()
            .map_err(|e| L10nError::Extractor(format!("{}: {}", exe.display(), e)))?;

        if !status.success() {
            return Err(L10nError::Extractor(format!(
                "{} exited with {}",
                exe.display(),
                status
            )));
        }
        Ok(())
    }
}

/// A prefix rewrite applied to group `original` paths, compensating for
/// extractors that record paths relative to their own working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    /// Parse a `FROM=TO` CLI argument.
    pub fn parse(arg: &str) -> Result<Self, String> {
        match arg.split_once('=') {
            Some((from, to)) if !from.is_empty() => Ok(Self {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => Err(format!("expected FROM=TO, got '{arg}'")),
        }
    }
}

/// Cleanup options for a freshly extracted reference document.
#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub rewrites: Vec<PathRewrite>,
    /// Drop leading `../` segments from group paths
    pub collapse_parent_refs: bool,
}

/// Normalize an extractor-produced reference document in place:
/// translations are stripped (the reference carries none) and group
/// paths are rewritten. Extractor metadata (`context-group`, Qt
/// `extracomment`, `xml:space` on sources) is already normalized away by
/// the parser and writer.
pub fn clean_extracted(doc: &mut XliffDocument, options: &CleanupOptions) {
    doc.strip_targets();

    for group in &mut doc.groups {
        for rewrite in &options.rewrites {
            if let Some(rest) = group.original.strip_prefix(&rewrite.from) {
                group.original = format!("{}{}", rewrite.to, rest);
            }
        }
        if options.collapse_parent_refs {
            while let Some(rest) = group.original.strip_prefix("../") {
                group.original = rest.to_string();
            }
        }
    }
}

/// Run the extractor and clean up its output file.
///
/// Returns the cleaned document; the output path holds the same content.
pub fn extract_reference(
    extractor: &dyn StringExtractor,
    input: &Path,
    output: &Path,
    options: &CleanupOptions,
) -> Result<XliffDocument, L10nError> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| L10nError::io(parent, e))?;
    }
    extractor.extract(input, output)?;

    let mut doc = XliffDocument::load(output)?;
    clean_extracted(&mut doc, options);
    writer::write_file(&doc, output)?;
    Ok(doc)
}

/// Strip targets from a reference file and sort it: groups by
/// `original`, units by `id`. Keeps diffs stable across extractor runs.
pub fn clean_reference(path: &Path) -> Result<(), L10nError> {
    let mut doc = XliffDocument::load(path)?;
    doc.strip_targets();
    doc.sort();
    writer::write_file(&doc, path)
}

/// Set the `target-language` of every group, in every XLIFF file under
/// `root`, unconditionally. Returns the number of files rewritten.
pub fn set_language_all(root: &Path, code: &str) -> Result<usize, L10nError> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "xliff")
        })
        .map(|e| e.into_path())
        .collect();
    if paths.is_empty() {
        return Err(L10nError::NoXliffFiles(root.to_path_buf()));
    }
    paths.sort();

    for path in &paths {
        let mut doc = XliffDocument::load(path)?;
        for group in &mut doc.groups {
            group.target_language = Some(code.to_string());
        }
        writer::write_file(&doc, path)?;
    }
    Ok(paths.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FileGroup, TransUnit};
    use std::fs;
    use tempfile::TempDir;

    /// Fake extractor that writes canned lconvert-style output.
    struct FixtureExtractor(&'static str);

    impl StringExtractor for FixtureExtractor {
        fn extract(&self, _input: &Path, output: &Path) -> Result<(), L10nError> {
            fs::write(output, self.0).map_err(|e| L10nError::io(output, e))
        }
    }

    const LCONVERT_OUTPUT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
  <file original="../../src/ui/main.ts" datatype="plaintext" source-language="en" target-language="en">
    <body>
      <trans-unit id="greeting">
        <source xml:space="preserve">Hello</source>
        <target></target>
        <extracomment>Shown on startup</extracomment>
        <context-group purpose="location"><context context-type="linenumber">12</context></context-group>
      </trans-unit>
    </body>
  </file>
  <file original="../generated/strings.cpp" datatype="plaintext" source-language="en">
    <body>
      <trans-unit id="brand">
        <source>App</source>
        <target>App</target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    #[test]
    fn test_extract_reference_cleans_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("en").join("app.xliff");

        let options = CleanupOptions {
            rewrites: vec![PathRewrite::parse("../../src/=../src/").unwrap()],
            collapse_parent_refs: false,
        };
        let doc = extract_reference(
            &FixtureExtractor(LCONVERT_OUTPUT),
            Path::new("app.ts"),
            &output,
            &options,
        )
        .unwrap();

        assert_eq!(doc.groups[0].original, "../src/ui/main.ts");
        // Reference carries no translations.
        assert!(doc.units().all(|(_, u)| u.target.is_none()));
        // extracomment became a note, context-group is gone.
        assert_eq!(doc.groups[0].units[0].notes, vec!["Shown on startup"]);

        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("extracomment"));
        assert!(!written.contains("context-group"));
        assert!(!written.contains("<target>"));
        // xml:space is not carried on <source>.
        assert!(!written.contains("<source xml:space"));
    }

    #[test]
    fn test_collapse_parent_refs() {
        let mut doc = XliffDocument::parse(LCONVERT_OUTPUT).unwrap();
        clean_extracted(
            &mut doc,
            &CleanupOptions {
                rewrites: Vec::new(),
                collapse_parent_refs: true,
            },
        );
        assert_eq!(doc.groups[0].original, "src/ui/main.ts");
        assert_eq!(doc.groups[1].original, "generated/strings.cpp");
    }

    #[test]
    fn test_path_rewrite_parse() {
        let rewrite = PathRewrite::parse("a/=b/").unwrap();
        assert_eq!(rewrite.from, "a/");
        assert_eq!(rewrite.to, "b/");
        assert!(PathRewrite::parse("no-separator").is_err());
        assert!(PathRewrite::parse("=to").is_err());
    }

    #[test]
    fn test_failing_extractor_propagates() {
        struct Failing;
        impl StringExtractor for Failing {
            fn extract(&self, _: &Path, _: &Path) -> Result<(), L10nError> {
                Err(L10nError::Extractor("boom".to_string()))
            }
        }

        let dir = TempDir::new().unwrap();
        let result = extract_reference(
            &Failing,
            Path::new("app.ts"),
            &dir.path().join("out.xliff"),
            &CleanupOptions::default(),
        );
        assert!(matches!(result, Err(L10nError::Extractor(_))));
    }

    #[test]
    fn test_clean_reference_strips_and_sorts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.xliff");

        let mut doc = XliffDocument::new();
        let mut b = FileGroup::new("b.ts");
        b.units.push(TransUnit::new("2", "two").with_target("deux"));
        b.units.push(TransUnit::new("1", "one"));
        doc.groups.push(b);
        doc.groups.push(FileGroup::new("a.ts"));
        writer::write_file(&doc, &path).unwrap();

        clean_reference(&path).unwrap();

        let cleaned = XliffDocument::load(&path).unwrap();
        assert_eq!(cleaned.groups[0].original, "a.ts");
        assert_eq!(cleaned.groups[1].units[0].id, "1");
        assert!(cleaned.units().all(|(_, u)| u.target.is_none()));
    }

    #[test]
    fn test_set_language_all() {
        let dir = TempDir::new().unwrap();
        for name in ["a.xliff", "sub/b.xliff"] {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            let mut doc = XliffDocument::new();
            doc.groups.push(FileGroup::new("x"));
            writer::write_file(&doc, &path).unwrap();
        }

        let count = set_language_all(dir.path(), "en-US").unwrap();
        assert_eq!(count, 2);

        let doc = XliffDocument::load(&dir.path().join("sub/b.xliff")).unwrap();
        assert_eq!(doc.groups[0].target_language.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_set_language_all_empty_tree_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(set_language_all(dir.path(), "en-US").is_err());
    }
}

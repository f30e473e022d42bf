//! XLIFF 1.2 document model and parser
//!
//! The document is an owned two-level tree: a document owns its file
//! groups, each group owns its translation units. No parent links; code
//! that needs the enclosing group gets it passed alongside the unit.

use crate::L10nError;
use roxmltree::Node;
use std::path::Path;

/// XLIFF 1.2 namespace
pub const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// xml: namespace, for `xml:space`
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// One translatable string occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
    /// String id, unique within its group
    pub id: String,
    /// Reference-language text
    pub source: String,
    /// Translated text, present only when a translation exists
    pub target: Option<String>,
    /// Translator notes (Qt `extracomment` elements are read as notes)
    pub notes: Vec<String>,
    /// Whether the unit carries `xml:space="preserve"`
    pub preserve_space: bool,
}

impl TransUnit {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: None,
            notes: Vec::new(),
            preserve_space: false,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// One `<file>` element: the strings extracted from a single original
/// source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    /// The `original` attribute, used as the group identifier
    pub original: String,
    /// The `source-language` attribute
    pub source_language: Option<String>,
    /// The `target-language` attribute
    pub target_language: Option<String>,
    /// The `datatype` attribute
    pub datatype: Option<String>,
    pub units: Vec<TransUnit>,
}

impl FileGroup {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            source_language: None,
            target_language: None,
            datatype: None,
            units: Vec::new(),
        }
    }
}

/// An in-memory XLIFF 1.2 document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XliffDocument {
    /// The root `version` attribute
    pub version: String,
    pub groups: Vec<FileGroup>,
}

impl Default for XliffDocument {
    fn default() -> Self {
        Self {
            version: "1.2".to_string(),
            groups: Vec::new(),
        }
    }
}

impl XliffDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XLIFF document from a string.
    ///
    /// Tolerant of extractor output: `extracomment` elements become
    /// notes, `context-group` elements are dropped, unknown elements and
    /// foreign namespaces are ignored. A unit without a `<source>` child
    /// is an error.
    pub fn parse(content: &str) -> Result<Self, L10nError> {
        let xml = roxmltree::Document::parse(content)
            .map_err(|e| L10nError::Parse(e.to_string()))?;

        let root = xml.root_element();
        if root.tag_name().name() != "xliff" {
            return Err(L10nError::Parse(format!(
                "expected <xliff> root, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut doc = XliffDocument {
            version: root.attribute("version").unwrap_or("1.2").to_string(),
            groups: Vec::new(),
        };

        for file_node in root.children().filter(|n| is_xliff(n, "file")) {
            doc.groups.push(parse_group(&file_node)?);
        }

        Ok(doc)
    }

    /// Parse an XLIFF document from a file path.
    pub fn load(path: &Path) -> Result<Self, L10nError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| L10nError::io(path, e))?;
        Self::parse(&content)
            .map_err(|e| e.with_path(path))
    }

    /// Iterate `(group original, unit)` over every unit in the document.
    pub fn units(&self) -> impl Iterator<Item = (&str, &TransUnit)> {
        self.groups
            .iter()
            .flat_map(|g| g.units.iter().map(|u| (g.original.as_str(), u)))
    }

    /// Total number of translation units.
    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(|g| g.units.len()).sum()
    }

    /// Remove every `target`, leaving an untranslated document.
    pub fn strip_targets(&mut self) {
        for group in &mut self.groups {
            for unit in &mut group.units {
                unit.target = None;
            }
        }
    }

    /// Sort groups by `original` and units by `id` within each group.
    pub fn sort(&mut self) {
        self.groups.sort_by(|a, b| a.original.cmp(&b.original));
        for group in &mut self.groups {
            group.units.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }
}

fn is_xliff(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && matches!(node.tag_name().namespace(), None | Some(XLIFF_NS))
}

fn parse_group(file_node: &Node<'_, '_>) -> Result<FileGroup, L10nError> {
    let mut group = FileGroup::new(file_node.attribute("original").unwrap_or(""));
    group.source_language = file_node.attribute("source-language").map(String::from);
    group.target_language = file_node.attribute("target-language").map(String::from);
    group.datatype = file_node.attribute("datatype").map(String::from);

    // Units live under <body>, but lenient parsing accepts them directly
    // under <file> as well.
    for child in file_node.children().filter(|n| n.is_element()) {
        if is_xliff(&child, "body") {
            for unit_node in child.children().filter(|n| is_xliff(n, "trans-unit")) {
                group.units.push(parse_unit(&unit_node)?);
            }
        } else if is_xliff(&child, "trans-unit") {
            group.units.push(parse_unit(&child)?);
        }
    }

    Ok(group)
}

fn parse_unit(unit_node: &Node<'_, '_>) -> Result<TransUnit, L10nError> {
    let id = unit_node.attribute("id").unwrap_or("").to_string();

    let mut source = None;
    let mut target = None;
    let mut notes = Vec::new();

    for child in unit_node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "source" => source = Some(child.text().unwrap_or("").to_string()),
            "target" => {
                // Empty targets count as untranslated.
                let text = child.text().unwrap_or("");
                if !text.is_empty() {
                    target = Some(text.to_string());
                }
            }
            // Qt's lconvert emits extracomment; normalize to note.
            "note" | "extracomment" => {
                if let Some(text) = child.text() {
                    notes.push(text.to_string());
                }
            }
            // context-group carries extractor metadata we do not keep.
            _ => {}
        }
    }

    let source = source.ok_or_else(|| {
        L10nError::Parse(format!("trans-unit '{id}' has no <source> element"))
    })?;

    Ok(TransUnit {
        id,
        source,
        target,
        notes,
        preserve_space: unit_node.attribute((XML_NS, "space")) == Some("preserve"),
    })
}

//! XLIFF output writer
//!
//! roxmltree is read-only, so serialization builds the output string
//! directly with explicit escaping. Unit children are always emitted in
//! source, target, note order.

use crate::document::{FileGroup, TransUnit, XliffDocument, XLIFF_NS};
use crate::L10nError;
use std::path::Path;

const INDENT: &str = "  ";

/// Serialize a document to XLIFF 1.2 text.
pub fn to_string(doc: &XliffDocument) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<xliff xmlns=\"{}\" version=\"{}\">\n",
        XLIFF_NS,
        escape_attr(&doc.version)
    ));

    for group in &doc.groups {
        write_group(&mut out, group);
    }

    out.push_str("</xliff>\n");
    out
}

/// Write a document to a file, replacing any previous content.
///
/// The content goes to a sibling temp file first and is renamed into
/// place, so an interrupted run never leaves a truncated XLIFF behind.
pub fn write_file(doc: &XliffDocument, path: &Path) -> Result<(), L10nError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| L10nError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("xliff.tmp");
    std::fs::write(&tmp_path, to_string(doc)).map_err(|e| L10nError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| L10nError::io(path, e))?;
    Ok(())
}

fn write_group(out: &mut String, group: &FileGroup) {
    out.push_str(INDENT);
    out.push_str("<file");
    push_attr(out, "original", Some(&group.original));
    push_attr(out, "datatype", group.datatype.as_deref());
    push_attr(out, "source-language", group.source_language.as_deref());
    push_attr(out, "target-language", group.target_language.as_deref());
    out.push_str(">\n");

    out.push_str(&INDENT.repeat(2));
    out.push_str("<body>\n");
    for unit in &group.units {
        write_unit(out, unit);
    }
    out.push_str(&INDENT.repeat(2));
    out.push_str("</body>\n");

    out.push_str(INDENT);
    out.push_str("</file>\n");
}

fn write_unit(out: &mut String, unit: &TransUnit) {
    out.push_str(&INDENT.repeat(3));
    out.push_str("<trans-unit");
    push_attr(out, "id", Some(&unit.id));
    if unit.preserve_space {
        push_attr(out, "xml:space", Some("preserve"));
    }
    out.push_str(">\n");

    out.push_str(&INDENT.repeat(4));
    out.push_str("<source>");
    out.push_str(&escape_text(&unit.source));
    out.push_str("</source>\n");

    if let Some(ref target) = unit.target {
        out.push_str(&INDENT.repeat(4));
        out.push_str("<target>");
        out.push_str(&escape_text(target));
        out.push_str("</target>\n");
    }

    for note in &unit.notes {
        out.push_str(&INDENT.repeat(4));
        out.push_str("<note>");
        out.push_str(&escape_text(note));
        out.push_str("</note>\n");
    }

    out.push_str(&INDENT.repeat(3));
    out.push_str("</trans-unit>\n");
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

/// Escape special characters in attribute values
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in text content
fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

//! Serialising an extracted (and possibly rewritten) document back into a `.docx`

use crate::document::model::{BlockFormat, ExtractedDocument};
use crate::document::package::DOCUMENT_PART;
use crate::error::{Result, TailorError};
use log::info;
use quick_xml::escape::escape;
use std::path::Path;

pub struct DocumentWriter;

impl DocumentWriter {
    /// Rebuild `word/document.xml`. Blocks that were not rewritten are emitted
    /// exactly as they were read, so an untouched document reproduces its source.
    pub fn render_xml(document: &ExtractedDocument) -> String {
        let mut xml = String::with_capacity(document.prologue.len() + document.epilogue.len() + 4096);
        xml.push_str(&document.prologue);
        for block in document.blocks() {
            xml.push_str(&block.xml());
        }
        xml.push_str(&document.epilogue);
        xml
    }

    /// Write `document` as a new package at `output`. The source template is never touched.
    pub fn write(document: &ExtractedDocument, output: &Path) -> Result<()> {
        if is_same_file(document.source(), output) {
            return Err(TailorError::InvalidInput(format!(
                "Output path '{}' is the template itself; choose another path",
                output.display()
            )));
        }
        if output.is_dir() {
            return Err(TailorError::Write(format!("'{}' is a directory", output.display())));
        }

        let xml = Self::render_xml(document);
        // A broken body must never reach disk
        roxmltree::Document::parse(&xml)
            .map_err(|e| TailorError::Write(format!("Rendered document XML is invalid: {}", e)))?;

        document
            .package()
            .write_to(output, &[(DOCUMENT_PART, xml.as_bytes())])?;

        info!("Wrote {}", output.display());
        Ok(())
    }
}

/// A paragraph carrying `text` with the given paragraph and run properties.
/// A captured label keeps its own run when the new text still starts with it.
pub(crate) fn render_paragraph(format: &BlockFormat, text: &str) -> String {
    let p = if format.prefix.is_empty() {
        String::new()
    } else {
        format!("{}:", format.prefix)
    };

    let mut xml = format!("<{p}p>", p = p);
    if let Some(ppr) = &format.paragraph_props {
        xml.push_str(ppr);
    }

    let labelled = format
        .label
        .as_ref()
        .and_then(|label| text.strip_prefix(label.text.as_str()).map(|rest| (label, rest)));
    match labelled {
        Some((label, rest)) => {
            push_run(&mut xml, &p, format.run_props.as_deref(), &label.text);
            push_run(&mut xml, &p, label.tail_props.as_deref(), rest);
        }
        None => push_run(&mut xml, &p, format.run_props.as_deref(), text),
    }

    xml.push_str(&format!("</{p}p>", p = p));
    xml
}

/// One run; tabs and line breaks become their own elements between text segments.
fn push_run(xml: &mut String, p: &str, run_props: Option<&str>, text: &str) {
    if text.is_empty() {
        return;
    }

    xml.push_str(&format!("<{p}r>", p = p));
    if let Some(rpr) = run_props {
        xml.push_str(rpr);
    }
    let mut segment = String::new();
    for c in text.chars() {
        let element = match c {
            '\t' => "tab",
            '\n' => "br",
            _ => {
                segment.push(c);
                continue;
            }
        };
        push_text(xml, p, &segment);
        segment.clear();
        xml.push_str(&format!("<{p}{element}/>", p = p, element = element));
    }
    push_text(xml, p, &segment);
    xml.push_str(&format!("</{p}r>", p = p));
}

fn push_text(xml: &mut String, p: &str, segment: &str) {
    if !segment.is_empty() {
        xml.push_str(&format!(
            "<{p}t xml:space=\"preserve\">{text}</{p}t>",
            p = p,
            text = escape(segment)
        ));
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

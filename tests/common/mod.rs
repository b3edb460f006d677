//! Shared fixtures: an in-memory .docx builder and a scripted generation service

#![allow(dead_code)]

use cv_tailor::error::{Result, TailorError};
use cv_tailor::llm::client::{GenerationRequest, TextGenerator};
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Builds a minimal Word package paragraph by paragraph.
#[derive(Default)]
pub struct DocxBuilder {
    body: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(self, text: &str) -> Self {
        self.styled("Heading1", text)
    }

    pub fn subheading(self, text: &str) -> Self {
        self.styled("Heading2", text)
    }

    pub fn para(mut self, text: &str) -> Self {
        self.body.push(format!(
            r#"<w:p><w:r><w:rPr><w:sz w:val="22"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ));
        self
    }

    pub fn bullet(self, text: &str) -> Self {
        self.styled("ListBullet", text)
    }

    pub fn blank(mut self) -> Self {
        self.body.push("<w:p/>".to_string());
        self
    }

    pub fn table(mut self, text: &str) -> Self {
        self.body.push(format!(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
            escape(text)
        ));
        self
    }

    fn styled(mut self, style: &str, text: &str) -> Self {
        self.body.push(format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            style,
            escape(text)
        ));
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                "<w:body>{}",
                r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#,
                "</w:body></w:document>"
            ),
            self.body.concat()
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let document = self.document_xml();
        for (name, data) in [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// The CV used across the end-to-end tests.
pub fn sample_cv() -> DocxBuilder {
    DocxBuilder::new()
        .para("Jane Doe")
        .para("jane.doe@example.com | +44 7700 900123 | linkedin.com/in/janedoe")
        .blank()
        .heading("Summary")
        .para("Generalist engineer.")
        .heading("Skills")
        .bullet("Python")
        .bullet("SQL")
        .bullet("Docker")
        .heading("Experience")
        .bullet("Built data pipelines")
        .bullet("Ran Docker workloads in production")
        .heading("Education")
        .para("BSc Computer Science")
}

pub fn sample_cover_letter() -> DocxBuilder {
    DocxBuilder::new()
        .para("Jane Doe")
        .para("jane.doe@example.com")
        .blank()
        .para("Dear Hiring Manager,")
        .blank()
        .para("I am writing to apply for the engineering role advertised on your website.")
        .blank()
        .para("I have built data pipelines and enjoy learning new tools every single week.")
        .blank()
        .para("Kind regards,")
        .para("Jane Doe")
}

/// Word document XML of a package on disk.
pub fn read_document_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut part, &mut xml).unwrap();
    xml
}

/// Generation service that replays queued replies and counts calls.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a transient error.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

pub fn transient(message: &str) -> TailorError {
    TailorError::Service {
        message: message.to_string(),
        transient: true,
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transient("service unavailable")))
    }
}

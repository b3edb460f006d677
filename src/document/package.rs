//! In-memory copy of a `.docx` package
//!
//! The template is read once into memory and the file handle is dropped, so a
//! run never holds the template open. Writing produces a brand-new package in
//! which every part except the replaced ones is copied byte for byte.

use crate::error::{Result, TailorError};
use log::debug;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    modified: DateTime,
    is_dir: bool,
}

#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TailorError::UnreadableDocument(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            TailorError::UnreadableDocument(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        Self::from_bytes(&bytes).map_err(|e| match e {
            TailorError::UnreadableDocument(msg) => {
                TailorError::UnreadableDocument(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(|e| {
                TailorError::UnreadableDocument(format!("Corrupt package entry '{}': {}", file.name(), e))
            })?;

            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                modified: file.last_modified(),
                is_dir: file.is_dir(),
            });
        }

        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(TailorError::UnreadableDocument(format!(
                "not a Word document: missing {}",
                DOCUMENT_PART
            )));
        }

        debug!("Loaded package with {} entries", package.entries.len());
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    pub fn document_xml(&self) -> Result<String> {
        let data = self
            .part(DOCUMENT_PART)
            .ok_or_else(|| TailorError::UnreadableDocument(format!("missing {}", DOCUMENT_PART)))?;

        String::from_utf8(data.to_vec())
            .map_err(|e| TailorError::UnreadableDocument(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Serialise the package, swapping in `replacements` for the named parts.
    pub fn to_bytes_with(&self, replacements: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let write_err = |e: zip::result::ZipError| TailorError::Write(format!("Failed to build package: {}", e));

        for entry in &self.entries {
            let compression = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default()
                .compression_method(compression)
                .last_modified_time(entry.modified);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options).map_err(write_err)?;
                continue;
            }

            let data = replacements
                .iter()
                .find(|(name, _)| *name == entry.name)
                .map(|(_, data)| *data)
                .unwrap_or(entry.data.as_slice());

            zip.start_file(entry.name.as_str(), options).map_err(write_err)?;
            zip.write_all(data)
                .map_err(|e| TailorError::Write(format!("Failed to write '{}': {}", entry.name, e)))?;
        }

        let cursor = zip.finish().map_err(write_err)?;
        Ok(cursor.into_inner())
    }

    /// Write a new package to `output` through a temporary file in the same directory.
    pub fn write_to(&self, output: &Path, replacements: &[(&str, &[u8])]) -> Result<()> {
        let bytes = self.to_bytes_with(replacements)?;
        write_atomically(output, &bytes)
    }
}

pub(crate) fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };

    std::fs::create_dir_all(&parent)
        .map_err(|e| TailorError::Write(format!("Cannot create '{}': {}", parent.display(), e)))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)
        .map_err(|e| TailorError::Write(format!("Cannot write to '{}': {}", parent.display(), e)))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| TailorError::Write(format!("Failed writing '{}': {}", output.display(), e)))?;
    tmp.persist(output)
        .map_err(|e| TailorError::Write(format!("Failed to save '{}': {}", output.display(), e.error)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        zip.start_file("word/media/image1.png", options.compression_method(CompressionMethod::Stored))
            .unwrap();
        zip.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = DocxPackage::from_bytes(b"plain text, not a package");
        assert!(matches!(result, Err(TailorError::UnreadableDocument(_))));
    }

    #[test]
    fn test_rejects_zip_without_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("hello.txt", FileOptions::default()).unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let result = DocxPackage::from_bytes(&bytes);
        assert!(matches!(result, Err(TailorError::UnreadableDocument(_))));
    }

    #[test]
    fn test_replacement_keeps_other_parts() {
        let package = DocxPackage::from_bytes(&sample_package()).unwrap();
        let rebuilt = package
            .to_bytes_with(&[(DOCUMENT_PART, b"<w:document><w:body/></w:document>".as_slice())])
            .unwrap();
        let reread = DocxPackage::from_bytes(&rebuilt).unwrap();

        assert_eq!(reread.document_xml().unwrap(), "<w:document><w:body/></w:document>");
        assert_eq!(reread.part("word/media/image1.png").unwrap(), &[0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(
            reread.part_names().collect::<Vec<_>>(),
            vec!["[Content_Types].xml", DOCUMENT_PART, "word/media/image1.png"]
        );
    }

    #[test]
    fn test_open_missing_file() {
        let result = DocxPackage::open(Path::new("does/not/exist.docx"));
        assert!(matches!(result, Err(TailorError::UnreadableDocument(_))));
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b").join("out.docx");
        let package = DocxPackage::from_bytes(&sample_package()).unwrap();

        package.write_to(&out, &[]).unwrap();
        assert!(DocxPackage::open(&out).is_ok());
    }
}

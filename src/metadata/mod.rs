//! Author/title extraction for the supported document formats.

mod archive;
mod filename;
mod pdf;
mod txt;
mod xml;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractError;

pub use filename::guess_from_filename;

/// PDFs are parsed in memory; anything larger is left as `NoMetadata`.
const PDF_MAX_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Epub,
    Txt,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [Self::Pdf, Self::Docx, Self::Epub, Self::Txt];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "epub" => Some(Self::Epub),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Epub => "EPUB",
            Self::Txt => "TXT",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub author: Option<String>,
    pub title: Option<String>,
}

impl Metadata {
    pub fn new(author: Option<&str>, title: Option<&str>) -> Self {
        Self {
            author: author.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    /// True when neither field carries any visible text.
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.author) && blank(&self.title)
    }
}

/// Source of author/title metadata for a single file.
///
/// `Ok(None)` means the file was readable but carried nothing usable
/// (including corrupt or unsupported internals). `Err` is reserved for
/// hard I/O failures.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<Option<Metadata>, ExtractError>;
}

/// Reads metadata embedded in the documents themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatExtractor;

impl MetadataExtractor for FormatExtractor {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<Option<Metadata>, ExtractError> {
        let io_err = |source| ExtractError::Io { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(io_err)?;

        let meta = match kind {
            DocumentKind::Pdf => read_pdf(file).map_err(io_err)?.and_then(|bytes| pdf::parse(&bytes)),
            DocumentKind::Docx => archive::docx(BufReader::new(file)),
            DocumentKind::Epub => archive::epub(BufReader::new(file)),
            DocumentKind::Txt => {
                let mut head = Vec::with_capacity(txt::HEADER_BYTES);
                file.take(txt::HEADER_BYTES as u64).read_to_end(&mut head).map_err(io_err)?;
                txt::parse(&String::from_utf8_lossy(&head))
            }
        };

        debug!(path = %path.display(), %kind, found = meta.is_some(), "extracted metadata");
        Ok(meta)
    }
}

fn read_pdf(mut file: File) -> std::io::Result<Option<Vec<u8>>> {
    let len = file.metadata()?.len();
    if len > PDF_MAX_BYTES {
        debug!(len, "PDF too large to parse");
        return Ok(None);
    }
    let mut bytes = Vec::with_capacity(len as usize);
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

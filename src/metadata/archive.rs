//! Zip-packaged formats: DOCX core properties and EPUB package documents.

use std::io::{Read, Seek};

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::{Metadata, xml};

const CORE_PROPERTIES: &str = "docProps/core.xml";
const EPUB_CONTAINER: &str = "META-INF/container.xml";

/// Entries larger than this are not metadata and are not read.
const MAX_ENTRY_BYTES: u64 = 4 * 1024 * 1024;

pub fn docx<R: Read + Seek>(reader: R) -> Option<Metadata> {
    let mut archive = open(reader)?;
    let core = read_entry(&mut archive, CORE_PROPERTIES)?;
    let core = xml::parse(&core)?;
    let meta = Metadata {
        author: xml::first_element_text(&core, "creator"),
        title: xml::first_element_text(&core, "title"),
    };
    (!meta.is_empty()).then_some(meta)
}

pub fn epub<R: Read + Seek>(reader: R) -> Option<Metadata> {
    let mut archive = open(reader)?;
    let opf_path = read_entry(&mut archive, EPUB_CONTAINER)
        .and_then(|container| {
            let container = xml::parse(&container)?;
            xml::attribute(&container, "rootfile", "full-path")
        })
        .or_else(|| first_opf(&mut archive))?;
    let opf = read_entry(&mut archive, &opf_path)?;
    let opf = xml::parse(&opf)?;

    let creators = xml::element_texts(&opf, "creator");
    let meta = Metadata {
        author: (!creators.is_empty()).then(|| creators.join("; ")),
        title: xml::first_element_text(&opf, "title"),
    };
    (!meta.is_empty()).then_some(meta)
}

fn open<R: Read + Seek>(reader: R) -> Option<ZipArchive<R>> {
    match ZipArchive::new(reader) {
        Ok(archive) => Some(archive),
        Err(e) => {
            debug!(error = %e, "not a readable zip archive");
            None
        }
    }
}

fn first_opf<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    (0..archive.len()).find_map(|index| {
        let entry = archive.by_index(index).ok()?;
        entry.name().ends_with(".opf").then(|| entry.name().to_string())
    })
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return None,
        Err(e) => {
            debug!(entry = name, error = %e, "failed to open archive entry");
            return None;
        }
    };

    let mut bytes = Vec::new();
    if let Err(e) = entry.take(MAX_ENTRY_BYTES).read_to_end(&mut bytes) {
        debug!(entry = name, error = %e, "failed to read archive entry");
        return None;
    }
    Some(xml::decode_bytes(&bytes))
}

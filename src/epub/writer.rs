//! Zip serialization of an [`Archive`] and the staged write to disk.
//!
//! The `mimetype` entry is stored uncompressed; everything else is deflated.

use std::io::{Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::archive::{Archive, MIMETYPE_PATH};
use crate::error::{Error, Result};

/// Deflate level used when none is configured.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Reject output paths that do not end in `.epub` (any case).
pub fn check_output_path(path: &Path) -> Result<()> {
    let is_epub = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"));
    if is_epub {
        Ok(())
    } else {
        Err(Error::config(format!(
            "output path must end in .epub: {}",
            path.display()
        )))
    }
}

/// Write an [`Archive`] as a zip to any [`Write`] + [`Seek`] destination.
///
/// `mimetype` is stored uncompressed; everything else is deflated at
/// `level` (or [`DEFAULT_COMPRESSION_LEVEL`]).
pub fn write_archive<W: Write + Seek>(archive: &Archive, writer: W, level: Option<i64>) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)));

    for entry in archive.entries() {
        let options = if entry.path == MIMETYPE_PATH {
            stored
        } else {
            deflated
        };
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }

    Ok(zip.finish()?)
}

/// Write an [`Archive`] to `path`.
///
/// The zip is written to a staging file in the destination directory, synced,
/// then renamed over `path`. If any of that fails the staging file is left in
/// place and its location is reported in [`Error::Packaging`].
pub fn write_epub(archive: &Archive, path: &Path, level: Option<i64>) -> Result<()> {
    check_output_path(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".bindery-")
        .suffix(".epub.part")
        .tempfile_in(dir)?;

    let written = write_archive(archive, staging.as_file_mut(), level)
        .and_then(|file| Ok(file.sync_all()?));
    if let Err(e) = written {
        return Err(keep_staging(staging, e));
    }

    match staging.persist(path) {
        Ok(_) => {
            info!(path = %path.display(), entries = archive.len(), "wrote epub");
            Ok(())
        }
        Err(e) => Err(keep_staging(e.file, e.error.into())),
    }
}

fn keep_staging(staging: NamedTempFile, source: Error) -> Error {
    let fallback = staging.path().to_path_buf();
    let staging = staging.keep().map(|(_, path)| path).unwrap_or(fallback);
    warn!(staging = %staging.display(), error = %source, "packaging failed, staging file kept");
    Error::Packaging {
        staging,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;

    fn sample() -> Archive {
        let mut archive = Archive::new();
        archive
            .add("META-INF/container.xml", CONTAINER_XML.as_bytes().to_vec())
            .unwrap();
        archive
            .add("OEBPS/content.opf", b"<package/>".to_vec())
            .unwrap();
        archive
    }

    #[test]
    fn test_output_extension() {
        assert!(check_output_path(Path::new("out/book.epub")).is_ok());
        assert!(check_output_path(Path::new("BOOK.EPUB")).is_ok());
        assert!(matches!(
            check_output_path(Path::new("book.zip")),
            Err(Error::Configuration(_))
        ));
        assert!(check_output_path(Path::new("epub")).is_err());
    }

    #[test]
    fn test_mimetype_stored_first() {
        let cursor = write_archive(&sample(), Cursor::new(Vec::new()), None).unwrap();
        let mut zip = ZipArchive::new(cursor).unwrap();

        let mut first = zip.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        let mut body = String::new();
        first.read_to_string(&mut body).unwrap();
        assert_eq!(body, "application/epub+zip");
        drop(first);

        let opf = zip.by_name("OEBPS/content.opf").unwrap();
        assert_eq!(opf.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_write_epub_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("book.epub");
        std::fs::write(&out, b"old").unwrap();

        write_epub(&sample(), &out, Some(9)).unwrap();

        let zip = ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(zip.len(), 3);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "book.epub")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_wrong_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_epub(&sample(), &dir.path().join("book.zip"), None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_rename_keeps_staging() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the destination makes the rename fail
        let out = dir.path().join("taken.epub");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("inside"), b"x").unwrap();

        let err = write_epub(&sample(), &out, None).unwrap_err();
        let Error::Packaging { staging, .. } = err else {
            panic!("expected packaging error, got {err:?}");
        };
        assert!(staging.exists());
        assert_eq!(staging.parent(), Some(dir.path()));
    }
}

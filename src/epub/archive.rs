//! In-memory package contents, kept in archive order.

use std::collections::HashSet;

use crate::error::{Error, Result};

pub const MIMETYPE_PATH: &str = "mimetype";
pub const MIMETYPE: &[u8] = b"application/epub+zip";

/// One file in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Ordered path → bytes entries making up an EPUB package.
///
/// `mimetype` is always the first entry. Entries are written to the zip in
/// the order they were added.
#[derive(Debug, Clone)]
pub struct Archive {
    entries: Vec<Entry>,
    paths: HashSet<String>,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Archive {
    pub fn new() -> Self {
        let mut paths = HashSet::new();
        paths.insert(MIMETYPE_PATH.to_string());
        Self {
            entries: vec![Entry {
                path: MIMETYPE_PATH.to_string(),
                data: MIMETYPE.to_vec(),
            }],
            paths,
        }
    }

    /// Append an entry. Fails if `path` is already present.
    pub fn add(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        if !self.paths.insert(path.clone()) {
            return Err(Error::DuplicateEntry(path));
        }
        self.entries.push(Entry {
            path,
            data: data.into(),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.data.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a package holds at least its `mimetype`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mimetype_first() {
        let mut archive = Archive::new();
        archive.add("OEBPS/a.xhtml", b"a".to_vec()).unwrap();
        let paths: Vec<_> = archive.paths().collect();
        assert_eq!(paths, ["mimetype", "OEBPS/a.xhtml"]);
        assert_eq!(archive.get("mimetype"), Some(MIMETYPE));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut archive = Archive::new();
        archive.add("OEBPS/a.xhtml", b"a".to_vec()).unwrap();
        let err = archive.add("OEBPS/a.xhtml", b"b".to_vec()).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry(ref p) if p == "OEBPS/a.xhtml"));
        assert!(archive.add("mimetype", b"x".to_vec()).is_err());
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.get("OEBPS/a.xhtml"), Some(&b"a"[..]));
    }
}

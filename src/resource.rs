//! Loading source images and other binary resources.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// Reads the bytes behind a resource reference (an `<img src>` or cover path).
pub trait ResourceLoader: Send {
    fn load(&self, reference: &str) -> io::Result<Vec<u8>>;
}

/// Loads resources from the filesystem.
///
/// Relative references resolve against `root` when one is set, otherwise
/// against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, reference: &str) -> io::Result<Vec<u8>> {
        let reference = reference.strip_prefix("file://").unwrap_or(reference);
        std::fs::read(self.resolve(reference))
    }
}

/// Serves resources from memory, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.resources.insert(reference.into(), data.into());
    }

    pub fn with(mut self, reference: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(reference, data);
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, reference: &str) -> io::Result<Vec<u8>> {
        self.resources.get(reference).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no resource named {reference}"))
        })
    }
}

/// Load `reference`, percent-decoding it first (`my%20pic.png` → `my pic.png`).
pub(crate) fn load_reference(loader: &dyn ResourceLoader, reference: &str) -> Result<Vec<u8>> {
    let decoded = percent_decode_str(reference).decode_utf8_lossy();
    loader
        .load(&decoded)
        .map_err(|e| Error::resource(reference, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new().with("a.png", b"png".to_vec());
        assert_eq!(loader.load("a.png").unwrap(), b"png");
        assert_eq!(
            loader.load("b.png").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_load_reference_decodes() {
        let loader = MemoryLoader::new().with("my pic.png", b"x".to_vec());
        assert_eq!(load_reference(&loader, "my%20pic.png").unwrap(), b"x");
    }

    #[test]
    fn test_missing_reference_is_resource_error() {
        let loader = MemoryLoader::new();
        let err = load_reference(&loader, "gone.png").unwrap_err();
        assert!(matches!(err, Error::Resource { ref reference, .. } if reference == "gone.png"));
    }

    #[test]
    fn test_fs_loader_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"data").unwrap();
        let loader = FsLoader::with_root(dir.path());
        assert_eq!(loader.load("pic.png").unwrap(), b"data");
        assert!(FsLoader::new().load("definitely/not/here.png").is_err());
    }
}

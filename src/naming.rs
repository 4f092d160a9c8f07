//! Book identifiers, section file names and random slugs.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicode_normalization::UnicodeNormalization;
use uuid::Builder;

use crate::book::ContentItem;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Length of the random stem used for untitled sections.
pub const SECTION_SLUG_LEN: usize = 5;
/// Length of the random stem given to every extracted image.
pub const IMAGE_SLUG_LEN: usize = 6;

/// Source of randomness for identifiers and slugs.
///
/// Composition draws every random name from one `NameSource`, so a seeded
/// source makes a whole book reproducible.
pub trait NameSource: Send {
    /// A random version 4 UUID, hyphenated and lowercase.
    fn uuid(&mut self) -> String;

    /// A random lowercase ASCII string of exactly `len` letters.
    fn slug(&mut self, len: usize) -> String;
}

/// [`NameSource`] backed by a standard RNG.
pub struct RandomNames {
    rng: StdRng,
}

impl RandomNames {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic names for tests and reproducible builds.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomNames {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSource for RandomNames {
    fn uuid(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.random();
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }

    fn slug(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Hands out names that are unique for the lifetime of one composition.
pub struct Namer {
    source: Box<dyn NameSource>,
    issued: HashSet<String>,
}

impl Namer {
    pub fn new(source: Box<dyn NameSource>) -> Self {
        Self {
            source,
            issued: HashSet::new(),
        }
    }

    /// Book identifier in URN form, shared by the OPF and NCX documents.
    pub fn book_uid(&mut self) -> String {
        format!("urn:uuid:{}", self.source.uuid())
    }

    /// A random slug never returned before by this namer.
    pub fn unique_slug(&mut self, len: usize) -> String {
        loop {
            let slug = self.source.slug(len);
            if self.issued.insert(slug.clone()) {
                return slug;
            }
        }
    }

    /// File stem for the section at `index`: `i_<index>_<slug>`.
    pub fn section_file_name(&mut self, index: usize, item: &ContentItem) -> String {
        let slug = item
            .title
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.unique_slug(SECTION_SLUG_LEN));
        format!("i_{index}_{slug}")
    }
}

/// Turn a title into a file-name-safe slug.
///
/// Lowercases, maps whitespace to `_`, strips diacritics and drops anything
/// that is not an ASCII letter, digit, `_` or `-`.
///
/// ```
/// use bindery::naming::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter_one");
/// assert_eq!(slugify("Édition Spéciale"), "edition_speciale");
/// assert_eq!(slugify("What's next?"), "whats_next");
/// ```
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfd()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

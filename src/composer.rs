//! End-to-end composition of a book into an EPUB package.

use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use crate::book::BookOptions;
use crate::epub::{self, Archive, Package};
use crate::error::Result;
use crate::media::{HeaderProbe, ImageProbe};
use crate::naming::{NameSource, Namer, RandomNames};
use crate::render::{self, RenderedSection};
use crate::resource::{FsLoader, ResourceLoader};

/// Knobs for package output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Deflate level for every entry except `mimetype`.
    pub compression_level: Option<i64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(epub::writer::DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

/// Builds one EPUB from a [`BookOptions`].
///
/// A composer is consumed by [`compose`](Self::compose) or
/// [`assemble`](Self::assemble), so each instance produces exactly one package.
///
/// # Example
///
/// ```no_run
/// use bindery::{BookOptions, ContentItem, EpubComposer};
///
/// let options = BookOptions::new("My Book", "Me")
///     .with_item(ContentItem::new("<p>Hello</p>").with_title("Chapter 1"));
/// EpubComposer::new(options)?.compose("my-book.epub")?;
/// # Ok::<(), bindery::Error>(())
/// ```
pub struct EpubComposer {
    options: BookOptions,
    loader: Box<dyn ResourceLoader>,
    probe: Box<dyn ImageProbe>,
    names: Box<dyn NameSource>,
    timestamp: Option<DateTime<Utc>>,
    config: ComposerConfig,
}

impl EpubComposer {
    /// Validate `options` and create a composer with filesystem loading,
    /// header-based image probing and OS-seeded random names.
    pub fn new(options: BookOptions) -> Result<Self> {
        options.validate()?;
        debug!(title = %options.title, items = options.items().len(), "book options validated");
        Ok(Self {
            options,
            loader: Box::new(FsLoader::new()),
            probe: Box::new(HeaderProbe),
            names: Box::new(RandomNames::new()),
            timestamp: None,
            config: ComposerConfig::default(),
        })
    }

    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_probe(mut self, probe: impl ImageProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_names(mut self, names: impl NameSource + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    /// Fix the composition time instead of reading the clock.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    /// Compose the book and write it to `path`.
    ///
    /// The extension is checked before anything is loaded. The package is
    /// staged next to `path` and renamed into place once complete.
    pub fn compose(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        epub::check_output_path(path)?;
        let level = self.config.compression_level;
        let archive = self.assemble()?;
        epub::write_epub(&archive, path, level)
    }

    /// Run the pipeline and return the package contents without writing them.
    pub fn assemble(self) -> Result<Archive> {
        let EpubComposer {
            options,
            loader,
            probe,
            names,
            timestamp,
            config: _,
        } = self;
        let timestamp = timestamp.unwrap_or_else(Utc::now).trunc_subsecs(0);
        let language = options.language();
        let mut namer = Namer::new(names);
        let uid = namer.book_uid();

        let cover = options
            .cover
            .as_ref()
            .map(|cover| render::build_cover_page(cover, language, loader.as_ref(), probe.as_ref()))
            .transpose()?;
        let credit = render::build_credit_page(language, timestamp)?;

        let sections = options
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                render::render_section(index, item, language, &mut namer, loader.as_ref())
            })
            .collect::<Result<Vec<RenderedSection>>>()?;

        let page_count = render::estimate_pages(&sections, cover.is_some());
        let package = Package {
            options: &options,
            uid: &uid,
            timestamp,
            sections: &sections,
            cover: cover.as_ref(),
            credit: &credit,
            page_count,
        };
        let archive = epub::build_archive(&package)?;

        info!(
            title = %options.title,
            sections = sections.len(),
            images = sections.iter().map(|s| s.images.len()).sum::<usize>(),
            pages = page_count,
            "assembled package"
        );
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::book::{ContentItem, CoverOptions};
    use crate::error::Error;
    use crate::resource::MemoryLoader;

    fn text(archive: &Archive, path: &str) -> String {
        String::from_utf8(archive.get(path).unwrap().to_vec()).unwrap()
    }

    fn composer(options: BookOptions) -> EpubComposer {
        EpubComposer::new(options)
            .unwrap()
            .with_loader(MemoryLoader::new())
            .with_names(RandomNames::seeded(7))
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn test_new_validates() {
        let err = EpubComposer::new(BookOptions::new("", "A")).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_assemble_single_chapter() {
        let options =
            BookOptions::new("T", "A").with_item(ContentItem::new("<p>hello</p>").with_title("Ch1"));
        let archive = composer(options).assemble().unwrap();

        assert_eq!(archive.entries()[0].path, "mimetype");
        assert!(text(&archive, "OEBPS/sections/i_0_ch1.xhtml").contains("<h1>Ch1</h1>"));
        let opf = text(&archive, "OEBPS/content.opf");
        assert!(opf.contains("2025-01-02T03:04:05Z"));
        assert!(text(&archive, "OEBPS/sections/creditpage.xhtml").contains("January 2025"));
    }

    #[test]
    fn test_same_seed_same_uid() {
        let options = BookOptions::new("T", "A").with_item(ContentItem::new("<p>x</p>"));
        let a = composer(options.clone()).assemble().unwrap();
        let b = composer(options).assemble().unwrap();
        assert_eq!(a.get("OEBPS/toc.ncx"), b.get("OEBPS/toc.ncx"));
    }

    #[test]
    fn test_missing_cover_fails() {
        let options = BookOptions::new("T", "A").with_cover(CoverOptions::new("cover.png"));
        let err = composer(options).assemble().unwrap_err();
        assert!(matches!(err, Error::Resource { .. }));
    }

    #[test]
    fn test_bad_extension_checked_first() {
        let options = BookOptions::new("T", "A").with_cover(CoverOptions::new("missing.png"));
        let err = composer(options).compose("out.mobi").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

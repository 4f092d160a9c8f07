//! # bindery
//!
//! Compose EPUB 3 books from a title, an author and a list of HTML fragments.
//!
//! ## Features
//!
//! - One XHTML section per content item, with embedded images extracted and renamed
//! - Optional cover page that scales the cover image to the screen
//! - EPUB 3 navigation document plus a legacy NCX for older readers
//! - Sub-headings marked `data-ec-role="subtitle"` become nested TOC entries
//! - Packages are staged next to the destination and renamed into place
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindery::{BookOptions, ContentItem, CoverOptions, EpubComposer};
//!
//! let options = BookOptions::new("A Short Book", "Jane Doe")
//!     .with_cover(CoverOptions::new("art/cover.png"))
//!     .with_item(ContentItem::new("<p>Before we begin…</p>").with_title("Preface").before_toc())
//!     .with_item(ContentItem::new("<p>It was a dark and stormy night.</p>").with_title("Chapter 1"));
//!
//! EpubComposer::new(options)?.compose("short-book.epub")?;
//! # Ok::<(), bindery::Error>(())
//! ```
//!
//! ## Working in Memory
//!
//! Resources can be served from memory and the package inspected without
//! touching the filesystem:
//!
//! ```
//! use bindery::{BookOptions, ContentItem, EpubComposer, MemoryLoader, RandomNames};
//!
//! let options = BookOptions::new("T", "A")
//!     .with_item(ContentItem::new(r#"<p><img src="dot.svg"></p>"#).with_title("Ch1"));
//! let loader = MemoryLoader::new().with("dot.svg", br#"<svg width="1" height="1"/>"#.to_vec());
//!
//! let archive = EpubComposer::new(options)?
//!     .with_loader(loader)
//!     .with_names(RandomNames::seeded(1))
//!     .assemble()?;
//!
//! assert_eq!(archive.entries()[0].path, "mimetype");
//! assert!(archive.contains("OEBPS/sections/i_0_ch1.xhtml"));
//! # Ok::<(), bindery::Error>(())
//! ```

pub mod book;
pub mod composer;
pub mod dom;
pub mod epub;
pub mod error;
pub mod media;
pub mod naming;
pub mod render;
pub mod resource;
pub mod xml;

pub use book::{BookOptions, ContentItem, CoverOptions, TocOptions};
pub use composer::{ComposerConfig, EpubComposer};
pub use epub::Archive;
pub use error::{Error, Result};
pub use media::{HeaderProbe, ImageFormat, ImageProbe};
pub use naming::{NameSource, RandomNames};
pub use resource::{FsLoader, MemoryLoader, ResourceLoader};

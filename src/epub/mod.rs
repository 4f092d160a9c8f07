//! EPUB 3 package generation.
//!
//! A [`Package`] bundles everything rendered for one book. The submodules
//! turn it into the package document ([`opf`]), the two navigation documents
//! ([`nav`], [`ncx`]) and finally an ordered [`Archive`] that [`writer`]
//! zips to disk.

pub mod archive;
pub mod nav;
pub mod ncx;
pub mod opf;
pub mod writer;

pub use archive::{Archive, Entry};
pub use ncx::{NavMap, NavPoint};
pub use opf::{ManifestItem, SpinePlan, SpineSlot};
pub use writer::{check_output_path, write_archive, write_epub};

use chrono::{DateTime, Utc};

use crate::book::BookOptions;
use crate::error::Result;
use crate::render::{CoverPage, CreditPage, RenderedSection};

/// Directory inside the zip holding every publication resource.
pub const CONTENT_DIR: &str = "OEBPS";

pub const NCX_HREF: &str = "toc.ncx";
pub const NAV_HREF: &str = "toc.xhtml";
pub const OPF_HREF: &str = "content.opf";
pub const STYLESHEET_HREF: &str = "css/style.css";
pub const COVER_PAGE_HREF: &str = "sections/coverpage.xhtml";
pub const CREDIT_PAGE_HREF: &str = "sections/creditpage.xhtml";

/// Default stylesheet linked from every generated document.
pub const STYLESHEET: &str = include_str!("../../assets/style.css");

/// Everything rendered for one book, ready to be packaged.
#[derive(Debug, Clone, Copy)]
pub struct Package<'a> {
    pub options: &'a BookOptions,
    /// `urn:uuid:…` identifier shared by the OPF and NCX.
    pub uid: &'a str,
    /// Creation and modification time recorded in the metadata.
    pub timestamp: DateTime<Utc>,
    pub sections: &'a [RenderedSection],
    pub cover: Option<&'a CoverPage>,
    pub credit: &'a CreditPage,
    /// Estimated page count for the NCX header.
    pub page_count: usize,
}

fn content_path(href: &str) -> String {
    format!("{CONTENT_DIR}/{href}")
}

/// Lay out every document and image of `package` in archive order.
pub fn build_archive(package: &Package<'_>) -> Result<Archive> {
    let mut archive = Archive::new();
    archive.add("META-INF/container.xml", writer::CONTAINER_XML)?;
    archive.add(content_path(STYLESHEET_HREF), STYLESHEET)?;

    if let Some(cover) = package.cover {
        archive.add(content_path(COVER_PAGE_HREF), cover.document.clone())?;
    }
    archive.add(content_path(CREDIT_PAGE_HREF), package.credit.document.clone())?;
    for section in package.sections {
        archive.add(content_path(&section.href()), section.document.clone())?;
    }

    if let Some(cover) = package.cover {
        archive.add(content_path(&cover.image.href()), cover.image.data.clone())?;
    }
    let logo = &package.credit.logo;
    archive.add(content_path(&logo.href()), logo.data.clone())?;
    for image in package.sections.iter().flat_map(|s| &s.images) {
        archive.add(content_path(&image.href()), image.data.clone())?;
    }

    archive.add(content_path(OPF_HREF), opf::build_opf(package)?)?;
    archive.add(content_path(NAV_HREF), nav::build_nav(package)?)?;
    archive.add(content_path(NCX_HREF), ncx::build_ncx(package)?)?;
    Ok(archive)
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::test_support::{fixture, section};
    use super::*;

    #[test]
    fn test_archive_order() {
        let f = fixture(vec![section(0, "ch1", false), section(1, "ch2", false)], true);
        let archive = build_archive(&f.package()).unwrap();
        let paths: Vec<_> = archive.paths().collect();
        assert_eq!(
            paths,
            [
                "mimetype",
                "META-INF/container.xml",
                "OEBPS/css/style.css",
                "OEBPS/sections/coverpage.xhtml",
                "OEBPS/sections/creditpage.xhtml",
                "OEBPS/sections/i_0_ch1.xhtml",
                "OEBPS/sections/i_1_ch2.xhtml",
                "OEBPS/img/cover.png",
                "OEBPS/img/bindery_logo.svg",
                "OEBPS/img/pic000.png",
                "OEBPS/img/pic001.png",
                "OEBPS/content.opf",
                "OEBPS/toc.xhtml",
                "OEBPS/toc.ncx",
            ]
        );
    }

    #[test]
    fn test_manifest_resolves_to_entries() {
        let f = fixture(vec![section(0, "ch1", true), section(1, "ch2", false)], false);
        let package = f.package();
        let archive = build_archive(&package).unwrap();
        let mut seen = HashSet::new();
        for item in opf::manifest(&package) {
            assert!(seen.insert(item.href.clone()), "duplicate href {}", item.href);
            assert!(archive.contains(&content_path(&item.href)), "{} not packaged", item.href);
        }
    }

    #[test]
    fn test_duplicate_image_names_rejected() {
        let mut second = section(1, "ch2", false);
        second.images[0].name = "pic000.png".into();
        let f = fixture(vec![section(0, "ch1", false), second], false);
        assert!(build_archive(&f.package()).is_err());
    }
}

//! Rendering of the XHTML documents that make up the book's content.
//!
//! Each content item becomes a [`RenderedSection`], and the cover and credit
//! pages are produced by [`pages`]. Nothing here touches the archive: every
//! result is an in-memory document plus the binary assets it references.

pub mod estimate;
pub mod pages;
pub mod section;

pub use estimate::{WORDS_PER_PAGE, estimate_pages, section_pages};
pub use pages::{CoverPage, CreditPage, LOGO_NAME, build_cover_page, build_credit_page};
pub use section::{RenderedSection, SubHeading, render_section};

use crate::media::ImageFormat;
use crate::xml::{Document, Element, OPS_NS, XHTML_NS};

/// An image packaged under `OEBPS/img/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// File name inside `img/`, e.g. `qwerty.png`.
    pub name: String,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl ImageAsset {
    /// Path relative to the package root.
    pub fn href(&self) -> String {
        format!("img/{}", self.name)
    }

    /// Manifest id: the file name without its extension.
    pub fn id(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Shell shared by every generated XHTML page: doctype, namespaces, language
/// and a head with charset, title and stylesheet link.
pub(crate) fn xhtml_page(
    language: &str,
    title: &str,
    stylesheet: &str,
    extra_head: Vec<Element>,
    body: Element,
) -> Document {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(Element::with_text("title", title))
        .child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("type", "text/css")
                .attr("href", stylesheet),
        );
    for element in extra_head {
        head.push(element);
    }

    let html = Element::new("html")
        .attr("xmlns", XHTML_NS)
        .attr("xmlns:epub", OPS_NS)
        .attr("xml:lang", language)
        .attr("lang", language)
        .child(head)
        .child(body);

    Document::new(html).with_doctype("html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_asset_paths() {
        let asset = ImageAsset {
            name: "abcdef.jpeg".into(),
            format: ImageFormat::Jpeg,
            data: vec![],
        };
        assert_eq!(asset.href(), "img/abcdef.jpeg");
        assert_eq!(asset.id(), "abcdef");
        assert_eq!(asset.media_type(), "image/jpeg");
    }

    #[test]
    fn test_page_shell() {
        let doc = xhtml_page("fr", "", "css/style.css", vec![], Element::new("body"))
            .to_string()
            .unwrap();
        assert!(doc.contains("<!DOCTYPE html>"));
        assert!(doc.contains("xml:lang=\"fr\""));
        assert!(doc.contains("<meta charset=\"utf-8\"/>"));
        assert!(doc.contains("<title></title>"));
        assert!(doc.contains("<body/>"));
    }
}

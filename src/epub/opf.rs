//! The OPF package document: metadata, manifest, spine and guide.

use crate::error::Result;
use crate::render::RenderedSection;
use crate::xml::{Document, Element};

use super::{COVER_PAGE_HREF, CREDIT_PAGE_HREF, NCX_HREF, NAV_HREF, Package, STYLESHEET_HREF};

const OPF_NS: &str = "http://www.idpf.org/2007/opf";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const DCTERMS_NS: &str = "http://purl.org/dc/terms/";

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// One `<item>` of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Relative to `OEBPS/`.
    pub href: String,
    pub media_type: &'static str,
    pub properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: &'static str) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type,
            properties: None,
        }
    }

    fn with_properties(mut self, properties: &'static str) -> Self {
        self.properties = Some(properties);
        self
    }

    fn to_element(&self) -> Element {
        let mut item = Element::new("item")
            .attr("id", self.id.as_str())
            .attr("href", self.href.as_str())
            .attr("media-type", self.media_type);
        if let Some(properties) = self.properties {
            item.set_attr("properties", properties);
        }
        item
    }
}

/// Manifest items in package order.
pub fn manifest(package: &Package<'_>) -> Vec<ManifestItem> {
    let mut items = Vec::new();

    if package.cover.is_some() {
        items.push(
            ManifestItem::new("coverpage", COVER_PAGE_HREF, XHTML_MEDIA_TYPE).with_properties("svg"),
        );
    }
    items.push(ManifestItem::new("ncx", NCX_HREF, "application/x-dtbncx+xml"));
    items.push(ManifestItem::new("toc", NAV_HREF, XHTML_MEDIA_TYPE).with_properties("nav"));
    items.push(ManifestItem::new("css", STYLESHEET_HREF, "text/css"));

    for section in package.sections {
        let mut item = ManifestItem::new(section.id.as_str(), section.href(), XHTML_MEDIA_TYPE);
        if section.has_svg {
            item = item.with_properties("svg");
        }
        items.push(item);
        for image in &section.images {
            items.push(ManifestItem::new(image.id(), image.href(), image.media_type()));
        }
    }

    if let Some(cover) = package.cover {
        items.push(
            ManifestItem::new(cover.image.id(), cover.image.href(), cover.image.media_type())
                .with_properties("cover-image"),
        );
    }

    let logo = &package.credit.logo;
    items.push(ManifestItem::new(logo.id(), logo.href(), logo.media_type()));
    items.push(ManifestItem::new("creditpage", CREDIT_PAGE_HREF, XHTML_MEDIA_TYPE));

    items
}

/// Kinds of spine entries, in the order [`SpinePlan::slots`] lays them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpineSlot {
    CoverPage,
    CreditPage,
    /// Every section flagged `before_toc`, in original order.
    BeforeToc,
    Toc,
    /// Every other section, in original order.
    Sections,
}

/// The facts spine placement depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinePlan {
    pub has_cover: bool,
    pub toc_in_spine: bool,
}

impl SpinePlan {
    /// Slot order for this book.
    ///
    /// The cover page leads. The credit page follows the cover, or the TOC
    /// when there is no cover, or leads the spine when there is neither.
    pub fn slots(&self) -> Vec<SpineSlot> {
        use SpineSlot::*;
        match (self.has_cover, self.toc_in_spine) {
            (true, true) => vec![CoverPage, CreditPage, BeforeToc, Toc, Sections],
            (true, false) => vec![CoverPage, CreditPage, BeforeToc, Sections],
            (false, true) => vec![BeforeToc, Toc, CreditPage, Sections],
            (false, false) => vec![CreditPage, BeforeToc, Sections],
        }
    }

    /// Expand the slots into item-ref ids. `sections` yields `(id, before_toc)`
    /// pairs in original order.
    pub fn idrefs<'a>(&self, sections: impl IntoIterator<Item = (&'a str, bool)>) -> Vec<String> {
        let (before, after): (Vec<_>, Vec<_>) = sections.into_iter().partition(|(_, b)| *b);
        let mut refs = Vec::with_capacity(before.len() + after.len() + 3);
        for slot in self.slots() {
            match slot {
                SpineSlot::CoverPage => refs.push("coverpage".to_string()),
                SpineSlot::CreditPage => refs.push("creditpage".to_string()),
                SpineSlot::Toc => refs.push("toc".to_string()),
                SpineSlot::BeforeToc => refs.extend(before.iter().map(|(id, _)| id.to_string())),
                SpineSlot::Sections => refs.extend(after.iter().map(|(id, _)| id.to_string())),
            }
        }
        refs
    }
}

/// Spine item-ref ids for `package`.
pub fn spine(package: &Package<'_>) -> Vec<String> {
    let plan = SpinePlan {
        has_cover: package.cover.is_some(),
        toc_in_spine: package.options.toc_in_spine(),
    };
    plan.idrefs(section_flags(package.sections))
}

fn section_flags(sections: &[RenderedSection]) -> impl Iterator<Item = (&str, bool)> {
    sections.iter().map(|s| (s.id.as_str(), s.before_toc))
}

/// Render `content.opf`.
pub fn build_opf(package: &Package<'_>) -> Result<Vec<u8>> {
    let options = package.options;

    let mut root = Element::new("package")
        .attr("xmlns", OPF_NS)
        .attr("version", "3.0")
        .attr("unique-identifier", "BookId")
        .attr("xmlns:dc", DC_NS)
        .attr("xmlns:dcterms", DCTERMS_NS)
        .attr("xml:lang", options.language());

    root.push(metadata(package));

    let mut manifest_el = Element::new("manifest");
    for item in manifest(package) {
        manifest_el.push(item.to_element());
    }
    root.push(manifest_el);

    let mut spine_el = Element::new("spine").attr("toc", "ncx");
    for idref in spine(package) {
        spine_el.push(Element::new("itemref").attr("idref", idref));
    }
    root.push(spine_el);

    let mut guide = Element::new("guide");
    if package.cover.is_some() {
        guide.push(
            Element::new("reference")
                .attr("type", "cover")
                .attr("title", "Cover")
                .attr("href", COVER_PAGE_HREF),
        );
    }
    guide.push(
        Element::new("reference")
            .attr("type", "toc")
            .attr("title", options.toc_title())
            .attr("href", NAV_HREF),
    );
    root.push(guide);

    Document::new(root).to_bytes()
}

fn metadata(package: &Package<'_>) -> Element {
    let options = package.options;
    let timestamp = package.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let mut metadata = Element::new("metadata")
        .attr("xmlns:dc", DC_NS)
        .attr("xmlns:opf", OPF_NS)
        .child(Element::with_text("dc:title", options.title.as_str()))
        .child(Element::with_text("dc:creator", options.author.as_str()).attr("id", "creator"));

    if let Some(subject) = &options.subject {
        metadata.push(Element::with_text("dc:subject", subject.as_str()));
    }
    if let Some(description) = &options.description {
        metadata.push(Element::with_text("dc:description", description.as_str()));
    }
    if let Some(publisher) = &options.publisher {
        metadata.push(Element::with_text("dc:publisher", publisher.as_str()));
        metadata.push(Element::with_text(
            "dc:rights",
            format!("Copyright © {} by {publisher}", package.timestamp.format("%Y")),
        ));
    }

    metadata.push(Element::with_text("dc:date", timestamp.as_str()));
    metadata.push(Element::with_text("meta", timestamp.as_str()).attr("property", "dcterms:modified"));
    metadata.push(Element::with_text("dc:identifier", package.uid).attr("id", "BookId"));
    metadata.push(Element::with_text("dc:language", options.language()));

    if let Some(cover) = package.cover {
        metadata.push(
            Element::new("meta")
                .attr("name", "cover")
                .attr("content", cover.image.id()),
        );
    }
    metadata
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::epub::test_support::{fixture, section};

    #[test]
    fn test_slots() {
        use SpineSlot::*;
        let plan = |has_cover, toc_in_spine| SpinePlan { has_cover, toc_in_spine };
        assert_eq!(plan(false, true).slots(), [BeforeToc, Toc, CreditPage, Sections]);
        assert_eq!(plan(false, false).slots(), [CreditPage, BeforeToc, Sections]);
        assert_eq!(plan(true, false).slots()[..2], [CoverPage, CreditPage]);
    }

    #[test]
    fn test_idrefs_keep_relative_order() {
        let plan = SpinePlan {
            has_cover: false,
            toc_in_spine: true,
        };
        let refs = plan.idrefs([("a", true), ("b", true), ("c", false), ("d", false)]);
        assert_eq!(refs, ["a", "b", "toc", "creditpage", "c", "d"]);
    }

    #[test]
    fn test_single_chapter_spine() {
        let f = fixture(vec![section(0, "ch1", false)], false);
        assert_eq!(spine(&f.package()), ["toc", "creditpage", "i_0_ch1"]);
    }

    #[test]
    fn test_cover_spine() {
        let f = fixture(vec![section(0, "ch1", false)], true);
        assert_eq!(
            spine(&f.package()),
            ["coverpage", "creditpage", "toc", "i_0_ch1"]
        );
    }

    #[test]
    fn test_manifest_order_and_ids() {
        let mut first = section(0, "ch1", false);
        first.has_svg = true;
        let f = fixture(vec![first, section(1, "ch2", false)], true);
        let items = manifest(&f.package());
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "coverpage",
                "ncx",
                "toc",
                "css",
                "i_0_ch1",
                "pic000",
                "i_1_ch2",
                "pic001",
                "cover",
                "bindery_logo",
                "creditpage"
            ]
        );
        assert_eq!(items[4].properties, Some("svg"));
        assert_eq!(items[6].properties, None);
        assert_eq!(items[8].properties, Some("cover-image"));
        assert_eq!(items[8].href, "img/cover.png");

        let hrefs: HashSet<_> = items.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs.len(), items.len());
    }

    #[test]
    fn test_spine_refs_exist_in_manifest() {
        let sections = vec![
            section(0, "intro", true),
            section(1, "ch1", false),
            section(2, "ch2", false),
        ];
        for has_cover in [false, true] {
            let f = fixture(sections.clone(), has_cover);
            let ids: HashSet<_> = manifest(&f.package()).into_iter().map(|i| i.id).collect();
            for idref in spine(&f.package()) {
                assert!(ids.contains(&idref), "{idref} missing from manifest");
            }
        }
    }

    #[test]
    fn test_opf_document() {
        let mut f = fixture(vec![section(0, "ch1", false)], true);
        f.options = f
            .options
            .with_subject("Love & War")
            .with_description("A <short> tale");
        let opf = String::from_utf8(build_opf(&f.package()).unwrap()).unwrap();

        assert!(opf.contains("<dc:title>T &amp; U</dc:title>"));
        assert!(opf.contains("<dc:subject>Love &amp; War</dc:subject>"));
        assert!(opf.contains("<dc:description>A &lt;short&gt; tale</dc:description>"));
        assert!(opf.contains("<dc:creator id=\"creator\">A</dc:creator>"));
        assert!(opf.contains("<dc:identifier id=\"BookId\">urn:uuid:test</dc:identifier>"));
        assert!(opf.contains("<dc:language>en</dc:language>"));
        assert!(opf.contains("<meta property=\"dcterms:modified\">2024-03-09T12:30:00Z</meta>"));
        assert!(opf.contains("<dc:rights>Copyright © 2024 by Pub</dc:rights>"));
        assert!(opf.contains("<meta name=\"cover\" content=\"cover\"/>"));
        assert!(opf.contains("<itemref idref=\"coverpage\"/>"));
        assert!(opf.contains("<reference type=\"cover\" title=\"Cover\" href=\"sections/coverpage.xhtml\"/>"));
        assert!(opf.contains("<reference type=\"toc\" title=\"Table of Contents\" href=\"toc.xhtml\"/>"));
    }
}

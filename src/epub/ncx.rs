//! The legacy NCX table of contents (`toc.ncx`).

use crate::error::Result;
use crate::xml::{Document, Element};

use super::{COVER_PAGE_HREF, NAV_HREF, Package};

const NCX_NS: &str = "http://www.daisy.org/z3986/2005/ncx/";
const NCX_DOCTYPE: &str =
    r#"ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd""#;

/// A `<navPoint>` and its nested points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub id: String,
    pub label: String,
    /// Target relative to `OEBPS/`.
    pub src: String,
    /// Assigned by [`NavMap::assign_play_order`].
    pub play_order: usize,
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    pub fn new(id: impl Into<String>, label: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            src: src.into(),
            play_order: 0,
            children: Vec::new(),
        }
    }

    fn to_element(&self) -> Element {
        let mut point = Element::new("navPoint")
            .attr("id", self.id.as_str())
            .attr("playOrder", self.play_order.to_string())
            .attr("class", "chapter")
            .child(Element::new("navLabel").child(Element::with_text("text", self.label.as_str())))
            .child(Element::new("content").attr("src", self.src.as_str()));
        for child in &self.children {
            point.push(child.to_element());
        }
        point
    }
}

/// The ordered tree of nav points under `<navMap>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavMap {
    pub points: Vec<NavPoint>,
}

impl NavMap {
    /// Build the nav map for `package`, with play orders assigned.
    ///
    /// Before-TOC sections precede the fixed `toc` point and the other
    /// sections follow it. An included cover is prepended.
    pub fn build(package: &Package<'_>) -> Self {
        let options = package.options;
        let mut points = Vec::new();

        if package.cover.is_some() && options.cover_in_toc() {
            points.push(NavPoint::new("coverpage", "Cover", COVER_PAGE_HREF));
        }

        let mut toc = Some(NavPoint::new("toc", options.toc_title(), NAV_HREF));
        for section in package.sections.iter().filter(|s| !s.exclude_from_toc) {
            if !section.before_toc
                && let Some(toc) = toc.take()
            {
                points.push(toc);
            }

            let href = section.href();
            let mut point = NavPoint::new(format!("np_{}", section.id), section.label(), href.as_str());
            for (n, sub) in section.subheadings.iter().enumerate() {
                point.children.push(NavPoint::new(
                    format!("np_{}_sub_{n}", section.id),
                    sub.text.as_str(),
                    format!("{href}#{}", sub.id),
                ));
            }
            points.push(point);
        }
        points.extend(toc);

        let mut map = NavMap { points };
        map.assign_play_order();
        map
    }

    /// Number the points 0, 1, 2, … in document order.
    pub fn assign_play_order(&mut self) {
        fn walk(points: &mut [NavPoint], next: &mut usize) {
            for point in points {
                point.play_order = *next;
                *next += 1;
                walk(&mut point.children, next);
            }
        }
        let mut next = 0;
        walk(&mut self.points, &mut next);
    }

    /// 2 when any point has children, otherwise 1.
    pub fn depth(&self) -> usize {
        if self.points.iter().any(|p| !p.children.is_empty()) {
            2
        } else {
            1
        }
    }

    /// All points in document order.
    pub fn flatten(&self) -> Vec<&NavPoint> {
        fn walk<'a>(points: &'a [NavPoint], out: &mut Vec<&'a NavPoint>) {
            for point in points {
                out.push(point);
                walk(&point.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.points, &mut out);
        out
    }
}

/// Render `toc.ncx`.
pub fn build_ncx(package: &Package<'_>) -> Result<Vec<u8>> {
    let options = package.options;
    let map = NavMap::build(package);
    let pages = package.page_count.to_string();

    let meta = |name: &str, content: &str| {
        Element::new("meta")
            .attr("name", name)
            .attr("content", content)
    };
    let head = Element::new("head")
        .child(meta("dtb:uid", package.uid))
        .child(meta("dtb:depth", &map.depth().to_string()))
        .child(meta("dtb:totalPageCount", &pages))
        .child(meta("dtb:maxPageNumber", &pages));

    let mut nav_map = Element::new("navMap");
    for point in &map.points {
        nav_map.push(point.to_element());
    }

    let root = Element::new("ncx")
        .attr("xmlns", NCX_NS)
        .attr("version", "2005-1")
        .attr("xml:lang", options.language())
        .child(head)
        .child(Element::new("docTitle").child(Element::with_text("text", options.title.as_str())))
        .child(Element::new("docAuthor").child(Element::with_text("text", options.author.as_str())))
        .child(nav_map);

    Document::new(root).with_doctype(NCX_DOCTYPE).to_bytes()
}

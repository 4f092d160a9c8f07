//! The EPUB 3 navigation document (`toc.xhtml`).

use crate::error::Result;
use crate::render::xhtml_page;
use crate::xml::Element;

use super::{COVER_PAGE_HREF, Package, STYLESHEET_HREF};

/// Render `toc.xhtml`.
///
/// One entry per section not excluded from the TOC, with sub-headings as a
/// nested list. An included cover comes first.
pub fn build_nav(package: &Package<'_>) -> Result<Vec<u8>> {
    let options = package.options;
    let mut list = Element::new("ol");

    if package.cover.is_some() && options.cover_in_toc() {
        list.push(
            Element::new("li")
                .attr("id", "coverpage-li")
                .attr("class", "table-of-content")
                .child(link(COVER_PAGE_HREF, "Cover")),
        );
    }

    for section in package.sections.iter().filter(|s| !s.exclude_from_toc) {
        let href = section.href();
        let mut entry = Element::new("li")
            .attr("class", "table-of-content")
            .child(link(&href, &section.label()));

        if !section.subheadings.is_empty() {
            let mut subs = Element::new("ol").attr("class", "subs");
            for sub in &section.subheadings {
                subs.push(
                    Element::new("li")
                        .attr("class", "table-of-content")
                        .child(link(&format!("{href}#{}", sub.id), &sub.text)),
                );
            }
            entry.push(subs);
        }
        list.push(entry);
    }

    let body = Element::new("body")
        .child(Element::with_text("h1", options.toc_title()).attr("id", "toc-title"))
        .child(
            Element::new("nav")
                .attr("epub:type", "toc")
                .attr("id", "toc")
                .child(list),
        );

    xhtml_page(
        options.language(),
        options.toc_title(),
        STYLESHEET_HREF,
        Vec::new(),
        body,
    )
    .to_bytes()
}

fn link(href: &str, label: &str) -> Element {
    Element::with_text("a", label).attr("href", href)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{CoverOptions, TocOptions};
    use crate::epub::test_support::{fixture, section};
    use crate::render::SubHeading;

    fn nav(f: &crate::epub::test_support::Fixture) -> String {
        String::from_utf8(build_nav(&f.package()).unwrap()).unwrap()
    }

    #[test]
    fn test_entries_and_subheadings() {
        let mut ch1 = section(0, "ch1", false);
        ch1.subheadings.push(SubHeading {
            id: "i_0_ch1-sub-0".into(),
            text: "Part A".into(),
        });
        let mut hidden = section(1, "hidden", false);
        hidden.exclude_from_toc = true;
        let f = fixture(vec![ch1, hidden], false);
        let out = nav(&f);

        assert!(out.contains("<h1 id=\"toc-title\">Table of Contents</h1>"));
        assert!(out.contains("<title>Table of Contents</title>"));
        assert!(out.contains("<nav epub:type=\"toc\" id=\"toc\">"));
        assert!(out.contains("<a href=\"sections/i_0_ch1.xhtml\">ch1</a>"));
        assert!(out.contains("<ol class=\"subs\">"));
        assert!(out.contains("<a href=\"sections/i_0_ch1.xhtml#i_0_ch1-sub-0\">Part A</a>"));
        assert!(!out.contains("hidden"));
        assert!(!out.contains("coverpage"));
    }

    #[test]
    fn test_cover_entry_and_custom_title() {
        let mut f = fixture(vec![section(0, "ch1", false)], true);
        f.options.cover = Some(CoverOptions::new("cover.png").include_in_toc());
        f.options.toc = Some(TocOptions::titled("Contents"));
        let out = nav(&f);

        assert!(out.contains("<h1 id=\"toc-title\">Contents</h1>"));
        let cover = out.find("coverpage.xhtml").unwrap();
        let chapter = out.find("i_0_ch1.xhtml").unwrap();
        assert!(cover < chapter);
    }

    #[test]
    fn test_untitled_label() {
        let mut untitled = section(2, "x", false);
        untitled.title = None;
        let f = fixture(vec![untitled], false);
        assert!(nav(&f).contains(">Section 3</a>"));
    }
}

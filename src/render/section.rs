//! Turns one content item into a standalone XHTML section.

use tracing::{debug, warn};

use crate::book::ContentItem;
use crate::dom::{Fragment, parse_fragment};
use crate::error::Result;
use crate::media::ImageFormat;
use crate::naming::{IMAGE_SLUG_LEN, Namer};
use crate::resource::{ResourceLoader, load_reference};
use crate::xml::Element;

use super::{ImageAsset, xhtml_page};

/// Attribute marking an element as a sub-heading worth a TOC entry.
pub const SUBTITLE_ATTR: &str = "data-ec-role";
pub const SUBTITLE_VALUE: &str = "subtitle";

/// An in-section heading that navigation documents link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubHeading {
    /// Anchor id inside the section document.
    pub id: String,
    /// Whitespace-collapsed text content, or `<section label> (<n>)` when
    /// the heading has no text.
    pub text: String,
}

/// A content item after rendering.
#[derive(Debug, Clone)]
pub struct RenderedSection {
    /// Position of the source item in the content list.
    pub index: usize,
    /// File stem, also the manifest id.
    pub id: String,
    pub title: Option<String>,
    /// Fragment markup after anchor tagging and image replacement.
    pub markup: String,
    /// The complete XHTML document.
    pub document: Vec<u8>,
    pub subheadings: Vec<SubHeading>,
    /// Images extracted from this section, in document order.
    pub images: Vec<ImageAsset>,
    /// The markup contains inline SVG.
    pub has_svg: bool,
    pub before_toc: bool,
    pub exclude_from_toc: bool,
}

impl RenderedSection {
    /// Path relative to the package root, e.g. `sections/i_0_ch1.xhtml`.
    pub fn href(&self) -> String {
        format!("sections/{}.xhtml", self.id)
    }

    /// Navigation label: the title, or `Section <n>` for untitled sections.
    pub fn label(&self) -> String {
        section_label(self.title.as_deref(), self.index)
    }
}

fn section_label(title: Option<&str>, index: usize) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Section {}", index + 1),
    }
}

/// Render the item at `index` into a section document.
///
/// Sub-headings without an id get `<id>-sub-<n>`. Every `<img>` is loaded
/// through `loader`, renamed to a fresh unique name and replaced by a
/// `<picture>` wrapper pointing at `../img/<name>`.
pub fn render_section(
    index: usize,
    item: &ContentItem,
    language: &str,
    namer: &mut Namer,
    loader: &dyn ResourceLoader,
) -> Result<RenderedSection> {
    let id = namer.section_file_name(index, item);
    let mut fragment = parse_fragment(&item.data);

    let label = section_label(item.title.as_deref(), index);
    let subheadings = tag_subheadings(&mut fragment, &id, &label);
    let images = extract_images(&mut fragment, namer, loader)?;
    let has_svg = fragment.contains_tag("svg");
    let markup = fragment.to_xhtml();

    let title = item.title.as_deref().unwrap_or("");
    let mut body = Element::new("body");
    if item.title.is_some() {
        body.push(Element::with_text("h1", title));
    }
    if let Some(author) = &item.author {
        body.push(Element::with_text("p", author.as_str()).attr("class", "sec-author"));
    }
    let body = body.raw(markup.as_str());

    let document = xhtml_page(language, title, "../css/style.css", Vec::new(), body).to_bytes()?;

    debug!(
        section = %id,
        subheadings = subheadings.len(),
        images = images.len(),
        "rendered section"
    );

    Ok(RenderedSection {
        index,
        id,
        title: item.title.clone(),
        markup,
        document,
        subheadings,
        images,
        has_svg,
        before_toc: item.before_toc,
        exclude_from_toc: item.exclude_from_toc,
    })
}

fn tag_subheadings(fragment: &mut Fragment, section_id: &str, label: &str) -> Vec<SubHeading> {
    let marked = fragment.elements_by_attr(SUBTITLE_ATTR, SUBTITLE_VALUE);
    let mut subheadings = Vec::with_capacity(marked.len());

    for (n, node) in marked.into_iter().enumerate() {
        let anchor = match fragment.dom.get_attr(node, "id") {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => {
                let generated = format!("{section_id}-sub-{n}");
                fragment.dom.set_attr(node, "id", &generated);
                generated
            }
        };
        let text = fragment
            .dom
            .text_content(node)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let text = if text.is_empty() {
            format!("{label} ({})", n + 1)
        } else {
            text
        };
        subheadings.push(SubHeading { id: anchor, text });
    }
    subheadings
}

fn extract_images(
    fragment: &mut Fragment,
    namer: &mut Namer,
    loader: &dyn ResourceLoader,
) -> Result<Vec<ImageAsset>> {
    let mut images = Vec::new();

    for img in fragment.elements_by_tag("img") {
        let Some(src) = fragment.dom.get_attr(img, "src").map(str::to_string) else {
            warn!("skipping <img> without src");
            continue;
        };
        if src.is_empty() || src.starts_with("data:") {
            warn!(src = %truncate(&src, 32), "skipping inline or empty image source");
            continue;
        }

        let format = ImageFormat::from_reference(&src)?;
        let data = load_reference(loader, &src)?;
        let name = format!("{}.{}", namer.unique_slug(IMAGE_SLUG_LEN), format.extension());
        debug!(%src, %name, "extracted image");

        let alt = fragment.dom.get_attr(img, "alt").unwrap_or("").to_string();
        let new_src = format!("../img/{name}");
        let picture = fragment.dom.create_html_element("picture", &[]);
        let replacement = fragment
            .dom
            .create_html_element("img", &[("src", new_src.as_str()), ("alt", alt.as_str())]);
        fragment.dom.append(picture, replacement);
        fragment.dom.insert_after(img, picture);
        fragment.dom.detach(img);

        images.push(ImageAsset { name, format, data });
    }
    Ok(images)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

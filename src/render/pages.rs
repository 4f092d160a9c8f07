//! The cover page and the credit page.

use std::io;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::book::CoverOptions;
use crate::error::{Error, Result};
use crate::media::{ImageFormat, ImageProbe};
use crate::resource::{ResourceLoader, load_reference};
use crate::xml::{Element, SVG_NS, XLINK_NS};

use super::{ImageAsset, xhtml_page};

/// File name of the bundled credit logo under `img/`.
pub const LOGO_NAME: &str = "bindery_logo.svg";

const LOGO_SVG: &[u8] = include_bytes!("../../assets/bindery_logo.svg");

/// A rendered cover page and the cover image it displays.
#[derive(Debug, Clone)]
pub struct CoverPage {
    pub document: Vec<u8>,
    /// Stored as `img/cover.<ext>`.
    pub image: ImageAsset,
    pub width: u32,
    pub height: u32,
}

/// The attribution page and its logo.
#[derive(Debug, Clone)]
pub struct CreditPage {
    pub document: Vec<u8>,
    pub logo: ImageAsset,
}

/// Load the cover image and build a page that scales it to fit the screen.
///
/// The image is drawn inside an inline SVG sized to the image's natural
/// dimensions, so readers keep its aspect ratio.
pub fn build_cover_page(
    cover: &CoverOptions,
    language: &str,
    loader: &dyn ResourceLoader,
    probe: &dyn ImageProbe,
) -> Result<CoverPage> {
    let format = ImageFormat::from_reference(&cover.path)?;
    let data = load_reference(loader, &cover.path)?;
    let (width, height) = probe.dimensions(format, &data).ok_or_else(|| {
        Error::resource(
            cover.path.as_str(),
            io::Error::new(io::ErrorKind::InvalidData, "unable to read image dimensions"),
        )
    })?;
    debug!(path = %cover.path, width, height, "loaded cover image");

    let image = ImageAsset {
        name: format!("cover.{}", format.extension()),
        format,
        data,
    };

    let svg = Element::new("svg")
        .attr("xmlns", SVG_NS)
        .attr("xmlns:xlink", XLINK_NS)
        .attr("version", "1.1")
        .attr("width", "100%")
        .attr("height", "100%")
        .attr("viewBox", format!("0 0 {width} {height}"))
        .attr("preserveAspectRatio", "xMidYMid meet")
        .child(
            Element::new("image")
                .attr("width", width.to_string())
                .attr("height", height.to_string())
                .attr("xlink:href", format!("../{}", image.href())),
        );
    let body = Element::new("body")
        .attr("class", "cover")
        .child(Element::new("div").attr("class", "cover-image").child(svg));
    let viewport = Element::new("meta")
        .attr("name", "viewport")
        .attr("content", format!("width={width}, height={height}"));

    let document = xhtml_page(language, "Cover", "../css/style.css", vec![viewport], body)
        .to_bytes()?;

    Ok(CoverPage {
        document,
        image,
        width,
        height,
    })
}

/// Build the attribution page, stamped with the month and year of `date`.
pub fn build_credit_page(language: &str, date: DateTime<Utc>) -> Result<CreditPage> {
    let logo = ImageAsset {
        name: LOGO_NAME.to_string(),
        format: ImageFormat::Svg,
        data: LOGO_SVG.to_vec(),
    };

    let body = Element::new("body").attr("class", "credit").child(
        Element::new("div")
            .attr("class", "credit")
            .child(
                Element::new("img")
                    .attr("src", format!("../{}", logo.href()))
                    .attr("alt", "bindery"),
            )
            .child(Element::with_text("p", "Made with bindery"))
            .child(Element::with_text("h3", date.format("%B %Y").to_string())),
    );

    let document = xhtml_page(language, "Credits", "../css/style.css", Vec::new(), body)
        .to_bytes()?;

    Ok(CreditPage { document, logo })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::media::HeaderProbe;
    use crate::resource::MemoryLoader;

    struct FixedProbe(Option<(u32, u32)>);

    impl ImageProbe for FixedProbe {
        fn dimensions(&self, _format: ImageFormat, _data: &[u8]) -> Option<(u32, u32)> {
            self.0
        }
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_cover_page() {
        let loader = MemoryLoader::new().with("art/front.JPG", b"jpeg".to_vec());
        let page = build_cover_page(
            &CoverOptions::new("art/front.JPG"),
            "de",
            &loader,
            &FixedProbe(Some((600, 800))),
        )
        .unwrap();

        assert_eq!(page.image.name, "cover.jpeg");
        assert_eq!(page.image.id(), "cover");
        assert_eq!((page.width, page.height), (600, 800));

        let doc = text(&page.document);
        assert!(doc.contains("viewBox=\"0 0 600 800\""));
        assert!(doc.contains("<image width=\"600\" height=\"800\" xlink:href=\"../img/cover.jpeg\"/>"));
        assert!(doc.contains("content=\"width=600, height=800\""));
        assert!(doc.contains("xml:lang=\"de\""));
    }

    #[test]
    fn test_cover_from_svg_header() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="450"></svg>"#;
        let loader = MemoryLoader::new().with("cover.svg", svg.to_vec());
        let page =
            build_cover_page(&CoverOptions::new("cover.svg"), "en", &loader, &HeaderProbe).unwrap();
        assert_eq!((page.width, page.height), (300, 450));
        assert_eq!(page.image.media_type(), "image/svg+xml");
    }

    #[test]
    fn test_unprobeable_cover_is_fatal() {
        let loader = MemoryLoader::new().with("c.png", b"not a png".to_vec());
        let err = build_cover_page(&CoverOptions::new("c.png"), "en", &loader, &FixedProbe(None))
            .unwrap_err();
        assert!(matches!(err, Error::Resource { ref reference, .. } if reference == "c.png"));
    }

    #[test]
    fn test_missing_cover_is_fatal() {
        let err = build_cover_page(
            &CoverOptions::new("nope.png"),
            "en",
            &MemoryLoader::new(),
            &HeaderProbe,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Resource { .. }));
    }

    #[test]
    fn test_credit_page_date_stamp() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let page = build_credit_page("en", date).unwrap();
        let doc = text(&page.document);
        assert!(doc.contains("<h3>March 2024</h3>"));
        assert!(doc.contains("src=\"../img/bindery_logo.svg\""));
        assert_eq!(page.logo.id(), "bindery_logo");
        assert!(page.logo.data.starts_with(b"<?xml"));
    }
}

//! Image formats accepted in a package, and header-based dimension probing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

/// Image formats that may be declared in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
    WebP,
    Pdf,
}

impl ImageFormat {
    /// Resolve a file extension. `jpg` is accepted as an alias of `jpeg`.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "svg" => Ok(ImageFormat::Svg),
            "webp" => Ok(ImageFormat::WebP),
            "pdf" => Ok(ImageFormat::Pdf),
            "" => Err(Error::UnsupportedFormat("missing file extension".into())),
            other => Err(Error::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Resolve the extension of a source reference such as `img/photo.JPG`.
    pub fn from_reference(reference: &str) -> Result<Self> {
        Self::from_extension(extension_of(reference))
            .map_err(|_| Error::UnsupportedFormat(reference.to_string()))
    }

    /// Normalized extension written into the package.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Svg => "svg",
            ImageFormat::WebP => "webp",
            ImageFormat::Pdf => "pdf",
        }
    }

    /// Media type declared in the manifest.
    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Pdf => "application/pdf",
        }
    }
}

/// Extension of the last path segment, without the dot. Empty if there is none.
fn extension_of(reference: &str) -> &str {
    let file = reference.rsplit('/').next().unwrap_or(reference);
    let file = file.split(['?', '#']).next().unwrap_or(file);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Pixel dimensions of an image, used to size the cover page.
pub trait ImageProbe: Send {
    /// `(width, height)`, or `None` if the payload could not be understood.
    fn dimensions(&self, format: ImageFormat, data: &[u8]) -> Option<(u32, u32)>;
}

/// [`ImageProbe`] that reads image headers directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProbe;

impl ImageProbe for HeaderProbe {
    fn dimensions(&self, format: ImageFormat, data: &[u8]) -> Option<(u32, u32)> {
        match format {
            ImageFormat::Svg => extract_svg_dimensions(data),
            ImageFormat::Pdf => None,
            _ => extract_image_dimensions(data),
        }
    }
}

// ============================================================================
// Raster Dimension Extraction
// ============================================================================

/// Extract image dimensions from raw raster data.
///
/// Supports PNG, JPEG and WebP by parsing header bytes.
/// Returns `(width, height)` or `None` if format is unrecognized.
pub fn extract_image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }

    // PNG: width/height at bytes 16-23 in IHDR chunk
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        return Some((width, height));
    }

    if data[0] == 0xFF && data[1] == 0xD8 {
        return extract_jpeg_dimensions(data);
    }

    if &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return extract_webp_dimensions(data);
    }

    None
}

/// Extract dimensions from JPEG data by parsing SOF markers.
fn extract_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF markers (Start of Frame) - various encoding types
        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) && i + 9 < data.len()
        {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }

        // Skip to next marker
        if i + 3 < data.len() {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + length;
        } else {
            break;
        }
    }
    None
}

/// Extract dimensions from the first chunk of a RIFF/WEBP container.
fn extract_webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let chunk = &data[12..16];
    let body = &data[20..];
    match chunk {
        // Extended: 24-bit little-endian canvas size minus one
        b"VP8X" if body.len() >= 10 => {
            let width = u32::from_le_bytes([body[4], body[5], body[6], 0]) + 1;
            let height = u32::from_le_bytes([body[7], body[8], body[9], 0]) + 1;
            Some((width, height))
        }
        // Lossless: signature byte then two 14-bit fields minus one
        b"VP8L" if body.len() >= 5 && body[0] == 0x2F => {
            let bits = u32::from_le_bytes([body[1], body[2], body[3], body[4]]);
            let width = (bits & 0x3FFF) + 1;
            let height = ((bits >> 14) & 0x3FFF) + 1;
            Some((width, height))
        }
        // Lossy: frame tag, start code 9D 01 2A, then 14-bit sizes
        b"VP8 " if body.len() >= 10 && body[3..6] == [0x9D, 0x01, 0x2A] => {
            let width = u16::from_le_bytes([body[6], body[7]]) as u32 & 0x3FFF;
            let height = u16::from_le_bytes([body[8], body[9]]) as u32 & 0x3FFF;
            Some((width, height))
        }
        _ => None,
    }
}

// ============================================================================
// SVG Dimension Extraction
// ============================================================================

/// Read `width`/`height` from the root `<svg>` element, falling back to its `viewBox`.
pub fn extract_svg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"svg" => {
                let mut width = None;
                let mut height = None;
                let mut view_box = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    match attr.key.as_ref() {
                        b"width" => width = parse_length(&value),
                        b"height" => height = parse_length(&value),
                        b"viewBox" => view_box = parse_view_box(&value),
                        _ => {}
                    }
                }
                return match (width, height) {
                    (Some(w), Some(h)) => Some((w, h)),
                    _ => view_box,
                };
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Absolute SVG lengths only; percentages and relative units yield `None`.
fn parse_length(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    let n: f64 = number.parse().ok()?;
    (n > 0.0).then(|| n.round() as u32)
}

fn parse_view_box(value: &str) -> Option<(u32, u32)> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((w.round() as u32, h.round() as u32)),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

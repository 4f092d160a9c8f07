//! Rough page-count estimate for the NCX header.

use memchr::memchr;

use super::RenderedSection;

pub const WORDS_PER_PAGE: usize = 250;

/// Estimated page count for a whole book.
///
/// Every section is worth at least one page. The credit page adds one, and
/// so does the cover when there is one.
pub fn estimate_pages(sections: &[RenderedSection], has_cover: bool) -> usize {
    let content: usize = sections.iter().map(|s| section_pages(&s.markup)).sum();
    content + 1 + usize::from(has_cover)
}

/// Pages for one section's markup: `ceil(words / 250)`, minimum one.
pub fn section_pages(markup: &str) -> usize {
    count_words(markup).div_ceil(WORDS_PER_PAGE).max(1)
}

/// Words in `markup` once every tag is removed. Text on both sides of a tag
/// joins up, so `un<em>broken</em>` is one word.
fn count_words(markup: &str) -> usize {
    let bytes = markup.as_bytes();
    let mut words = 0;
    let mut in_word = false;
    let mut pos = 0;

    while pos < bytes.len() {
        let text_end = memchr(b'<', &bytes[pos..]).map_or(bytes.len(), |i| pos + i);
        for &b in &bytes[pos..text_end] {
            if b.is_ascii_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                words += 1;
            }
        }
        if text_end == bytes.len() {
            break;
        }
        pos = match memchr(b'>', &bytes[text_end..]) {
            Some(i) => text_end + i + 1,
            None => bytes.len(),
        };
    }
    words
}

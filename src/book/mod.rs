//! Input description of a book: metadata, content items, cover and TOC options.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::error::{Error, Result};

/// Everything needed to compose one book.
///
/// `title`, `author` and `content` are required. The remaining fields are
/// optional and default to an English book without cover.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BookOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub language: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subject: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub publisher: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cover: Option<CoverOptions>,
    /// `None` means the caller never supplied a content list, which is an error.
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: Option<Vec<ContentItem>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub toc: Option<TocOptions>,
}

/// One section of the book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ContentItem {
    /// Raw HTML fragment.
    pub data: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: Option<String>,
    /// Place this section ahead of the table of contents in reading order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub before_toc: bool,
    /// Leave this section out of both navigation documents.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exclude_from_toc: bool,
}

/// Cover image options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoverOptions {
    /// Reference handed to the resource loader.
    pub path: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub include_in_toc: bool,
}

/// Table of contents options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TocOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub exclude_from_spine: bool,
}

pub(crate) const DEFAULT_LANGUAGE: &str = "en";
pub(crate) const DEFAULT_TOC_TITLE: &str = "Table of Contents";

impl BookOptions {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            content: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_cover(mut self, cover: CoverOptions) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn with_toc(mut self, toc: TocOptions) -> Self {
        self.toc = Some(toc);
        self
    }

    /// Append a content item.
    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.content.get_or_insert_with(Vec::new).push(item);
        self
    }

    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn toc_title(&self) -> &str {
        self.toc
            .as_ref()
            .and_then(|t| t.title.as_deref())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOC_TITLE)
    }

    pub fn toc_in_spine(&self) -> bool {
        !self.toc.as_ref().is_some_and(|t| t.exclude_from_spine)
    }

    pub fn cover_in_toc(&self) -> bool {
        self.cover.as_ref().is_some_and(|c| c.include_in_toc)
    }

    pub fn items(&self) -> &[ContentItem] {
        self.content.as_deref().unwrap_or_default()
    }

    /// Check the options before any resource is touched.
    ///
    /// Title and author must be non-blank, the content list must be present,
    /// and before-TOC items must form a gap-free prefix of it.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::config("no title has been defined"));
        }
        if self.author.trim().is_empty() {
            return Err(Error::config("no author has been defined"));
        }
        let Some(content) = &self.content else {
            return Err(Error::config("no content has been defined"));
        };
        if let Some(cover) = &self.cover
            && cover.path.trim().is_empty()
        {
            return Err(Error::config("cover path is empty"));
        }

        let prefix = content.iter().take_while(|item| item.before_toc).count();
        if let Some(pos) = content[prefix..].iter().position(|item| item.before_toc) {
            return Err(Error::config(format!(
                "beforeToc content must come first: item {} follows a regular item",
                prefix + pos
            )));
        }
        Ok(())
    }
}

impl ContentItem {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn before_toc(mut self) -> Self {
        self.before_toc = true;
        self
    }

    pub fn exclude_from_toc(mut self) -> Self {
        self.exclude_from_toc = true;
        self
    }
}

impl CoverOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            include_in_toc: false,
        }
    }

    pub fn include_in_toc(mut self) -> Self {
        self.include_in_toc = true;
        self
    }
}

impl TocOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            exclude_from_spine: false,
        }
    }

    pub fn exclude_from_spine(mut self) -> Self {
        self.exclude_from_spine = true;
        self
    }
}

//! Loading a saved page into a DOM snapshot.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use ego_tree::NodeId;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::dom::element_text;
use crate::error::PageError;

/// How far into the document a `<meta charset>` is looked for.
const SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("hardcoded meta charset regex is valid")
});
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("hardcoded title selector is valid"));

/// Byte-order mark first, then a `<meta charset>` near the top, else UTF-8.
#[must_use]
pub fn sniff_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|captures| captures.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .map_or(UTF_8, Encoding::output_encoding)
}

/// Decodes page bytes; malformed sequences become U+FFFD.
#[must_use]
pub fn decode(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    let (text, encoding, had_errors) = sniff_encoding(bytes).decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "replaced malformed byte sequences");
    }
    (text, encoding)
}

#[derive(Debug)]
pub struct Page {
    html: Html,
    encoding: &'static Encoding,
}

impl Page {
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            encoding: UTF_8,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (text, encoding) = decode(bytes);
        Self {
            html: Html::parse_document(&text),
            encoding,
        }
    }

    /// # Errors
    /// Fails when the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, PageError> {
        let bytes = fs::read(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&bytes))
    }

    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Cleaned `<title>` text, `None` when absent or blank.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.html
            .select(&TITLE_SELECTOR)
            .next()
            .map(element_text)
            .filter(|title| !title.is_empty())
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// First element matching `css`.
    ///
    /// # Errors
    /// Fails when `css` is not a valid selector.
    pub fn select_first(&self, css: &str) -> Result<Option<ElementRef<'_>>, PageError> {
        let selector = Selector::parse(css).map_err(|error| PageError::InvalidSelector {
            selector: css.to_string(),
            message: error.to_string(),
        })?;
        Ok(self.html.select(&selector).next())
    }
}

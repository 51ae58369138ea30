//! Portfolio assembly: pairing small and large photo variants.
//!
//! Each photo is uploaded twice, at two resolutions, and the two files are
//! told apart by a suffix on the file stem:
//!
//! ```text
//! Sunset.jpg          → large variant of "Sunset"
//! sunset-small.jpg    → small variant of "Sunset"
//! ```
//!
//! ## Logical names
//!
//! A file name becomes a grouping key in three steps:
//!
//! 1. one trailing extension is stripped (`.jpg`, then `.png`; first match wins);
//! 2. a trailing small suffix (`-small`) is stripped, giving the logical name;
//! 3. the logical name is title-cased (`sunset-beach` → `Sunset-Beach`).
//!
//! Because the key is title-cased, `sunset.jpg` and `Sunset-small.png` merge
//! into the same element.
//!
//! ## Link normalization
//!
//! Dropbox share links point at a web viewer. Posts embed the image directly,
//! so the host is rewritten to the content host and the trailing `?dl=0`
//! preview parameter is dropped:
//!
//! ```text
//! https://www.dropbox.com/s/abc/Sunset.jpg?dl=0
//! → https://dl.dropboxusercontent.com/s/abc/Sunset.jpg
//! ```
//!
//! ## Ordering
//!
//! Elements are grouped in a `BTreeMap` keyed by title, so output is sorted by
//! title. Later links for the same variant overwrite earlier ones.

use crate::config::NamingConfig;
use crate::types::ShareLink;
use std::collections::BTreeMap;

const VIEWER_HOST: &str = "www.dropbox.com";
const CONTENT_HOST: &str = "dl.dropboxusercontent.com";
const PREVIEW_PARAM: &str = "?dl=0";

/// One logical photo with the links of its size variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioElement {
    /// Title-cased logical name, e.g. `Sunset`.
    pub title: String,
    pub small_size_link: Option<String>,
    pub large_size_link: Option<String>,
}

impl PortfolioElement {
    fn new(title: String) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    /// Both variants are linked, so a post can be rendered.
    pub fn is_complete(&self) -> bool {
        self.links().is_some()
    }

    /// `(small, large)` when both links are present and non-empty.
    pub fn links(&self) -> Option<(&str, &str)> {
        let small = self.small_size_link.as_deref().filter(|s| !s.is_empty())?;
        let large = self.large_size_link.as_deref().filter(|s| !s.is_empty())?;
        Some((small, large))
    }
}

/// Result of parsing a photo file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPhotoName {
    /// Name with extension and small suffix stripped.
    pub logical_name: String,
    /// Whether the name carried the small suffix.
    pub is_small: bool,
}

/// Parse a file name following the `<name>[<small_suffix>].<ext>` convention.
///
/// - `"Sunset.jpg"` → logical_name="Sunset", is_small=false
/// - `"sunset-small.jpg"` → logical_name="sunset", is_small=true
/// - `"sunset-small"` → logical_name="sunset", is_small=true
/// - `"notes.txt"` → logical_name="notes.txt", is_small=false
pub fn parse_photo_name(file_name: &str, naming: &NamingConfig) -> ParsedPhotoName {
    let stem = naming
        .extensions
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext.as_str()))
        .unwrap_or(file_name);

    match stem.strip_suffix(naming.small_suffix.as_str()) {
        Some(logical) => ParsedPhotoName {
            logical_name: logical.to_string(),
            is_small: true,
        },
        None => ParsedPhotoName {
            logical_name: stem.to_string(),
            is_small: false,
        },
    }
}

/// Upper-case the first letter of every word.
///
/// In ASCII a word starts after any character that is not a letter, digit or
/// `_`, so `"mcDonald's farm"` becomes `"McDonald'S Farm"`. Outside ASCII only
/// whitespace separates words; combining marks and typographic punctuation stay
/// inside the word (`"alex’s dog"` → `"Alex’s Dog"`). The rest of each word is
/// left as-is.
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    result
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else {
        c.is_whitespace()
    }
}

/// Rewrite a share link to point at the raw file instead of the web viewer.
pub fn normalize_link(url: &str) -> String {
    let direct = url.replacen(VIEWER_HOST, CONTENT_HOST, 1);
    match direct.strip_suffix(PREVIEW_PARAM) {
        Some(trimmed) => trimmed.to_string(),
        None => direct,
    }
}

/// Group links into portfolio elements, one per logical photo.
pub fn assemble(links: &[ShareLink], naming: &NamingConfig) -> Vec<PortfolioElement> {
    let mut elements: BTreeMap<String, PortfolioElement> = BTreeMap::new();

    for link in links {
        let parsed = parse_photo_name(&link.name, naming);
        let title = title_case(&parsed.logical_name);
        let url = normalize_link(&link.url);

        let element = elements
            .entry(title.clone())
            .or_insert_with(|| PortfolioElement::new(title));
        if parsed.is_small {
            element.small_size_link = Some(url);
        } else {
            element.large_size_link = Some(url);
        }
    }

    elements.into_values().collect()
}

//! Local UI state for a rendered product: selected image and expanded sections.
//!
//! The state is carried in the query string (`?img=2&expand=specs,offers`) so
//! every toggle is a plain link and the payload itself is never touched.

use std::collections::BTreeSet;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Index arithmetic for an image carousel of `len` images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
}

impl Carousel {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Clamps an index from the query string into range.
    #[must_use]
    pub fn clamp(self, index: usize) -> usize {
        if self.len == 0 {
            0
        } else {
            index.min(self.len - 1)
        }
    }

    /// Next index; wraps from the last image to the first.
    #[must_use]
    pub fn next(self, index: usize) -> usize {
        if self.len == 0 {
            return 0;
        }
        (self.clamp(index) + 1) % self.len
    }

    /// Previous index; wraps from the first image to the last.
    #[must_use]
    pub fn prev(self, index: usize) -> usize {
        if self.len == 0 {
            return 0;
        }
        match self.clamp(index) {
            0 => self.len - 1,
            i => i - 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub image_index: usize,
    pub expanded: BTreeSet<String>,
}

impl DisplayState {
    /// Builds state from the `img` and `expand` query parameters. Unknown or
    /// empty section keys are kept as-is; renderers simply ignore them.
    #[must_use]
    pub fn from_query(image: Option<usize>, expand: Option<&str>) -> Self {
        let expanded = expand
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            image_index: image.unwrap_or(0),
            expanded,
        }
    }

    #[must_use]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Returns a copy with `key` flipped between expanded and collapsed.
    #[must_use]
    pub fn toggled(&self, key: &str) -> Self {
        let mut next = self.clone();
        if !next.expanded.remove(key) {
            next.expanded.insert(key.to_owned());
        }
        next
    }

    #[must_use]
    pub fn with_image(&self, index: usize) -> Self {
        Self {
            image_index: index,
            expanded: self.expanded.clone(),
        }
    }

    /// Serializes to a query string without the leading `?`. Default values
    /// are omitted, so the default state yields an empty string.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if self.image_index > 0 {
            parts.push(format!("img={}", self.image_index));
        }
        if !self.expanded.is_empty() {
            let joined = self
                .expanded
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!(
                "expand={}",
                utf8_percent_encode(&joined, NON_ALPHANUMERIC)
            ));
        }
        parts.join("&")
    }
}

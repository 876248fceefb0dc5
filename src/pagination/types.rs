//! Pagination types
//!
//! Link relations parsed from the `Link` header and the page metadata
//! derived from them.

use super::links::relation;
use crate::types::{PageOrder, DEFAULT_PER_PAGE};

/// One entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target URL
    pub url: String,
    /// Relation name, e.g. `next`
    pub rel: String,
}

/// Parsed `Link` header (RFC 5988)
///
/// Format: `<https://api.github.com/...?page=2>; rel="next", <...>; rel="last"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    links: Vec<Link>,
}

impl LinkTable {
    /// Parse a `Link` header. Entries without a URL or a `rel` are skipped.
    pub fn parse(header: &str) -> Self {
        let mut links = Vec::new();

        for part in header.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if let Some(inner) = segment
                    .strip_prefix('<')
                    .and_then(|s| s.strip_suffix('>'))
                {
                    url = Some(inner);
                } else if let Some(stripped) = segment.strip_prefix("rel=") {
                    rel = Some(stripped.trim_matches('"').trim_matches('\''));
                }
            }

            if let (Some(url), Some(rel)) = (url, rel) {
                // rel may hold several space-separated relation types
                for name in rel.split_whitespace() {
                    links.push(Link {
                        url: url.to_string(),
                        rel: name.to_string(),
                    });
                }
            }
        }

        Self { links }
    }

    /// URL of the first entry with relation `rel`
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == rel)
            .map(|link| link.url.as_str())
    }

    /// All entries in header order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Check if the header had no usable entries
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// `next` and `last` page numbers of a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Page after the current one; absent on the last page
    pub next: Option<u32>,
    /// Final page; absent when the total is unknown
    pub last: Option<u32>,
}

impl PageMetadata {
    /// Read the metadata from a link table
    pub fn from_links(links: Option<&LinkTable>) -> Self {
        Self {
            next: relation(links, "next"),
            last: relation(links, "last"),
        }
    }

    /// Pages still to fetch, `next..=last`. `None` unless both are known.
    pub fn remaining_pages(&self) -> Option<std::ops::RangeInclusive<u32>> {
        match (self.next, self.last) {
            (Some(next), Some(last)) => Some(next..=last),
            _ => None,
        }
    }

    /// Check if pages past the current one exist and can be enumerated
    pub fn has_more(&self) -> bool {
        self.remaining_pages().is_some_and(|pages| !pages.is_empty())
    }
}

/// Options of one paginated download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Page size
    pub per_page: u32,
    /// Order of the resolved collection
    pub order: PageOrder,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            order: PageOrder::default(),
        }
    }
}

impl FetchOptions {
    /// Set the page size
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the collection order
    #[must_use]
    pub fn order(mut self, order: PageOrder) -> Self {
        self.order = order;
        self
    }
}

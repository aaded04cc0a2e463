use std::collections::HashSet;

use log::debug;
use scraper::{Html, Selector};
use url::Url;

use super::product::{selector, stripped_text};
use crate::ScraperResult;

pub const CATEGORY_TILE: &str = "div.ng-binding";
pub const PRODUCT_LINK: &str = "a.ng-binding";

/// Product detail URLs collected from one category page.
///
/// Consumed once; walking the category again means loading the page again.
#[derive(Debug)]
pub struct ProductLinks {
    found: usize,
    links: std::iter::Take<std::vec::IntoIter<Url>>,
}

impl ProductLinks {
    pub fn empty() -> Self {
        Self {
            found: 0,
            links: Vec::new().into_iter().take(0),
        }
    }

    /// Distinct links on the page before the limit was applied.
    pub fn found(&self) -> usize {
        self.found
    }
}

impl Iterator for ProductLinks {
    type Item = Url;

    fn next(&mut self) -> Option<Url> {
        self.links.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.links.size_hint()
    }
}

impl ExactSizeIterator for ProductLinks {}

pub struct ListingParser {
    tile: Selector,
    link: Selector,
}

impl ListingParser {
    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            tile: selector(CATEGORY_TILE)?,
            link: selector(PRODUCT_LINK)?,
        })
    }

    /// Category names shown on the catalog root, in page order.
    pub fn category_names(&self, html: &str) -> Vec<String> {
        Html::parse_document(html)
            .select(&self.tile)
            .map(stripped_text)
            .collect()
    }

    /// Detail links in page order, minus the first `skip` anchors, capped at `limit`.
    pub fn product_links(
        &self,
        html: &str,
        page_url: &Url,
        skip: usize,
        limit: usize,
    ) -> ProductLinks {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        let links: Vec<Url> = document
            .select(&self.link)
            .skip(skip)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| {
                !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
            })
            .filter_map(|href| page_url.join(href).ok())
            .filter(|url| seen.insert(url.to_string()))
            .collect();

        debug!("Found {} product links on {}", links.len(), page_url);

        ProductLinks {
            found: links.len(),
            links: links.into_iter().take(limit),
        }
    }
}

use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::record::{BomLine, Nameplate, ProductRecord, UNIDENTIFIED};
use crate::{ScraperError, ScraperResult};

/// Trimmed text nodes of `element`, concatenated.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

pub(crate) fn selector(css: &str) -> ScraperResult<Selector> {
    Selector::parse(css)
        .map_err(|e| ScraperError::ExtractionError(format!("invalid selector {css:?}: {e}")))
}

/// Reads a rendered product detail page into a [`ProductRecord`].
pub struct ProductParser {
    nameplate_keys: Vec<String>,
    title: Selector,
    description: Selector,
    nameplate: Selector,
    row: Selector,
    header_cell: Selector,
    data_cell: Selector,
    parts_tab: Selector,
    parts_table: Selector,
    parts_row: Selector,
    image: Selector,
    manual: Selector,
}

impl ProductParser {
    /// `nameplate_keys` filters nameplate labels; empty keeps them all.
    pub fn new(nameplate_keys: Vec<String>) -> ScraperResult<Self> {
        Ok(Self {
            nameplate_keys,
            title: selector("div.page-title")?,
            description: selector("div.product-description")?,
            nameplate: selector("table.nameplate")?,
            row: selector("tr")?,
            header_cell: selector("th")?,
            data_cell: selector("td")?,
            parts_tab: selector(r#"div[data-tab="parts"]"#)?,
            parts_table: selector("table.data-table")?,
            parts_row: selector("tbody tr")?,
            image: selector(".product-image")?,
            manual: selector(r#"a#infoPacket"#)?,
        })
    }

    pub fn parse(&self, html: &str, page_url: &Url) -> ProductRecord {
        let document = Html::parse_document(html);

        let product_id = self
            .first_text(&document, &self.title)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| {
                warn!("No product title found on {}", page_url);
                UNIDENTIFIED.to_string()
            });
        let description = self
            .first_text(&document, &self.description)
            .unwrap_or_default();

        let specs = self.parse_nameplate(&document);
        let bom = self.parse_bom(&document);

        let image_url = self.first_link(&document, &self.image, "src", page_url);
        if image_url.is_empty() {
            warn!("No image element found on {}", page_url);
        }
        let manual_url = self.first_link(&document, &self.manual, "href", page_url);
        if manual_url.is_empty() {
            warn!("No manual link found on {}", page_url);
        }

        debug!(
            "Parsed {}: {} nameplate entries, {} BOM lines",
            product_id,
            specs.len(),
            bom.len()
        );

        ProductRecord {
            product_id,
            description,
            specs,
            bom,
            image_url,
            manual_url,
            image_path: None,
            manual_path: None,
        }
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(stripped_text)
    }

    fn first_link(&self, document: &Html, selector: &Selector, attr: &str, base: &Url) -> String {
        document
            .select(selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(|link| {
                base.join(link)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| link.to_string())
            })
            .unwrap_or_default()
    }

    fn keeps(&self, label: &str) -> bool {
        self.nameplate_keys.is_empty() || self.nameplate_keys.iter().any(|key| key == label)
    }

    fn parse_nameplate(&self, document: &Html) -> Nameplate {
        let mut specs = Nameplate::new();
        let Some(table) = document.select(&self.nameplate).next() else {
            warn!("No specs table (class='nameplate') found");
            return specs;
        };

        for row in table.select(&self.row) {
            let labels = row.select(&self.header_cell).map(stripped_text);
            let values = row.select(&self.data_cell).map(stripped_text);
            for (label, value) in labels.zip(values) {
                if self.keeps(&label) {
                    specs.insert(label.to_lowercase(), value);
                }
            }
        }
        specs
    }

    fn parse_bom(&self, document: &Html) -> Vec<BomLine> {
        let Some(tab) = document.select(&self.parts_tab).next() else {
            warn!("No div with data-tab='parts' found");
            return Vec::new();
        };
        let Some(table) = tab.select(&self.parts_table).next() else {
            warn!("No BOM table (class='data-table') found inside parts div");
            return Vec::new();
        };

        table
            .select(&self.parts_row)
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&self.data_cell).map(stripped_text).collect();
                match <[String; 3]>::try_from(cells) {
                    Ok([part_number, description, quantity]) => Some(BomLine {
                        part_number,
                        description,
                        quantity,
                    }),
                    Err(_) => None,
                }
            })
            .collect()
    }
}

//! In-page record extraction
//!
//! The browser only runs a fixed script: selectors go in as JSON data and
//! raw node values come back as a JSON array. Fallbacks are applied here,
//! on the Rust side, in [`ProductRecord::from_raw`].

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

use super::types::{ProductRecord, RawListingItem};

const SELECTORS_PLACEHOLDER: &str = "__SELECTORS__";

const EXTRACTION_SCRIPT: &str = r#"
(function(sel) {
    const text = function(root, selector) {
        const el = root.querySelector(selector);
        return el ? el.innerText : null;
    };
    const items = Array.from(document.querySelectorAll(sel.item));
    return JSON.stringify(items.map(function(item) {
        const anchor = item.querySelector(sel.link);
        const picture = item.querySelector(sel.picture);
        return {
            title: text(item, sel.title),
            originalPrice: text(item, sel.originalPrice),
            finalPrice: text(item, sel.finalPrice),
            discount: text(item, sel.discount),
            imageSrc: picture ? picture.getAttribute('src') : null,
            imageDataSrc: picture ? picture.getAttribute('data-src') : null,
            link: anchor ? anchor.href : null
        };
    }));
})(__SELECTORS__)
"#;

/// CSS selectors for one product card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorSet {
    /// Listing item container, also the readiness marker
    pub item: String,
    pub title: String,
    pub original_price: String,
    /// Final price fraction nested under the current-price block
    pub final_price: String,
    pub discount: String,
    /// `<img>` carrying `src` / `data-src`
    pub picture: String,
    /// Anchor whose `href` is the product link
    pub link: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            item: ".ui-search-layout__item".to_string(),
            title: "a.poly-component__title".to_string(),
            original_price: "span.andes-money-amount__fraction".to_string(),
            final_price: "div.poly-price__current span.andes-money-amount__fraction".to_string(),
            discount: "span.andes-money-amount__discount".to_string(),
            picture: "div.poly-card__portada img.poly-component__picture".to_string(),
            link: "a.poly-component__title".to_string(),
        }
    }
}

/// Script returning the JSON-encoded raw items of the current page
pub fn extraction_script(selectors: &SelectorSet) -> Result<String, ScraperError> {
    let encoded = serde_json::to_string(selectors)
        .map_err(|e| ScraperError::Extraction(format!("selectors not encodable: {}", e)))?;
    Ok(EXTRACTION_SCRIPT.replace(SELECTORS_PLACEHOLDER, &encoded))
}

/// Expression that is `true` once an element matching `selector` exists
pub fn presence_check(selector: &str) -> Result<String, ScraperError> {
    let encoded = serde_json::to_string(selector)
        .map_err(|e| ScraperError::Extraction(format!("selector not encodable: {}", e)))?;
    Ok(format!("document.querySelector({}) !== null", encoded))
}

/// Decode the script output into records, in DOM order.
pub fn decode_items(payload: &str) -> Result<Vec<ProductRecord>, ScraperError> {
    let raw: Vec<RawListingItem> = serde_json::from_str(payload)
        .map_err(|e| ScraperError::Extraction(format!("unexpected item payload: {}", e)))?;

    Ok(raw.into_iter().map(ProductRecord::from_raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::types::{sentinel, TRANSPARENT_GIF_PLACEHOLDER};

    #[test]
    fn test_script_embeds_selectors_as_data() {
        let script = extraction_script(&SelectorSet::default()).unwrap();
        assert!(!script.contains(SELECTORS_PLACEHOLDER));
        assert!(script.contains(r#""item":".ui-search-layout__item""#));
        assert!(script.contains(r#""originalPrice":"span.andes-money-amount__fraction""#));
    }

    #[test]
    fn test_script_quotes_hostile_selectors() {
        let selectors = SelectorSet {
            title: "a[title=\"x\"]".to_string(),
            ..SelectorSet::default()
        };
        let script = extraction_script(&selectors).unwrap();
        assert!(script.contains(r#""title":"a[title=\"x\"]""#));
    }

    #[test]
    fn test_presence_check() {
        assert_eq!(
            presence_check(".ui-search-layout__item").unwrap(),
            r#"document.querySelector(".ui-search-layout__item") !== null"#
        );
    }

    #[test]
    fn test_decode_empty_page() {
        assert!(decode_items("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_keeps_dom_order_and_applies_fallbacks() {
        let payload = serde_json::json!([
            {
                "title": "Primero",
                "originalPrice": "100",
                "finalPrice": "90",
                "discount": "10% OFF",
                "imageSrc": TRANSPARENT_GIF_PLACEHOLDER,
                "imageDataSrc": "https://img/lazy.webp",
                "link": "https://articulo/1"
            },
            {
                "title": null,
                "originalPrice": null,
                "finalPrice": "50",
                "discount": null,
                "imageSrc": TRANSPARENT_GIF_PLACEHOLDER,
                "imageDataSrc": null,
                "link": null
            }
        ])
        .to_string();

        let records = decode_items(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Primero");
        assert_eq!(records[0].image, "https://img/lazy.webp");
        assert_eq!(records[1].title, sentinel::TITLE);
        assert_eq!(records[1].final_price, "50");
        assert_eq!(records[1].image, sentinel::IMAGE);
        assert_eq!(records[1].link, sentinel::LINK);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_items(r#"{"title":"x"}"#).unwrap_err();
        assert!(matches!(err, ScraperError::Extraction(_)));
    }
}

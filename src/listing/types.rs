//! Product records extracted from listing pages

use serde::{Deserialize, Serialize};

/// Placeholder strings substituted when a lookup finds nothing.
///
/// Downstream code detects a missing field by comparing against these.
pub mod sentinel {
    pub const TITLE: &str = "Sin título";
    pub const ORIGINAL_PRICE: &str = "Sin precio original";
    pub const FINAL_PRICE: &str = "Sin precio final";
    pub const DISCOUNT: &str = "Sin descuento";
    pub const IMAGE: &str = "Sin imagen";
    pub const LINK: &str = "Sin enlace";
}

/// 1x1 transparent GIF the site puts in `src` while the real image is lazy-loaded
pub const TRANSPARENT_GIF_PLACEHOLDER: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// One product card as returned by the in-page extraction script.
///
/// Every field is the raw node text or attribute, `None` when the node is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListingItem {
    pub title: Option<String>,
    pub original_price: Option<String>,
    pub final_price: Option<String>,
    pub discount: Option<String>,
    pub image_src: Option<String>,
    pub image_data_src: Option<String>,
    pub link: Option<String>,
}

/// Product record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub original_price: String,
    pub final_price: String,
    pub discount: String,
    pub image: String,
    pub link: String,
}

impl ProductRecord {
    /// Apply the sentinel convention and the lazy-image rule to a raw item.
    pub fn from_raw(raw: RawListingItem) -> Self {
        let image = resolve_image(raw.image_src.as_deref(), raw.image_data_src.as_deref());

        Self {
            title: or_sentinel(raw.title, sentinel::TITLE),
            original_price: or_sentinel(raw.original_price, sentinel::ORIGINAL_PRICE),
            final_price: or_sentinel(raw.final_price, sentinel::FINAL_PRICE),
            discount: or_sentinel(raw.discount, sentinel::DISCOUNT),
            image,
            link: or_sentinel(raw.link, sentinel::LINK),
        }
    }

    /// Names of the fields that hold their placeholder value
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.as_str(), sentinel::TITLE),
            ("originalPrice", self.original_price.as_str(), sentinel::ORIGINAL_PRICE),
            ("finalPrice", self.final_price.as_str(), sentinel::FINAL_PRICE),
            ("discount", self.discount.as_str(), sentinel::DISCOUNT),
            ("image", self.image.as_str(), sentinel::IMAGE),
            ("link", self.link.as_str(), sentinel::LINK),
        ]
        .into_iter()
        .filter(|(_, value, placeholder)| value == placeholder)
        .map(|(name, _, _)| name)
        .collect()
    }
}

// Empty strings are treated as absent, same as a falsy `||` in the page.
fn or_sentinel(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

/// Pick the image URL for a card.
///
/// When `src` is the transparent placeholder the lazy-load `data-src` wins.
pub fn resolve_image(src: Option<&str>, data_src: Option<&str>) -> String {
    let chosen = if src == Some(TRANSPARENT_GIF_PLACEHOLDER) {
        data_src
    } else {
        src
    };

    chosen
        .filter(|v| !v.is_empty())
        .unwrap_or(sentinel::IMAGE)
        .to_string()
}

//! Listing page model: URLs, selectors and product records

mod extract;
mod types;
mod url;

pub use extract::{decode_items, extraction_script, presence_check, SelectorSet};
pub use types::{resolve_image, sentinel, ProductRecord, RawListingItem, TRANSPARENT_GIF_PLACEHOLDER};
pub use url::{listing_url, page_offset, DEFAULT_BASE_URL, DEFAULT_ITEMS_PER_PAGE};

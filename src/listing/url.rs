//! Listing URL construction

/// Default search URL; `{query}` and `{offset}` are substituted per page
pub const DEFAULT_BASE_URL: &str = "https://listado.mercadolibre.com.ar/{query}_Desde_{offset}";

/// Site page size used for offset pagination
pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// 1-based item offset of a 1-based logical page
pub fn page_offset(page_index: u32, items_per_page: usize) -> usize {
    (page_index.saturating_sub(1) as usize) * items_per_page + 1
}

/// Build the listing URL for a logical page.
pub fn listing_url(template: &str, query: &str, page_index: u32, items_per_page: usize) -> String {
    let encoded = urlencoding::encode(query);
    template
        .replace("{query}", &encoded)
        .replace("{offset}", &page_offset(page_index, items_per_page).to_string())
}

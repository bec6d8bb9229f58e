//! Path to logical page key mapping
//!
//! A static table covers the fixed app pages. Two dynamic detail-page
//! prefixes are special-cased: any single-segment slug under them
//! resolves to a fixed logical key no matter what the slug is. Paths
//! outside the table have no logical page and fall back to the legacy
//! render path.

/// Fixed pages.
const PAGE_KEYS: &[(&str, &str)] = &[
    ("/", "home"),
    ("/about", "about"),
    ("/contact", "contact"),
    ("/search", "search"),
    ("/businesses", "business-index"),
    ("/places", "place-index"),
    ("/categories", "category-index"),
    ("/services", "service-index"),
    ("/booking", "booking"),
];

/// Dynamic detail pages: one slug segment under the prefix, fixed key.
const DETAIL_KEYS: &[(&str, &str)] = &[
    ("/businesses/", "business-detail"),
    ("/places/", "place-detail"),
];

/// Maps a request path to its logical page key.
pub fn page_key_for(path: &str) -> Option<&'static str> {
    for (prefix, key) in DETAIL_KEYS {
        if let Some(slug) = path.strip_prefix(prefix)
            && !slug.is_empty()
            && !slug.contains('/')
        {
            return Some(key);
        }
    }
    PAGE_KEYS
        .iter()
        .find(|(page, _)| *page == path)
        .map(|(_, key)| *key)
}

//! Shared cache-control policies for HTTP handlers.

/// Search results may be reused briefly by intermediaries.
pub const PUBLIC_SHORT_LIVED: &str = "public, max-age=60";

/// Admin and diagnostic responses are never stored.
pub const NO_STORE: &str = "no-store";

/// Build the cache-control header tuple for search responses.
pub const fn public_short_lived_header() -> (&'static str, &'static str) {
    ("Cache-Control", PUBLIC_SHORT_LIVED)
}

/// Build the cache-control header tuple for admin responses.
pub const fn no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_STORE)
}

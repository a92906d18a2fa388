// src/release/mod.rs

//! Release version discovery
//!
//! Content paths carry a `$releasever` placeholder. The CDN publishes, next
//! to each placeholder position, a `listing` file naming the release versions
//! it serves. Discovery filters entitled content by the tags of the installed
//! products, collapses the remaining paths into unique base paths, and merges
//! the listings found there.

mod cdn;
mod listing;
mod tags;

pub use cdn::{discover_releases, list_releases};
pub use listing::{
    LISTING_FILE, RELEASEVER, derive_listing_paths, get_listing_path, listing_url, parse_listing,
};
pub use tags::is_any_required_tag_provided;

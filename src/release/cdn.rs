// src/release/cdn.rs

//! Release discovery from CDN listing files

use super::listing::{derive_listing_paths, listing_url, parse_listing};
use crate::client::Transport;
use crate::content::ProductCatalog;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Fetch the listing of every base path and merge the releases
///
/// `transport` is `None` when the system has no identity to authenticate
/// with; that is the only error. A listing that cannot be fetched or is not
/// served with HTTP 200 is logged and contributes nothing, so the result may
/// be empty without being an error.
pub fn list_releases<'p>(
    transport: Option<&dyn Transport>,
    base_paths: impl IntoIterator<Item = &'p String>,
) -> Result<Vec<String>> {
    let transport = transport.ok_or(Error::NotRegisteredError)?;
    let mut releases = BTreeSet::new();

    for base_path in base_paths {
        let path = listing_url(base_path);

        let response = match transport.get(&path) {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", path, e);
                continue;
            }
        };

        if !response.is_ok() {
            warn!("HTTP {} fetching {}, skipping", response.status, path);
            continue;
        }

        let text = match response.text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Unreadable listing {}: {}", path, e);
                continue;
            }
        };

        let listed = parse_listing(text);
        debug!("{} lists {} releases", path, listed.len());
        releases.extend(listed);
    }

    Ok(releases.into_iter().collect())
}

/// Releases available for the entitled content matching `provided_tags`
pub fn discover_releases<P: AsRef<str>>(
    transport: Option<&dyn Transport>,
    catalog: &ProductCatalog,
    provided_tags: &[P],
) -> Result<Vec<String>> {
    if transport.is_none() {
        return Err(Error::NotRegisteredError);
    }

    let base_paths = derive_listing_paths(catalog, provided_tags);
    info!("Checking {} listing paths for releases", base_paths.len());

    let releases = list_releases(transport, &base_paths)?;
    info!("Found {} available releases", releases.len());
    Ok(releases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Response;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapTransport {
        responses: HashMap<String, Response>,
        requested: RefCell<Vec<String>>,
    }

    impl MapTransport {
        fn with(mut self, path: &str, status: u16, body: &str) -> Self {
            self.responses.insert(path.to_string(), Response::new(status, body));
            self
        }
    }

    impl Transport for MapTransport {
        fn get(&self, path: &str) -> Result<Response> {
            self.requested.borrow_mut().push(path.to_string());
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| Error::DownloadError(format!("connection refused: {path}")))
        }
    }

    fn paths(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_not_registered_before_any_request() {
        let result = list_releases(None, &paths(&["/a/"]));
        assert!(matches!(result, Err(Error::NotRegisteredError)));

        let result = discover_releases::<&str>(None, &ProductCatalog::new(), &[]);
        assert!(matches!(result, Err(Error::NotRegisteredError)));
    }

    #[test]
    fn test_union_sorted() {
        let transport = MapTransport::default()
            .with("/a/listing", 200, "10.1\n10.0\n")
            .with("/b/listing", 200, "# releases\n9\n10.0\n");

        let releases = list_releases(Some(&transport), &paths(&["/a/", "/b/"])).unwrap();
        assert_eq!(releases, vec!["10.0", "10.1", "9"]);
    }

    #[test]
    fn test_failing_paths_are_skipped() {
        let transport = MapTransport::default()
            .with("/a/listing", 200, "10.0\n")
            .with("/b/listing", 404, "not found")
            .with("/c/listing", 200, "");

        let releases =
            list_releases(Some(&transport), &paths(&["/a/", "/b/", "/c/", "/down/"])).unwrap();
        assert_eq!(releases, vec!["10.0"]);
        assert_eq!(transport.requested.borrow().len(), 4);
    }

    #[test]
    fn test_all_paths_failing_is_empty() {
        let transport = MapTransport::default().with("/a/listing", 500, "10.0");
        let releases = list_releases(Some(&transport), &paths(&["/a/", "/b/"])).unwrap();
        assert!(releases.is_empty());
    }
}

//! HTTP adapters built on `reqwest`.
//!
//! - `ReqwestEventTransport` - Opens `text/event-stream` connections
//! - `ReqwestConnectivityProbe` - HEAD request against a stable endpoint
//! - `HttpProjectStore` - REST-backed project data with in-place status patches

mod http_project_store;
mod reqwest_connectivity_probe;
mod reqwest_event_transport;

pub use http_project_store::{Frame, HttpProjectStore, ProjectData};
pub use reqwest_connectivity_probe::ReqwestConnectivityProbe;
pub use reqwest_event_transport::ReqwestEventTransport;

use reqwest::Url;

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("{}: {}", base, e))?;
    url.path_segments_mut()
        .map_err(|_| format!("{}: cannot be a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_handles_trailing_slash() {
        let url = join_segments("https://api.example.com/v1/", &["projects", "p1", "events"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/projects/p1/events");
    }

    #[test]
    fn join_segments_encodes_ids() {
        let url = join_segments("https://api.example.com", &["projects", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/projects/a%20b%2Fc");
    }

    #[test]
    fn join_segments_rejects_garbage() {
        assert!(join_segments("not a url", &["x"]).is_err());
        assert!(join_segments("mailto:someone@example.com", &["x"]).is_err());
    }
}

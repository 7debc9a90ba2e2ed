//! Recipe-Search Backend Abstraction
//!
//! Trait definitions and implementations for the external graph-search
//! backend. The engine never performs searches itself; it consumes whatever
//! the backend returns, linear paths or nested trees, through one seam.
//!
//! Implementations:
//! - [`HttpSearchBackend`]: the real backend over its REST API (reqwest)
//! - [`FixtureBackend`]: a built-in recipe set for tests and the demo

pub mod fixture;
pub mod http;
pub mod traits;

pub use fixture::FixtureBackend;
pub use http::HttpSearchBackend;
pub use traits::SearchBackend;

/// Minimal percent-escaping for element names used as a URL path segment
pub(crate) fn escape_path_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            ' ' => escaped.push_str("%20"),
            '?' => escaped.push_str("%3F"),
            '#' => escaped.push_str("%23"),
            '/' => escaped.push_str("%2F"),
            other => escaped.push(other),
        }
    }
    escaped
}

//! HTTP header constants for the event stream endpoint
//!
//! Every response from the stream path carries the permissive CORS headers;
//! streaming responses additionally carry the event-stream headers.

use ::http::header::{self, HeaderMap, HeaderValue};
use ::http::Version;

pub use header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONNECTION, CONTENT_TYPE,
};

/// Allow any origin
pub const ALLOW_ANY_ORIGIN: &str = "*";

/// Methods the stream path answers
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// Request headers clients may send
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Caching is disabled for the stream
pub const NO_CACHE: &str = "no-cache";

/// The connection stays open for the life of the stream
pub const KEEP_ALIVE: &str = "keep-alive";

/// Content types
pub mod content_types {
    pub const EVENT_STREAM: &str = "text/event-stream";
    pub const JSON: &str = "application/json";
}

/// Insert the cross-origin headers sent on every response
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ANY_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}

/// Insert the headers that mark a response as an incremental event stream.
///
/// HTTP/1.0 bodies of unknown length are delimited by closing the
/// connection, so no keep-alive is advertised to those clients.
pub fn apply_event_stream(headers: &mut HeaderMap, version: Version) {
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_types::EVENT_STREAM),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    if version != Version::HTTP_10 {
        headers.insert(CONNECTION, HeaderValue::from_static(KEEP_ALIVE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_headers() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[test]
    fn test_event_stream_headers() {
        let mut headers = HeaderMap::new();
        apply_event_stream(&mut headers, Version::HTTP_11);

        assert_eq!(headers[CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[CONNECTION], "keep-alive");
    }

    #[test]
    fn test_http10_event_stream_is_close_delimited() {
        let mut headers = HeaderMap::new();
        apply_event_stream(&mut headers, Version::HTTP_10);

        assert_eq!(headers[CONTENT_TYPE], "text/event-stream");
        assert!(headers.get(CONNECTION).is_none());
    }
}

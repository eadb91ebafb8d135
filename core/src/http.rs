//! HTTP request/response values and the transport seam.
//!
//! # Design
//! Services describe every call as a plain `HttpRequest`. Executing it is the
//! job of a `Transport`, so request construction stays deterministic and can
//! be asserted on without a network. The production transport lives in
//! `transport.rs`; tests substitute scripted ones.

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` holds the absolute URL including any query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `status_text` carries the reason phrase when the transport knows it; it is
/// the last-resort source for error messages.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a request and hands back the response as data.
///
/// Implementations must return non-2xx responses as `Ok`; status
/// interpretation belongs to `ApiClient`. `Err` is reserved for transport
/// failures (DNS, connection, timeout).
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Accumulates `key=value` pairs into an encoded query string.
#[derive(Debug, Default, Clone)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Push only when a value is present. Blank strings count as absent.
    pub fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.trim().is_empty() => self.push(key, v),
            _ => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `?a=1&b=2`, or an empty string when no pairs were pushed.
    pub fn render(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_renders_nothing() {
        assert_eq!(QueryString::new().render(), "");
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let q = QueryString::new()
            .push("searchTerm", "rust & go")
            .push("pageNumber", 2);
        assert_eq!(q.render(), "?searchTerm=rust%20%26%20go&pageNumber=2");
    }

    #[test]
    fn push_opt_skips_none_and_blank() {
        let q = QueryString::new()
            .push_opt("status", None::<&str>)
            .push_opt("searchTerm", Some("   "))
            .push_opt("categoryId", Some("c-1"));
        assert_eq!(q.render(), "?categoryId=c-1");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost/appointments".to_string(),
            headers: vec![("Authorization".to_string(), "Bearer t".to_string())],
            body: None,
        };
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        let mut res = HttpResponse { status: 204, ..Default::default() };
        assert!(res.is_success());
        res.status = 302;
        assert!(!res.is_success());
    }
}

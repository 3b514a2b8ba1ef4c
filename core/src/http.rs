//! HTTP request and response types described as plain data.
//!
//! # Design
//! `FlinkClient::build_*` methods produce `HttpRequest` values without
//! touching the network; a `Transport` executes them. Keeping the request
//! as data lets tests assert the exact method, URL, query and body of every
//! operation without a server.
//!
//! All fields use owned types so a request can be handed to any transport
//! without lifetime concerns. Bodies are bytes because jar uploads are binary.

use std::fmt;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the resolved address plus path, without a query string. Query
/// parameters stay as ordered pairs until `full_url` renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A request with no query, headers or body.
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The URL with the query string appended, form-urlencoded.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{query}", self.url)
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Return the body of a 2xx response, or an `HttpError` carrying the status
/// and the body text for anything else.
pub fn check_status(response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(response.body);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_range_returns_raw_body() {
        for status in [200, 201, 202, 204, 299] {
            let body = check_status(response(status, "raw")).unwrap();
            assert_eq!(body, b"raw", "status {status}");
        }
    }

    #[test]
    fn outside_success_range_is_http_error() {
        for status in [100, 199, 300, 301, 404, 409, 500, 503] {
            let err = check_status(response(status, "nope")).unwrap_err();
            match err {
                ApiError::HttpError { status: s, body } => {
                    assert_eq!(s, status);
                    assert_eq!(body, "nope");
                }
                other => panic!("status {status}: unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn full_url_without_query_is_unchanged() {
        let req = HttpRequest::new(HttpMethod::Get, "http://localhost:8081/jobs".to_string());
        assert_eq!(req.full_url(), "http://localhost:8081/jobs");
    }

    #[test]
    fn full_url_encodes_query_pairs_in_order() {
        let mut req = HttpRequest::new(
            HttpMethod::Get,
            "http://localhost:8081/jobs/metrics".to_string(),
        );
        req.query.push(("get".to_string(), "a,b".to_string()));
        req.query.push(("agg".to_string(), "min max".to_string()));
        assert_eq!(
            req.full_url(),
            "http://localhost:8081/jobs/metrics?get=a%2Cb&agg=min+max"
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut req = HttpRequest::new(HttpMethod::Post, "http://h/x".to_string());
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }
}

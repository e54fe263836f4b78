//! Request field extraction.
//!
//! Fields come from the URL query string and from form bodies, either
//! `application/x-www-form-urlencoded` or `multipart/form-data`. They are
//! merged into one ordered parameter list and the first value registered for a
//! name wins. The order is url-encoded body values, then query values, then
//! multipart text fields.

use std::convert::Infallible;

use bytes::Bytes;
use futures::stream;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Uri};
use tracing::warn;
use url::form_urlencoded;

/// Media type of form-encoded bodies.
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Media type of multipart form bodies.
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Anything a single string value can be extracted from by field name.
pub trait FieldSource {
    /// First value registered for `name`, or `""` when absent.
    fn field_value(&self, name: &str) -> &str;
}

/// How a request body contributes form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormBody {
    /// The body carries no form fields.
    None,
    /// Form-urlencoded body of a POST, PUT or PATCH request.
    UrlEncoded,
    /// `multipart/form-data` body, whatever the method.
    Multipart { boundary: String },
}

impl FormBody {
    /// Classify a request by method and `Content-Type`.
    ///
    /// A multipart content type without a usable boundary yields
    /// [`FormBody::None`].
    pub fn of(method: &Method, headers: &HeaderMap) -> Self {
        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return Self::None;
        };
        let media = content_type.split(';').next().unwrap_or("").trim();

        if media.eq_ignore_ascii_case(FORM_URLENCODED) {
            if matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
                return Self::UrlEncoded;
            }
            return Self::None;
        }

        if media.eq_ignore_ascii_case(MULTIPART_FORM_DATA) {
            return match multer::parse_boundary(content_type) {
                Ok(boundary) => Self::Multipart { boundary },
                Err(e) => {
                    warn!(error = %e, "Multipart body without boundary, ignoring it");
                    Self::None
                }
            };
        }

        Self::None
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Ordered, decoded request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    params: Vec<(String, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        params.extend_encoded(query.as_bytes());
        params
    }

    /// Build the url-encoded part of a request's parameter space: the
    /// form-urlencoded body when [`FormBody::of`] says so, then the query.
    ///
    /// Multipart bodies need [`FormParams::from_request`].
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut params = Self::new();
        if FormBody::of(method, headers) == FormBody::UrlEncoded {
            params.extend_encoded(body);
        }
        if let Some(query) = uri.query() {
            params.extend_encoded(query.as_bytes());
        }
        params
    }

    /// Build the full parameter space of a request, multipart text fields
    /// included.
    pub async fn from_request(
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Self {
        let mut params = Self::from_parts(method, uri, headers, &body);
        if let FormBody::Multipart { boundary } = FormBody::of(method, headers) {
            params.extend_multipart(boundary, body).await;
        }
        params
    }

    /// Append every pair of a form-urlencoded byte string.
    pub fn extend_encoded(&mut self, encoded: &[u8]) {
        self.params.extend(
            form_urlencoded::parse(encoded).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Append the text fields of a multipart body.
    ///
    /// File parts are skipped. A malformed body stops parsing and keeps the
    /// fields read so far.
    pub async fn extend_multipart(&mut self, boundary: String, body: Bytes) {
        let chunks = stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(chunks, boundary);

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Malformed multipart body");
                    break;
                }
            };

            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.text().await {
                Ok(value) => self.params.push((name, value)),
                Err(e) => {
                    warn!(field = %name, error = %e, "Unreadable multipart field");
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FieldSource for FormParams {
    fn field_value(&self, name: &str) -> &str {
        if name.is_empty() {
            return "";
        }
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

/// Whether a request with this method and headers may carry form fields in
/// its body.
pub fn carries_form_body(method: &Method, headers: &HeaderMap) -> bool {
    !FormBody::of(method, headers).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_query_decoding() {
        let params = FormParams::from_query("a=hello+world&b=%2Fetc%2Fpasswd&c=");
        assert_eq!(params.field_value("a"), "hello world");
        assert_eq!(params.field_value("b"), "/etc/passwd");
        assert_eq!(params.field_value("c"), "");
        assert_eq!(params.field_value("missing"), "");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_first_value_wins() {
        let params = FormParams::from_query("f=one&f=two");
        assert_eq!(params.field_value("f"), "one");
    }

    #[test]
    fn test_empty_name_is_absent() {
        let params = FormParams::from_query("=sneaky");
        assert_eq!(params.field_value(""), "");
    }

    #[test]
    fn test_body_precedes_query() {
        let uri: Uri = "/submit?account=from-query&q=1".parse().unwrap();
        let params = FormParams::from_parts(
            &Method::POST,
            &uri,
            &form_headers(),
            b"account=from-body",
        );
        assert_eq!(params.field_value("account"), "from-body");
        assert_eq!(params.field_value("q"), "1");
    }

    #[test]
    fn test_body_ignored_for_get() {
        let uri: Uri = "/submit".parse().unwrap();
        let params = FormParams::from_parts(&Method::GET, &uri, &form_headers(), b"account=x");
        assert!(params.is_empty());
    }

    #[test]
    fn test_body_ignored_without_form_content_type() {
        let uri: Uri = "/submit".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let params = FormParams::from_parts(&Method::POST, &uri, &headers, b"account=x");
        assert_eq!(params.field_value("account"), "");
    }

    #[test]
    fn test_carries_form_body() {
        assert!(carries_form_body(&Method::PUT, &form_headers()));
        assert!(carries_form_body(&Method::PATCH, &form_headers()));
        assert!(!carries_form_body(&Method::DELETE, &form_headers()));
        assert!(!carries_form_body(&Method::POST, &HeaderMap::new()));

        let mut upper = HeaderMap::new();
        upper.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/X-WWW-Form-URLEncoded"),
        );
        assert!(carries_form_body(&Method::POST, &upper));
    }

    const BOUNDARY: &str = "X-FIELD-FILTER";

    fn multipart_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=X-FIELD-FILTER"),
        );
        headers
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Bytes::from(body)
    }

    #[test]
    fn test_form_body_kinds() {
        assert_eq!(FormBody::of(&Method::POST, &form_headers()), FormBody::UrlEncoded);
        assert_eq!(FormBody::of(&Method::GET, &form_headers()), FormBody::None);
        assert_eq!(
            FormBody::of(&Method::PUT, &multipart_headers()),
            FormBody::Multipart {
                boundary: BOUNDARY.to_string()
            }
        );

        let mut no_boundary = HeaderMap::new();
        no_boundary.insert(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
        assert!(FormBody::of(&Method::POST, &no_boundary).is_none());
        assert!(carries_form_body(&Method::POST, &multipart_headers()));
    }

    #[tokio::test]
    async fn test_multipart_text_fields_extracted() {
        let uri: Uri = "/upload".parse().unwrap();
        let body = multipart_body(&[
            ("parameter", None, "invalid"),
            ("attachment", Some("notes.txt"), "file contents"),
            ("other", None, "1"),
        ]);

        let params =
            FormParams::from_request(&Method::POST, &uri, &multipart_headers(), body).await;

        assert_eq!(params.field_value("parameter"), "invalid");
        assert_eq!(params.field_value("other"), "1");
        assert_eq!(params.field_value("attachment"), "");
        assert_eq!(params.len(), 2);
    }

    #[tokio::test]
    async fn test_query_precedes_multipart() {
        let uri: Uri = "/upload?account=from-query".parse().unwrap();
        let body = multipart_body(&[("account", None, "from-body"), ("note", None, "hi")]);

        let params =
            FormParams::from_request(&Method::POST, &uri, &multipart_headers(), body).await;

        assert_eq!(params.field_value("account"), "from-query");
        assert_eq!(params.field_value("note"), "hi");
    }

    #[tokio::test]
    async fn test_malformed_multipart_keeps_query() {
        let uri: Uri = "/upload?q=1".parse().unwrap();
        let params = FormParams::from_request(
            &Method::POST,
            &uri,
            &multipart_headers(),
            Bytes::from_static(b"not a multipart body"),
        )
        .await;

        assert_eq!(params.field_value("q"), "1");
        assert_eq!(params.len(), 1);
    }

    #[tokio::test]
    async fn test_from_request_matches_from_parts_for_urlencoded() {
        let uri: Uri = "/submit?account=from-query".parse().unwrap();
        let body = Bytes::from_static(b"account=from-body");

        let full =
            FormParams::from_request(&Method::POST, &uri, &form_headers(), body.clone()).await;

        assert_eq!(
            full,
            FormParams::from_parts(&Method::POST, &uri, &form_headers(), &body)
        );
    }
}

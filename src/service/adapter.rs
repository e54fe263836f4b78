//! Format adapter for the `run` command.
//!
//! Turns the JSON request description read from stdin into request
//! parameters, and renders decisions in the selected output format.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::executor::block_on;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use tracing::debug;

use crate::cli::Format;
use crate::domain::{Decision, FormParams, RequestInput};

/// Adapter for converting between format-specific I/O and internal types.
pub struct FormatAdapter {
    format: Format,
}

impl FormatAdapter {
    /// Create a new adapter for the specified format.
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    /// Parse a JSON request description into its merged parameters.
    pub fn parse_input(&self, input: &str) -> Result<FormParams> {
        debug!(raw_input = %input, "Raw request input");

        let request: RequestInput =
            serde_json::from_str(input).map_err(|e| anyhow!("Failed to parse request: {}", e))?;

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| anyhow!("Invalid method '{}': {}", request.method, e))?;
        let uri: Uri = request
            .uri
            .parse()
            .map_err(|e| anyhow!("Invalid uri '{}': {}", request.uri, e))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Invalid header name '{}': {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| anyhow!("Invalid value for header '{}': {}", name, e))?;
            headers.append(name, value);
        }

        // The body is already in memory, so multipart parsing never waits
        let body = Bytes::from(request.body);
        let params = block_on(FormParams::from_request(&method, &uri, &headers, body));

        debug!(
            method = %method,
            uri = %uri,
            params = params.len(),
            "Parsed request input"
        );

        Ok(params)
    }

    /// Format output based on the selected format.
    pub fn format_output(&self, decision: &Decision) -> Result<String> {
        match self.format {
            Format::Json => serde_json::to_string(&decision.clone().into_output())
                .map_err(|e| anyhow!("Failed to serialize output: {}", e)),
            Format::Text => Ok(match decision {
                Decision::Forward => "forward".to_string(),
                Decision::Reject { status, message } => {
                    format!("reject {} {}", status.as_u16(), message)
                }
            }),
        }
    }

    /// Get the exit code for the decision.
    pub fn exit_code(&self, decision: &Decision) -> i32 {
        decision.exit_code()
    }

    /// Format an error message for output.
    /// Unreadable requests are rejected (fail-closed).
    pub fn format_error(&self, message: &str) -> String {
        let error_message = format!("Request error (fail-closed): {}", message);
        match self.format {
            Format::Json => serde_json::json!({
                "decision": "reject",
                "status": 400,
                "message": error_message
            })
            .to_string(),
            Format::Text => format!("reject 400 {}", error_message),
        }
    }

    /// Get the exit code for error scenarios (fail-closed = reject = exit 2).
    pub fn error_exit_code(&self) -> i32 {
        2 // Same as Decision::Reject exit code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldSource;

    #[test]
    fn test_parse_query_input() {
        let adapter = FormatAdapter::new(Format::Json);
        let params = adapter
            .parse_input(r#"{"uri":"/path?parameter=valid"}"#)
            .unwrap();
        assert_eq!(params.field_value("parameter"), "valid");
    }

    #[test]
    fn test_parse_form_body_input() {
        let adapter = FormatAdapter::new(Format::Json);
        let input = r#"{
            "method": "POST",
            "uri": "/submit?account=query",
            "headers": {"Content-Type": "application/x-www-form-urlencoded"},
            "body": "account=body&note=hi"
        }"#;
        let params = adapter.parse_input(input).unwrap();
        assert_eq!(params.field_value("account"), "body");
        assert_eq!(params.field_value("note"), "hi");
    }

    #[test]
    fn test_parse_multipart_body_input() {
        let adapter = FormatAdapter::new(Format::Json);
        let input = r#"{
            "method": "POST",
            "uri": "/upload",
            "headers": {"Content-Type": "multipart/form-data; boundary=b0"},
            "body": "--b0\r\nContent-Disposition: form-data; name=\"account\"\r\n\r\n70000001\r\n--b0--\r\n"
        }"#;
        let params = adapter.parse_input(input).unwrap();
        assert_eq!(params.field_value("account"), "70000001");
    }

    #[test]
    fn test_parse_rejects_bad_method() {
        let adapter = FormatAdapter::new(Format::Json);
        assert!(adapter
            .parse_input(r#"{"method":"GE T","uri":"/"}"#)
            .is_err());
        assert!(adapter.parse_input("not json").is_err());
    }

    #[test]
    fn test_json_output() {
        let adapter = FormatAdapter::new(Format::Json);
        assert_eq!(
            adapter.format_output(&Decision::Forward).unwrap(),
            r#"{"decision":"forward"}"#
        );
        let output = adapter
            .format_output(&Decision::reject("Disallowed content"))
            .unwrap();
        assert!(output.contains(r#""decision":"reject""#));
        assert!(output.contains(r#""status":400"#));
        assert!(output.contains("Disallowed content"));
    }

    #[test]
    fn test_text_output() {
        let adapter = FormatAdapter::new(Format::Text);
        assert_eq!(adapter.format_output(&Decision::Forward).unwrap(), "forward");
        assert_eq!(
            adapter.format_output(&Decision::reject("nope")).unwrap(),
            "reject 400 nope"
        );
    }

    #[test]
    fn test_error_output_is_reject() {
        let adapter = FormatAdapter::new(Format::Json);
        assert!(adapter.format_error("boom").contains(r#""decision":"reject""#));
        assert_eq!(adapter.error_exit_code(), 2);
    }
}

//! Core domain types for request input and filter output.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Request description received on stdin by the `run` command.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestInput {
    /// HTTP method, defaults to GET
    #[serde(default = "default_method")]
    pub method: String,

    /// Request target, including the query string
    pub uri: String,

    /// Request headers (names are matched case-insensitively)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Raw request body
    #[serde(default)]
    pub body: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Decision output written by the `run` command.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutput {
    /// Decision: "forward" or "reject"
    pub decision: String,

    /// HTTP status written on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Response body written on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request unchanged to the next stage
    Forward,
    /// Stop the chain and answer with `status` and `message`
    Reject { status: StatusCode, message: String },
}

impl Decision {
    /// Rejection with bad-request status.
    pub fn reject(message: impl Into<String>) -> Self {
        Decision::Reject {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, Decision::Forward)
    }

    /// Status to write, `None` when forwarded.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Decision::Forward => None,
            Decision::Reject { status, .. } => Some(*status),
        }
    }

    /// Response body to write, `None` when forwarded.
    pub fn body(&self) -> Option<&str> {
        match self {
            Decision::Forward => None,
            Decision::Reject { message, .. } => Some(message),
        }
    }

    /// Convert decision to DecisionOutput.
    pub fn into_output(self) -> DecisionOutput {
        match self {
            Decision::Forward => DecisionOutput {
                decision: "forward".to_string(),
                status: None,
                message: None,
            },
            Decision::Reject { status, message } => DecisionOutput {
                decision: "reject".to_string(),
                status: Some(status.as_u16()),
                message: Some(message),
            },
        }
    }

    /// Get exit code for this decision.
    ///
    /// - Forward: 0
    /// - Reject: 2
    pub fn exit_code(&self) -> i32 {
        match self {
            Decision::Forward => 0,
            Decision::Reject { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_is_bad_request() {
        let decision = Decision::reject("nope");
        assert!(!decision.is_forwarded());
        assert_eq!(decision.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(decision.body(), Some("nope"));
        assert_eq!(decision.exit_code(), 2);
    }

    #[test]
    fn test_forward_output_omits_status() {
        let json = serde_json::to_string(&Decision::Forward.into_output()).unwrap();
        assert_eq!(json, r#"{"decision":"forward"}"#);
        assert_eq!(Decision::Forward.exit_code(), 0);
    }

    #[test]
    fn test_request_input_defaults() {
        let input: RequestInput = serde_json::from_str(r#"{"uri":"/path?a=b"}"#).unwrap();
        assert_eq!(input.method, "GET");
        assert!(input.headers.is_empty());
        assert!(input.body.is_empty());
    }
}

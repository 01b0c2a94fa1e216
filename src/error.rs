use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Provider code signalling an invalid or missing API key.
pub const AUTH_ERROR_CODE: i64 = 1301;

/// Provider code signalling too many concurrent or too frequent requests.
pub const RATE_LIMIT_ERROR_CODE: i64 = 1302;

/// Seconds to wait before retrying a rate-limited request.
pub const RATE_LIMIT_RETRY_AFTER_SECS: u64 = 60;

/// The closed set of failures a vision call can end in.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        code: Option<String>,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
        code: Option<String>,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        details: Option<String>,
        code: Option<String>,
    },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Processing error: {message}")]
    Processing {
        message: String,
        details: Option<String>,
        code: Option<String>,
    },

    #[error("Image file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
}

/// Discriminant of [`VisionError`], for callers that only care which kind failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    RateLimit,
    InvalidRequest,
    Connection,
    Processing,
    FileNotFound,
}

pub type Result<T> = std::result::Result<T, VisionError>;

impl VisionError {
    pub fn authentication(message: impl Into<String>) -> Self {
        VisionError::Authentication {
            message: message.into(),
            code: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        VisionError::InvalidRequest {
            message: message.into(),
            details: None,
            code: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        VisionError::Connection {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        VisionError::Processing {
            message: message.into(),
            details: None,
            code: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, code: Option<String>) -> Self {
        VisionError::RateLimit {
            message: message.into(),
            retry_after: Some(RATE_LIMIT_RETRY_AFTER_SECS),
            code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VisionError::Authentication { .. } => ErrorKind::Authentication,
            VisionError::RateLimit { .. } => ErrorKind::RateLimit,
            VisionError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            VisionError::Connection { .. } => ErrorKind::Connection,
            VisionError::Processing { .. } => ErrorKind::Processing,
            VisionError::FileNotFound { .. } => ErrorKind::FileNotFound,
        }
    }

    /// Opaque provider code, when the provider sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            VisionError::Authentication { code, .. }
            | VisionError::RateLimit { code, .. }
            | VisionError::InvalidRequest { code, .. }
            | VisionError::Processing { code, .. } => code.as_deref(),
            VisionError::Connection { .. } | VisionError::FileNotFound { .. } => None,
        }
    }

    /// Only rate limiting and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VisionError::RateLimit { .. } | VisionError::Connection { .. }
        )
    }
}

/// Map a provider error code to an error kind.
///
/// `1301` is an authentication failure and `1302` is rate limiting. Every other code
/// becomes a `Processing` error that keeps the raw code for the caller.
pub fn classify(code: i64, message: impl Into<String>) -> VisionError {
    let message = message.into();
    let raw = Some(code.to_string());
    match code {
        AUTH_ERROR_CODE => VisionError::Authentication { message, code: raw },
        RATE_LIMIT_ERROR_CODE => VisionError::rate_limited(message, raw),
        _ => VisionError::Processing {
            message,
            details: None,
            code: raw,
        },
    }
}

/// Classify a failed provider response from its HTTP status and optional body error.
///
/// 401 and 429 win over whatever code the body carries. Without a body code, a 400
/// is an invalid request and any other status is a processing failure.
pub fn classify_response(status: StatusCode, code: Option<i64>, message: &str) -> VisionError {
    let raw = code.map(|c| c.to_string());
    match status {
        StatusCode::UNAUTHORIZED => VisionError::Authentication {
            message: message.to_string(),
            code: raw,
        },
        StatusCode::TOO_MANY_REQUESTS => VisionError::rate_limited(message, raw),
        _ => match code {
            Some(known @ (AUTH_ERROR_CODE | RATE_LIMIT_ERROR_CODE)) => classify(known, message),
            Some(other) if status == StatusCode::BAD_REQUEST => VisionError::InvalidRequest {
                message: message.to_string(),
                details: Some(format!("HTTP {status}")),
                code: Some(other.to_string()),
            },
            Some(other) => classify(other, message),
            None if status == StatusCode::BAD_REQUEST => VisionError::InvalidRequest {
                message: message.to_string(),
                details: Some(format!("HTTP {status}")),
                code: None,
            },
            None => VisionError::Processing {
                message: message.to_string(),
                details: Some(format!("HTTP {status}")),
                code: Some(status.as_u16().to_string()),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(classify(1301, "bad key").kind(), ErrorKind::Authentication);
        assert_eq!(classify(1302, "slow down").kind(), ErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_unknown_code_keeps_raw_code() {
        let err = classify(1214, "model not found");
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(err.code(), Some("1214"));
        assert_eq!(err.to_string(), "Processing error: model not found");
    }

    #[test]
    fn test_rate_limit_carries_retry_after() {
        match classify(1302, "busy") {
            VisionError::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(60)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_overrides_body_code() {
        let err = classify_response(StatusCode::UNAUTHORIZED, Some(1302), "nope");
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.code(), Some("1302"));

        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, Some(1301), "busy");
        assert_eq!(err.kind(), ErrorKind::RateLimit);
    }

    #[test]
    fn test_body_code_used_without_override() {
        let err = classify_response(StatusCode::OK, Some(1302), "busy");
        assert_eq!(err.kind(), ErrorKind::RateLimit);

        let err = classify_response(StatusCode::FORBIDDEN, Some(1301), "bad key");
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = classify_response(StatusCode::INTERNAL_SERVER_ERROR, Some(1234), "boom");
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(err.code(), Some("1234"));
    }

    #[test]
    fn test_bad_request_is_invalid_request() {
        let err = classify_response(StatusCode::BAD_REQUEST, Some(1210), "bad param");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.code(), Some("1210"));

        let err = classify_response(StatusCode::BAD_REQUEST, None, "bad param");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_is_retryable() {
        assert!(VisionError::rate_limited("busy", None).is_retryable());
        assert!(VisionError::connection("refused").is_retryable());

        assert!(!VisionError::authentication("bad key").is_retryable());
        assert!(!VisionError::invalid_request("bad").is_retryable());
        assert!(!VisionError::processing("boom").is_retryable());
        assert!(!VisionError::FileNotFound {
            path: PathBuf::from("missing.png")
        }
        .is_retryable());
    }
}

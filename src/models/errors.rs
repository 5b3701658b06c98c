//! Centralized Error Handling Module
//!
//! Every scan-level and API-level failure carries a unique error code so it
//! can be grepped in production logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - TOKEN_xxx: input validation
//! - PRIMARY_xxx / PROVIDER_xxx / SCRAPE_xxx: data source failures
//! - API_xxx: HTTP surface
//! - CFG_xxx: configuration

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors
    // ============================================
    /// Address matches neither chain family
    TokenInvalidAddress,

    // ============================================
    // Data Source Errors
    // ============================================
    /// Market-data provider failed entirely (the only provider failure that fails a scan)
    PrimaryDataUnavailable,
    /// An enrichment provider failed (recovered as absent)
    ProviderUnavailable,
    /// Every feed mirror failed or was rate limited (recovered as empty)
    ScrapeExhausted,
    /// Narrative generation or scan persistence failed (recovered, never surfaced)
    CollaboratorFailed,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value (recovered with the default)
    ConfigInvalidValue,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenInvalidAddress => "TOKEN_INVALID_ADDRESS",

            Self::PrimaryDataUnavailable => "PRIMARY_DATA_UNAVAILABLE",
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::ScrapeExhausted => "SCRAPE_EXHAUSTED",
            Self::CollaboratorFailed => "COLLABORATOR_FAILED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::TokenInvalidAddress | Self::ConfigInvalidValue => 400,
            Self::ApiRateLimited => 429,
            Self::PrimaryDataUnavailable => 502,
            Self::ProviderUnavailable | Self::ScrapeExhausted | Self::CollaboratorFailed => 500,
        }
    }

    /// Check if error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PrimaryDataUnavailable | Self::ApiRateLimited)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Malformed contract address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenInvalidAddress, msg)
    }

    /// Market-data provider unavailable
    pub fn primary_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PrimaryDataUnavailable, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_address("not an address");
        assert_eq!(err.code, ErrorCode::TokenInvalidAddress);
        assert_eq!(err.code_str(), "TOKEN_INVALID_ADDRESS");
        assert!(err.to_string().starts_with("[TOKEN_INVALID_ADDRESS]"));
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::PrimaryDataUnavailable.is_retryable());
        assert!(ErrorCode::ApiRateLimited.is_retryable());
        assert!(!ErrorCode::TokenInvalidAddress.is_retryable());
        assert!(!ErrorCode::CollaboratorFailed.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::TokenInvalidAddress.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::PrimaryDataUnavailable.http_status(), 502);
        assert_eq!(ErrorCode::ProviderUnavailable.http_status(), 500);
    }
}

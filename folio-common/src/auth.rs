//! HTTP Basic authentication for the admin panel
//!
//! # Pure Functions
//!
//! This module contains ONLY header parsing and credential comparison.
//! The axum middleware that turns these results into 401/500 responses lives
//! in `folio-web`.
//!
//! # Timing
//!
//! Credential checks never exit early. Both the candidate and the expected
//! value are zero-padded to a common length and compared with
//! [`subtle::ConstantTimeEq`]; the lengths are compared separately, also in
//! constant time, and username and password results are combined without
//! short-circuiting. Elapsed time depends on the longer of the two lengths,
//! never on where the first differing byte sits.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use subtle::{Choice, ConstantTimeEq};

// ========================================
// Error Types
// ========================================

/// Why an `Authorization` header was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasicAuthError {
    /// No `Authorization` header present
    MissingHeader,

    /// Header present but not a well-formed `Basic` credential
    Malformed(String),

    /// Well-formed, but username or password does not match
    InvalidCredentials,
}

impl fmt::Display for BasicAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicAuthError::MissingHeader => write!(f, "Authentication required"),
            BasicAuthError::Malformed(reason) => write!(f, "Malformed credentials: {}", reason),
            BasicAuthError::InvalidCredentials => write!(f, "Invalid credentials."),
        }
    }
}

impl std::error::Error for BasicAuthError {}

// ========================================
// Header Parsing
// ========================================

/// Username and password decoded from a `Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decode an `Authorization` header value of the form `Basic base64(user:pass)`
///
/// The scheme name is matched case-insensitively. The password may itself
/// contain `:`; only the first colon separates the two parts.
///
/// # Examples
///
/// ```
/// use folio_common::auth::parse_basic_auth;
///
/// // "admin:s3cret"
/// let creds = parse_basic_auth("Basic YWRtaW46czNjcmV0").unwrap();
/// assert_eq!(creds.username, "admin");
/// assert_eq!(creds.password, "s3cret");
///
/// assert!(parse_basic_auth("Bearer abc").is_err());
/// ```
pub fn parse_basic_auth(header: &str) -> Result<BasicCredentials, BasicAuthError> {
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| BasicAuthError::Malformed("missing scheme".to_string()))?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(BasicAuthError::Malformed(format!(
            "unsupported scheme {}",
            scheme
        )));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BasicAuthError::Malformed(format!("invalid base64: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| BasicAuthError::Malformed("credentials are not UTF-8".to_string()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| BasicAuthError::Malformed("missing ':' separator".to_string()))?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

// ========================================
// Constant-Time Comparison
// ========================================

fn ct_eq_padded(candidate: &[u8], expected: &[u8]) -> Choice {
    let len = candidate.len().max(expected.len());

    let mut a = vec![0u8; len];
    a[..candidate.len()].copy_from_slice(candidate);
    let mut b = vec![0u8; len];
    b[..expected.len()].copy_from_slice(expected);

    let same_content = a.as_slice().ct_eq(b.as_slice());
    let same_length = (candidate.len() as u64).ct_eq(&(expected.len() as u64));
    same_content & same_length
}

/// Compare two byte strings without leaking the position of a mismatch
///
/// ```
/// use folio_common::auth::constant_time_eq;
///
/// assert!(constant_time_eq(b"secret", b"secret"));
/// assert!(!constant_time_eq(b"secret", b"secreT"));
/// // Zero padding must not make a shorter value match
/// assert!(!constant_time_eq(b"secret", b"secret\0"));
/// ```
pub fn constant_time_eq(candidate: &[u8], expected: &[u8]) -> bool {
    ct_eq_padded(candidate, expected).into()
}

// ========================================
// Admin Credentials
// ========================================

/// The configured admin account
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check supplied credentials against the configured account
    ///
    /// Both fields are always compared.
    pub fn verify(&self, supplied: &BasicCredentials) -> bool {
        let user_ok = ct_eq_padded(supplied.username.as_bytes(), self.username.as_bytes());
        let pass_ok = ct_eq_padded(supplied.password.as_bytes(), self.password.as_bytes());
        (user_ok & pass_ok).into()
    }

    /// Parse an optional header value and verify it in one step
    pub fn authenticate(&self, header: Option<&str>) -> Result<(), BasicAuthError> {
        let header = header.ok_or(BasicAuthError::MissingHeader)?;
        let supplied = parse_basic_auth(header)?;
        if self.verify(&supplied) {
            Ok(())
        } else {
            Err(BasicAuthError::InvalidCredentials)
        }
    }
}

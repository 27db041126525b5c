//! Authentication service for the admin API.

use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

const GENERATED_TOKEN_LENGTH: usize = 40;

/// Service for authenticating admin API requests via Bearer tokens.
///
/// The configured token is never kept in memory. Only its HMAC-SHA256 under
/// a random per-process key is stored, and presented tokens are checked with
/// a constant-time MAC comparison. Without a configured token every request
/// is rejected.
pub struct AuthService {
    key: [u8; 32],
    expected_mac: Option<Vec<u8>>,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `admin_token` - the accepted Bearer token; `None` locks the API
    pub fn new(admin_token: Option<&str>) -> Self {
        let mut key = [0u8; 32];
        rand::rng().fill(&mut key);

        let mut service = Self {
            key,
            expected_mac: None,
        };
        service.expected_mac = admin_token
            .filter(|token| !token.is_empty())
            .map(|token| service.mac(token).finalize().into_bytes().to_vec());
        service
    }

    fn mac(&self, token: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        mac
    }

    /// Returns true if an admin token is configured.
    pub fn is_enabled(&self) -> bool {
        self.expected_mac.is_some()
    }

    /// Authenticates a raw Bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if:
    /// - No admin token is configured
    /// - The token does not match
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        let Some(expected) = &self.expected_mac else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Admin API is disabled"}),
            ));
        };

        self.mac(token).verify_slice(expected).map_err(|_| {
            AppError::unauthorized("Unauthorized", json!({"reason": "Invalid token"}))
        })
    }

    /// Generates a random alphanumeric token suitable for `ADMIN_TOKEN`.
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

use axum_extra::extract::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Name of the cookie carrying the signed credential.
pub const TOKEN_COOKIE: &str = "token";

/// Decoded credential payload, kept exactly as it was signed.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Why a credential was turned away.
///
/// The variants exist for diagnostics only. Callers see a single outcome
/// (`reason()` / HTTP 401) whichever check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("no credential cookie")]
    MissingCredential,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("credential expired")]
    Expired,
    #[error("credential not yet valid")]
    NotYetValid,
    #[error("malformed credential")]
    Malformed,
}

impl GateError {
    /// Caller-facing reason, identical for every variant.
    pub fn reason(&self) -> &'static str {
        "invalid_or_expired"
    }

    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::Malformed => "malformed",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for GateError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed,
        }
    }
}

/// Shared-secret (HMAC) credential verifier.
///
/// - Built once at startup and shared read-only between requests.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenGate {
    decoding_key: DecodingKey,
    validation: Validation,
    log_rejections: bool,
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenGate")
            .field("validation", &self.validation)
            .field("log_rejections", &self.log_rejections)
            .finish()
    }
}

impl TokenGate {
    pub fn new(secret: &SecretString, leeway_seconds: u64, log_rejections: bool) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant the shared secret could have signed with.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // `exp`/`nbf` are enforced when present, but not demanded.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // No audience is configured for this service.
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
            log_rejections,
        }
    }

    /// Verify the `token` cookie of a request and return its claims.
    ///
    /// This is the entry-point for middleware/handlers. It never panics: every
    /// failure comes back as a `GateError`.
    pub fn verify(&self, cookies: &CookieJar) -> Result<Claims, GateError> {
        match cookies.get(TOKEN_COOKIE) {
            Some(cookie) => self.verify_token(cookie.value()),
            None => {
                self.record_rejection(GateError::MissingCredential);
                Err(GateError::MissingCredential)
            }
        }
    }

    /// Verify a raw credential string.
    pub fn verify_token(&self, token: &str) -> Result<Claims, GateError> {
        let token = token.trim();
        let outcome = if token.is_empty() {
            Err(GateError::MissingCredential)
        } else {
            self.decode(token)
        };

        if let Err(err) = &outcome {
            self.record_rejection(*err);
        }
        outcome
    }

    fn decode(&self, token: &str) -> Result<Claims, GateError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    // Only the failure kind is recorded, never the token or cookie contents.
    fn record_rejection(&self, err: GateError) {
        if self.log_rejections {
            tracing::warn!(kind = err.kind(), reason = err.reason(), "credential rejected");
        } else {
            tracing::debug!(kind = err.kind(), reason = err.reason(), "credential rejected");
        }
    }
}

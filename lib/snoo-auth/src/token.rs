//! Access token state and its swap-on-write store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::SecureString;
use crate::error::RequestFailure;

/// Scopes granted to an access token, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(IndexSet<String>);

impl Scopes {
    /// Parses a comma separated list of scopes, e.g. `"identity,read"`.
    ///
    /// Blank entries are ignored and duplicates collapsed.
    pub fn parse(raw: &str) -> Self {
        let scopes = raw
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .map(ToString::to_string)
            .collect();
        Self(scopes)
    }

    /// Returns `true` if the scope was granted.
    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, scope) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(scope)?;
        }
        Ok(())
    }
}

/// A successfully acquired access token.
///
/// Immutable: a new authentication produces a new `TokenState` that replaces
/// the previous one as a whole.
#[derive(Clone)]
pub struct TokenState {
    access_token: SecureString,
    scopes: Scopes,
    issued_at: Timestamp,
    expires_at: Timestamp,
}

impl TokenState {
    /// Creates a token issued at `issued_at`, valid for `expires_in`.
    ///
    /// # Errors
    ///
    /// Fails if the expiry cannot be represented as a timestamp.
    pub fn new(
        access_token: impl Into<SecureString>,
        scopes: Scopes,
        issued_at: Timestamp,
        expires_in: SignedDuration,
    ) -> Result<Self, jiff::Error> {
        let expires_at = issued_at.checked_add(expires_in)?;
        Ok(Self {
            access_token: access_token.into(),
            scopes,
            issued_at,
            expires_at,
        })
    }

    pub(crate) fn from_response(
        response: TokenResponse,
        issued_at: Timestamp,
    ) -> Result<Self, RequestFailure> {
        let TokenResponse {
            access_token,
            scope,
            expires_in,
        } = response;
        let state = Self::new(
            access_token,
            Scopes::parse(&scope),
            issued_at,
            SignedDuration::from_secs(expires_in),
        )?;
        Ok(state)
    }

    /// The bearer token to present in the `Authorization` header.
    pub fn access_token(&self) -> &SecureString {
        &self.access_token
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Returns `true` if the token was granted the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// When the token stops being accepted by the server.
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Checks if the token is expired.
    pub fn is_expired(&self) -> bool {
        Timestamp::now() >= self.expires_at
    }

    /// Returns the time left before expiry, `None` once expired.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        if remaining.is_positive() {
            Duration::try_from(remaining).ok()
        } else {
            None
        }
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful answer of the token endpoint.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) scope: String,
    pub(crate) expires_in: i64,
}

/// Error answer of the token endpoint (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Decodes the token endpoint body.
///
/// The auth host may answer `200 OK` with an error object, so the `error`
/// member is checked before looking for the token fields.
pub(crate) fn parse_token_response(body: &str) -> Result<TokenResponse, RequestFailure> {
    let value = parse_value(body)?;

    if value.get("error").is_some() {
        let OAuthErrorResponse {
            error,
            error_description,
        } = decode(value)?;
        return Err(RequestFailure::OAuthError {
            error,
            description: error_description,
        });
    }

    decode(value)
}

/// Decodes a JSON body, reporting the path of the offending member on failure.
pub(crate) fn parse_json<T>(body: &str) -> Result<T, RequestFailure>
where
    T: DeserializeOwned,
{
    decode(parse_value(body)?)
}

fn parse_value(body: &str) -> Result<serde_json::Value, RequestFailure> {
    serde_json::from_str(body).map_err(|error| RequestFailure::InvalidResponse {
        path: ".".to_string(),
        error,
    })
}

fn decode<T>(value: serde_json::Value) -> Result<T, RequestFailure>
where
    T: DeserializeOwned,
{
    serde_path_to_error::deserialize(value).map_err(|err| RequestFailure::InvalidResponse {
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}

/// Holds the current [`TokenState`].
///
/// Clones share the same slot. Readers get an `Arc` snapshot, writers swap
/// the whole value.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenStore {
    inner: Arc<RwLock<Option<Arc<TokenState>>>>,
}

impl TokenStore {
    /// Returns the stored token, even if expired.
    pub(crate) async fn current(&self) -> Option<Arc<TokenState>> {
        self.inner.read().await.clone()
    }

    /// Returns the stored token if it is not expired.
    pub(crate) async fn valid(&self) -> Option<Arc<TokenState>> {
        let guard = self.inner.read().await;
        guard.as_ref().filter(|state| !state.is_expired()).cloned()
    }

    pub(crate) async fn replace(&self, state: TokenState) -> Arc<TokenState> {
        let state = Arc::new(state);
        let mut guard = self.inner.write().await;
        *guard = Some(Arc::clone(&state));
        state
    }
}

use http::header::InvalidHeaderValue;

/// Maximum number of characters of an unexpected response body kept in errors.
pub(crate) const BODY_MAX_LENGTH: usize = 1024;

/// Errors returned by the [`TokenManager`](crate::TokenManager).
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum TokenError {
    /// The supplied credentials cannot be used with this flow.
    ///
    /// Detected before any network call.
    #[display("Invalid argument: {reason}")]
    InvalidArgument {
        /// Why the argument was rejected.
        reason: String,
    },

    /// The token exchange failed; no token has been stored.
    #[display("Authentication failed: {_0}")]
    AuthenticationFailed(#[error(source)] RequestFailure),

    /// An authenticated call was attempted without a valid, unexpired token.
    #[display("Not authenticated: no valid access token, authenticate first")]
    Unauthenticated,

    /// An authenticated call failed.
    #[display("Request failed: {_0}")]
    RequestFailed(#[error(source)] RequestFailure),

    /// A configured endpoint URL is invalid.
    #[display("Invalid endpoint '{url}': {error}")]
    InvalidEndpoint {
        /// The rejected URL.
        url: String,
        /// The parsing error.
        #[error(source)]
        error: url::ParseError,
    },
}

impl TokenError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Cause of a failed HTTP exchange.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RequestFailure {
    /// Network or protocol error from the HTTP executor, passed through unchanged.
    #[display("{_0}")]
    Transport(reqwest::Error),

    /// The server answered with a non-success status code.
    #[display("unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatus {
        /// The HTTP status code.
        status_code: u16,
        /// The (possibly truncated) response body.
        body: String,
    },

    /// The response body is not the expected JSON document.
    #[display("invalid response at '{path}': {error}")]
    #[from(skip)]
    InvalidResponse {
        /// Location of the problem in the JSON document.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
    },

    /// The authorization server answered with an OAuth2 error object.
    #[display("OAuth2 error '{error}'{}", describe(description))]
    #[from(skip)]
    OAuthError {
        /// The OAuth2 error code, e.g. `invalid_grant`.
        error: String,
        /// Optional human readable description.
        description: Option<String>,
    },

    /// A header value could not be built.
    #[display("invalid header value: {_0}")]
    InvalidHeader(InvalidHeaderValue),

    /// The server reported a lifetime that cannot be represented.
    #[display("invalid token lifetime: {_0}")]
    Expiry(jiff::Error),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|it| format!(": {it}"))
        .unwrap_or_default()
}

impl RequestFailure {
    /// Builds an [`RequestFailure::UnexpectedStatus`], truncating large bodies.
    pub(crate) fn unexpected_status(status_code: u16, body: String) -> Self {
        let body = if body.chars().count() > BODY_MAX_LENGTH {
            let truncated = body.chars().take(BODY_MAX_LENGTH).collect::<String>();
            format!("{truncated}... (truncated)")
        } else {
            body
        };
        Self::UnexpectedStatus { status_code, body }
    }
}

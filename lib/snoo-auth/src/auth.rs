use base64::Engine;
use http::HeaderValue;
use http::header::InvalidHeaderValue;

use crate::SecureString;

/// Value of an `Authorization` header.
#[derive(Clone, Copy)]
pub(crate) enum Authorization<'a> {
    /// HTTP Basic authentication (RFC 7617) with the OAuth2 client credentials.
    Basic {
        client_id: &'a str,
        client_secret: &'a SecureString,
    },

    /// OAuth2 bearer token, sent as `bearer <token>`.
    Bearer(&'a SecureString),
}

impl Authorization<'_> {
    /// Builds the header value, marked as sensitive.
    ///
    /// Sensitive values show up as `Sensitive` in the `Debug` output of
    /// requests and header maps.
    pub(crate) fn to_header_value(self) -> Result<HeaderValue, InvalidHeaderValue> {
        let raw = match self {
            Self::Basic {
                client_id,
                client_secret,
            } => {
                let credentials = format!("{client_id}:{}", client_secret.expose());
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                format!("Basic {encoded}")
            }
            Self::Bearer(token) => format!("bearer {}", token.expose()),
        };

        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

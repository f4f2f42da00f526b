use std::fmt;

use serde::Serialize;

use crate::SecureString;
use crate::error::TokenError;

/// How an application authenticates against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationMethod {
    /// Legacy cookie based login.
    Cookie,
    /// OAuth2 "script" app: password grant, no interactive consent.
    Script,
    /// OAuth2 web application (authorization code flow).
    WebApp,
    /// OAuth2 installed application (implicit flow).
    InstalledApp,
}

impl fmt::Display for AuthenticationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cookie => "cookie",
            Self::Script => "script",
            Self::WebApp => "web app",
            Self::InstalledApp => "installed app",
        };
        f.write_str(name)
    }
}

/// Credentials used to obtain an access token.
///
/// The password and the client secret are kept in [`SecureString`]s, so
/// `Debug` output never contains them.
#[derive(Clone)]
pub struct Credentials {
    method: AuthenticationMethod,
    username: String,
    password: SecureString,
    client_id: String,
    client_secret: SecureString,
}

impl Credentials {
    /// Creates credentials for an arbitrary authentication method.
    pub fn new(
        method: AuthenticationMethod,
        username: impl Into<String>,
        password: impl Into<SecureString>,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> Self {
        Self {
            method,
            username: username.into(),
            password: password.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Creates credentials for a "script" app.
    ///
    /// # Example
    ///
    /// ```rust
    /// use snoo_auth::{AuthenticationMethod, Credentials};
    ///
    /// let credentials = Credentials::script("spez", "hunter2", "client-id", "client-secret");
    /// assert_eq!(credentials.method(), AuthenticationMethod::Script);
    /// assert!(!format!("{credentials:?}").contains("hunter2"));
    /// ```
    pub fn script(
        username: impl Into<String>,
        password: impl Into<SecureString>,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> Self {
        Self::new(
            AuthenticationMethod::Script,
            username,
            password,
            client_id,
            client_secret,
        )
    }

    /// The authentication method.
    pub fn method(&self) -> AuthenticationMethod {
        self.method
    }

    /// The account username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The OAuth2 client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &SecureString {
        &self.client_secret
    }

    /// Checks the credentials can be used for the password grant.
    ///
    /// This is the only place the authentication method is checked.
    pub(crate) fn ensure_script(&self) -> Result<(), TokenError> {
        if self.method != AuthenticationMethod::Script {
            return Err(TokenError::invalid_argument(format!(
                "only 'script' apps are supported, got '{}'",
                self.method
            )));
        }
        if self.client_id.contains(':') {
            return Err(TokenError::invalid_argument(
                "client id cannot contain colon (:) character",
            ));
        }
        Ok(())
    }

    /// Encodes the `application/x-www-form-urlencoded` password grant body.
    pub(crate) fn password_grant_form(&self) -> Result<String, TokenError> {
        let form = PasswordGrant {
            grant_type: "password",
            username: &self.username,
            password: self.password.expose(),
        };
        serde_urlencoded::to_string(form)
            .map_err(|err| TokenError::invalid_argument(format!("cannot encode form: {err}")))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("method", &self.method)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
}

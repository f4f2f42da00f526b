use http::HeaderValue;
use url::Url;

use crate::error::TokenError;
use crate::executor::HttpExecutor;
use crate::manager::{Endpoints, TokenManager};
use crate::token::TokenStore;

/// Host serving the token endpoint.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";

/// Host serving the OAuth2 protected API.
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";

/// Path of the token endpoint, relative to the auth host.
pub const DEFAULT_TOKEN_PATH: &str = "/api/v1/access_token";

/// Path of the identity ("me") endpoint, relative to the API host.
pub const DEFAULT_IDENTITY_PATH: &str = "/api/v1/me";

const DEFAULT_USER_AGENT: &str = concat!("snoo-auth/", env!("CARGO_PKG_VERSION"));

/// Builder for [`TokenManager`].
///
/// # Default Configuration
///
/// - **Auth host**: [`DEFAULT_AUTH_BASE_URL`]
/// - **API host**: [`DEFAULT_API_BASE_URL`]
/// - **Token path**: [`DEFAULT_TOKEN_PATH`]
/// - **Identity path**: [`DEFAULT_IDENTITY_PATH`]
/// - **User-Agent**: `snoo-auth/<version>`, you should set your own
///
/// # Example
///
/// ```rust
/// use snoo_auth::TokenManager;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = TokenManager::builder()
///     .with_user_agent("linux:my-bot:v1.0.0 (by /u/spez)")
///     .with_auth_base_url("https://www.reddit.com")?
///     .build(reqwest::Client::new())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenManagerBuilder {
    auth_base_url: String,
    api_base_url: String,
    token_path: String,
    identity_path: String,
    user_agent: String,
}

impl Default for TokenManagerBuilder {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            identity_path: DEFAULT_IDENTITY_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TokenManagerBuilder {
    /// Sets the host serving the token endpoint.
    ///
    /// # Errors
    ///
    /// Fails with [`TokenError::InvalidEndpoint`] if the URL cannot be parsed.
    pub fn with_auth_base_url(mut self, url: impl AsRef<str>) -> Result<Self, TokenError> {
        parse_url(url.as_ref())?;
        self.auth_base_url = url.as_ref().to_string();
        Ok(self)
    }

    /// Sets the host serving the authenticated API.
    ///
    /// # Errors
    ///
    /// Fails with [`TokenError::InvalidEndpoint`] if the URL cannot be parsed.
    pub fn with_api_base_url(mut self, url: impl AsRef<str>) -> Result<Self, TokenError> {
        parse_url(url.as_ref())?;
        self.api_base_url = url.as_ref().to_string();
        Ok(self)
    }

    /// Sets the token endpoint path, relative to the auth host.
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the identity endpoint path, relative to the API host.
    #[must_use]
    pub fn with_identity_path(mut self, path: impl Into<String>) -> Self {
        self.identity_path = path.into();
        self
    }

    /// Sets the `User-Agent` sent with every request.
    ///
    /// Reddit throttles generic user agents, use something unique and
    /// descriptive that includes a version number.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the manager around the given executor.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidEndpoint`] if a path cannot be joined to its host
    /// - [`TokenError::InvalidArgument`] if the user agent is not a valid header value
    pub fn build<E>(self, executor: E) -> Result<TokenManager<E>, TokenError>
    where
        E: HttpExecutor,
    {
        let Self {
            auth_base_url,
            api_base_url,
            token_path,
            identity_path,
            user_agent,
        } = self;

        let token_url = join_url(&parse_url(&auth_base_url)?, &token_path)?;
        let identity_url = join_url(&parse_url(&api_base_url)?, &identity_path)?;
        let user_agent = HeaderValue::from_str(&user_agent).map_err(|err| {
            TokenError::invalid_argument(format!("invalid user agent '{user_agent}': {err}"))
        })?;

        Ok(TokenManager {
            executor,
            endpoints: Endpoints {
                token_url,
                identity_url,
                user_agent,
            }
            .into(),
            store: TokenStore::default(),
        })
    }

    /// Builds the manager with a default `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// See [`TokenManagerBuilder::build`].
    pub fn build_default(self) -> Result<TokenManager, TokenError> {
        self.build(reqwest::Client::new())
    }
}

fn parse_url(url: &str) -> Result<Url, TokenError> {
    Url::parse(url).map_err(|error| TokenError::InvalidEndpoint {
        url: url.to_string(),
        error,
    })
}

fn join_url(base: &Url, path: &str) -> Result<Url, TokenError> {
    base.join(path).map_err(|error| TokenError::InvalidEndpoint {
        url: format!("{base}{path}"),
        error,
    })
}

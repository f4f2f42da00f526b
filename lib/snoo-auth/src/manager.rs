use std::sync::Arc;

use headers::{ContentType, HeaderMapExt};
use http::HeaderValue;
use http::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use jiff::Timestamp;
use reqwest::{Body, Method, Request};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::Authorization;
use crate::builder::TokenManagerBuilder;
use crate::credentials::Credentials;
use crate::error::{RequestFailure, TokenError};
use crate::executor::HttpExecutor;
use crate::SecureString;
use crate::token::{self, Scopes, TokenState, TokenStore};

/// Resolved endpoints and headers shared by all clones of a manager.
#[derive(Debug)]
pub(crate) struct Endpoints {
    pub(crate) token_url: Url,
    pub(crate) identity_url: Url,
    pub(crate) user_agent: HeaderValue,
}

/// Acquires an OAuth2 access token with the password grant of a "script"
/// app, and uses it to authorize subsequent requests.
///
/// The manager is either unauthenticated, or holds the [`TokenState`] of the
/// last successful [`authenticate`](Self::authenticate). Authenticating again
/// replaces that state as a whole.
///
/// Clones share the same token, so a manager can be handed to several tasks.
///
/// # Example
///
/// ```rust,no_run
/// use snoo_auth::{Credentials, TokenManager};
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct Account { name: String }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = TokenManager::builder()
///     .with_user_agent("linux:my-bot:v1.0.0 (by /u/spez)")
///     .build_default()?;
///
/// let credentials = Credentials::script("spez", "hunter2", "client-id", "client-secret");
/// let token = manager.authenticate(&credentials).await?;
/// assert!(token.has_scope("identity"));
///
/// let me: Account = manager.fetch_identity().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenManager<E = reqwest::Client> {
    pub(crate) executor: E,
    pub(crate) endpoints: Arc<Endpoints>,
    pub(crate) store: TokenStore,
}

impl TokenManager {
    /// Creates a builder, see [`TokenManagerBuilder`] for the defaults.
    pub fn builder() -> TokenManagerBuilder {
        TokenManagerBuilder::default()
    }
}

impl<E> TokenManager<E>
where
    E: HttpExecutor,
{
    /// Exchanges the credentials for an access token and stores it.
    ///
    /// Sends a single `POST` to the token endpoint with the password grant,
    /// authenticated with the client id and secret.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidArgument`] if the credentials are not for a
    ///   "script" app, before any request is sent
    /// - [`TokenError::AuthenticationFailed`] if the exchange fails; the
    ///   previously stored token, if any, is kept
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<TokenState>, TokenError> {
        credentials.ensure_script()?;
        let request = self.token_request(credentials)?;

        debug!(
            username = credentials.username(),
            client_id = credentials.client_id(),
            url = %self.endpoints.token_url,
            "requesting access token"
        );
        let state = self.exchange_token(request).await.map_err(|failure| {
            warn!(username = credentials.username(), %failure, "authentication failed");
            TokenError::AuthenticationFailed(failure)
        })?;

        let state = self.store.replace(state).await;
        info!(
            username = credentials.username(),
            scopes = %state.scopes(),
            expires_at = %state.expires_at(),
            "authenticated"
        );
        Ok(state)
    }

    /// Fetches the account the token was issued for (the "me" endpoint).
    ///
    /// The response is deserialized as is, there is no envelope.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Unauthenticated`] if no valid, unexpired token is stored
    /// - [`TokenError::RequestFailed`] if the call fails or the body does not match `T`
    pub async fn fetch_identity<T>(&self) -> Result<T, TokenError>
    where
        T: DeserializeOwned,
    {
        let mut request = Request::new(Method::GET, self.endpoints.identity_url.clone());
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        self.authorize(&mut request).await?;

        let body = self.send(request).await.map_err(TokenError::RequestFailed)?;
        token::parse_json(&body).map_err(TokenError::RequestFailed)
    }

    /// Authenticates then fetches the account, like [`authenticate`](Self::authenticate)
    /// followed by [`fetch_identity`](Self::fetch_identity).
    ///
    /// # Errors
    ///
    /// Any error of the two underlying calls. If only the identity call
    /// fails, the new token stays stored.
    pub async fn login<T>(&self, credentials: &Credentials) -> Result<T, TokenError>
    where
        T: DeserializeOwned,
    {
        self.authenticate(credentials).await?;
        self.fetch_identity().await
    }
}

impl<E> TokenManager<E> {
    /// Adds the `Authorization: bearer <token>` header to a request.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Unauthenticated`] if no valid, unexpired token is stored
    /// - [`TokenError::RequestFailed`] if the token cannot be used as a header value
    pub async fn authorize(&self, request: &mut Request) -> Result<(), TokenError> {
        let Some(state) = self.store.valid().await else {
            debug!(url = %request.url(), "no valid access token");
            return Err(TokenError::Unauthenticated);
        };

        let value = Authorization::Bearer(state.access_token())
            .to_header_value()
            .map_err(|err| TokenError::RequestFailed(err.into()))?;
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, value);
        headers.insert(USER_AGENT, self.endpoints.user_agent.clone());
        Ok(())
    }

    /// Returns the last acquired token, even if it has expired.
    pub async fn current(&self) -> Option<Arc<TokenState>> {
        self.store.current().await
    }

    /// Returns `true` if a token is stored and not expired.
    pub async fn is_authenticated(&self) -> bool {
        self.store.valid().await.is_some()
    }

    /// The last acquired access token.
    pub async fn access_token(&self) -> Option<SecureString> {
        self.current()
            .await
            .map(|state| state.access_token().clone())
    }

    /// Scopes granted to the last acquired token.
    pub async fn scopes(&self) -> Option<Scopes> {
        self.current().await.map(|state| state.scopes().clone())
    }

    /// Expiry of the last acquired token; request a new one after that.
    pub async fn expires_at(&self) -> Option<Timestamp> {
        self.current().await.map(|state| state.expires_at())
    }

    fn token_request(&self, credentials: &Credentials) -> Result<Request, TokenError> {
        let authorization = Authorization::Basic {
            client_id: credentials.client_id(),
            client_secret: credentials.client_secret(),
        }
        .to_header_value()
        .map_err(|err| {
            TokenError::invalid_argument(format!("client credentials are not usable: {err}"))
        })?;
        let form = credentials.password_grant_form()?;

        let mut request = Request::new(Method::POST, self.endpoints.token_url.clone());
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(USER_AGENT, self.endpoints.user_agent.clone());
        headers.typed_insert(ContentType::form_url_encoded());
        *request.body_mut() = Some(Body::from(form));
        Ok(request)
    }
}

impl<E> TokenManager<E>
where
    E: HttpExecutor,
{
    async fn exchange_token(&self, request: Request) -> Result<TokenState, RequestFailure> {
        let body = self.send(request).await?;
        let issued_at = Timestamp::now();
        let response = token::parse_token_response(&body)?;
        TokenState::from_response(response, issued_at)
    }

    /// Sends the request, returns the body of a successful response.
    async fn send(&self, request: Request) -> Result<String, RequestFailure> {
        debug!(?request, "sending...");
        let response = self.executor.execute(request).await?;
        debug!(?response, "...receiving");

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RequestFailure::unexpected_status(status.as_u16(), body));
        }
        Ok(body)
    }
}

//! # Snoo Auth
//!
//! OAuth2 authentication for reddit-style REST API clients, using the
//! password grant of a "script" app.
//!
//! A [`TokenManager`] exchanges [`Credentials`] for a bearer access token,
//! remembers the granted scopes and the expiry, then attaches the token to
//! subsequent requests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snoo_auth::{Credentials, TokenManager};
//! # use serde::Deserialize;
//! # #[derive(Debug, Deserialize)]
//! # struct Account { name: String }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TokenManager::builder()
//!     .with_user_agent("linux:my-bot:v1.0.0 (by /u/spez)")
//!     .build_default()?;
//!
//! let credentials = Credentials::script("spez", "hunter2", "client-id", "client-secret");
//!
//! // POST /api/v1/access_token, the token is stored in the manager
//! let token = manager.authenticate(&credentials).await?;
//! println!("scopes: {}, expires at {}", token.scopes(), token.expires_at());
//!
//! // GET /api/v1/me with `Authorization: bearer <token>`
//! let me: Account = manager.fetch_identity().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Bring your own HTTP client
//!
//! Requests go through the [`HttpExecutor`] trait. `reqwest::Client` is used
//! by default, but any implementation can be given to
//! [`TokenManagerBuilder::build`], for example to share a client with the
//! rest of the application or to answer with canned responses in tests.
//!
//! ## Secrets
//!
//! Passwords, client secrets and access tokens are kept in [`SecureString`]s:
//! zeroed on drop, redacted in `Debug`, masked in `Display`. `Authorization`
//! headers are flagged as sensitive so they are not printed when a request
//! is logged.

mod auth;

mod builder;
pub use self::builder::{
    DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL, DEFAULT_IDENTITY_PATH, DEFAULT_TOKEN_PATH,
    TokenManagerBuilder,
};

mod credentials;
pub use self::credentials::{AuthenticationMethod, Credentials};

mod error;
pub use self::error::{RequestFailure, TokenError};

mod executor;
pub use self::executor::HttpExecutor;

mod manager;
pub use self::manager::TokenManager;

mod secure;
pub use self::secure::SecureString;

mod token;
pub use self::token::{Scopes, TokenState};

use std::future::Future;
use std::sync::Arc;

use reqwest::{Request, Response};

/// Something able to send an HTTP request.
///
/// The [`TokenManager`](crate::TokenManager) never talks to the network by
/// itself: every request goes through an `HttpExecutor`. `reqwest::Client`
/// implements it, and tests can provide canned responses instead.
///
/// # Example
///
/// ```rust
/// use std::future::Future;
///
/// use reqwest::{Request, Response};
/// use snoo_auth::HttpExecutor;
///
/// struct AlwaysNoContent;
///
/// impl HttpExecutor for AlwaysNoContent {
///     fn execute(
///         &self,
///         _request: Request,
///     ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
///         async { Ok(Response::from(http::Response::new(String::new()))) }
///     }
/// }
/// ```
pub trait HttpExecutor: Send + Sync {
    /// Sends the request and returns the raw response, whatever its status.
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send;
}

impl HttpExecutor for reqwest::Client {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
        reqwest::Client::execute(self, request)
    }
}

impl<E> HttpExecutor for Arc<E>
where
    E: HttpExecutor,
{
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
        E::execute(self.as_ref(), request)
    }
}

//! Bearer token auth gate.
//!
//! [`AuthBearer`] reads `Authorization: Bearer <token>`, resolves the token to
//! a user through a caller-supplied async function and stores the user as an
//! [`AuthUser<U>`] in the request context before calling the rest of the
//! chain. Business logic reads it back with [`auth_user`] or
//! [`RequestContext::auth_user`].
//!
//! A missing header and a malformed one (no space, or a scheme other than
//! exactly `Bearer`) take the same "header missing" path.

use crate::middleware::{BoxFuture, HandlerResult, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use batt_core::{AuthUser, RequestContext};
use http::{header, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds the response for a rejected request.
pub type Responder = Arc<dyn Fn(&RequestContext) -> Response + Send + Sync>;

/// Scheme keyword expected in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

/// Responses sent when authentication fails.
///
/// Both default to 401 with `{"message":"Unauthenticated"}`.
#[derive(Clone)]
pub struct AuthResponders {
    header_missing: Responder,
    invalid_user: Responder,
}

impl AuthResponders {
    /// Sets the response for a missing or malformed header.
    #[must_use]
    pub fn on_header_missing(
        mut self,
        responder: impl Fn(&RequestContext) -> Response + Send + Sync + 'static,
    ) -> Self {
        self.header_missing = Arc::new(responder);
        self
    }

    /// Sets the response for a token that resolves to no user.
    #[must_use]
    pub fn on_invalid_user(
        mut self,
        responder: impl Fn(&RequestContext) -> Response + Send + Sync + 'static,
    ) -> Self {
        self.invalid_user = Arc::new(responder);
        self
    }

    /// The default rejection response.
    pub fn unauthenticated(_ctx: &RequestContext) -> Response {
        Response::message(StatusCode::UNAUTHORIZED, "Unauthenticated")
    }
}

impl Default for AuthResponders {
    fn default() -> Self {
        Self {
            header_missing: Arc::new(Self::unauthenticated),
            invalid_user: Arc::new(Self::unauthenticated),
        }
    }
}

impl std::fmt::Debug for AuthResponders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponders").finish_non_exhaustive()
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    HeaderMissing,
    Malformed,
    InvalidUser,
}

impl Rejection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization header missing",
            Self::Malformed => "authorization header malformed",
            Self::InvalidUser => "token did not resolve to a user",
        }
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// The value is split once on the first space; the part before it must be
/// exactly `Bearer`. Whatever follows, even an empty string, is the token.
fn bearer_token(request: &Request) -> Result<String, Rejection> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(Rejection::HeaderMissing)?;
    let value = value.to_str().map_err(|_| Rejection::Malformed)?;
    match value.split_once(' ') {
        Some((BEARER_SCHEME, token)) => Ok(token.to_string()),
        _ => Err(Rejection::Malformed),
    }
}

/// Middleware that authenticates requests with a bearer token.
///
/// # Example
///
/// ```
/// use batt_core::{AppError, RequestContext};
/// use batt_middleware::{auth_user, handler, AuthBearer, Chain};
/// use batt_core::NoParam;
/// use bytes::Bytes;
/// use http::StatusCode;
///
/// #[derive(Clone)]
/// struct User {
///     name: String,
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = AuthBearer::new(|_ctx: RequestContext, token: String| async move {
///     (token == "secret").then(|| User { name: "ada".into() })
/// });
///
/// let whoami = handler(
///     |ctx: RequestContext, _req: NoParam| async move {
///         let user = auth_user::<User>(&ctx).ok_or_else(|| AppError::authentication("no user"))?;
///         Ok::<_, AppError>(batt_core::MessageResponse::base(user.name.clone()))
///     },
///     StatusCode::OK,
/// );
///
/// let chain = Chain::new(whoami).with(gate);
/// let request = http::Request::builder()
///     .header("authorization", "Bearer secret")
///     .body(Bytes::new())
///     .unwrap();
///
/// let response = chain.respond(request).await;
/// assert_eq!(response.status(), StatusCode::OK);
/// # }
/// ```
pub struct AuthBearer<U, F> {
    resolver: F,
    responders: AuthResponders,
    isolated: bool,
    _user: PhantomData<fn() -> U>,
}

impl<U, F, Fut> AuthBearer<U, F>
where
    F: Fn(RequestContext, String) -> Fut,
    Fut: Future<Output = Option<U>>,
{
    /// Creates a gate with the default responders.
    ///
    /// `resolver` receives a copy of the request context and the token, and
    /// returns `None` when the token does not belong to a user.
    pub fn new(resolver: F) -> Self {
        Self {
            resolver,
            responders: AuthResponders::default(),
            isolated: false,
            _user: PhantomData,
        }
    }
}

impl<U, F> AuthBearer<U, F> {
    /// Replaces the rejection responders.
    #[must_use]
    pub fn responders(mut self, responders: AuthResponders) -> Self {
        self.responders = responders;
        self
    }

    /// Drops every other context extension before storing the user.
    ///
    /// By default the user is added to the inbound context and values stored
    /// by earlier middleware stay visible downstream. An isolated gate hands
    /// the rest of the chain a context holding only the user. The request ID
    /// is kept either way.
    #[must_use]
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Returns true if the gate clears other context values.
    pub const fn is_isolated(&self) -> bool {
        self.isolated
    }
}

impl<U, F, Fut> Middleware for AuthBearer<U, F>
where
    U: Clone + Send + Sync + 'static,
    F: Fn(RequestContext, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<U>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        "auth_bearer"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let token = match bearer_token(&request) {
                Ok(token) => token,
                Err(rejection) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        reason = rejection.as_str(),
                        "request rejected"
                    );
                    return Ok((self.responders.header_missing)(ctx));
                }
            };

            let Some(user) = (self.resolver)(ctx.clone(), token).await else {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    reason = Rejection::InvalidUser.as_str(),
                    "request rejected"
                );
                return Ok((self.responders.invalid_user)(ctx));
            };

            if self.isolated {
                ctx.clear_extensions();
            }
            ctx.insert_extension(AuthUser::new(user));
            next.run(ctx, request).await
        })
    }
}

impl<U, F> std::fmt::Debug for AuthBearer<U, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthBearer")
            .field("isolated", &self.isolated)
            .finish_non_exhaustive()
    }
}

/// Returns the user stored by [`AuthBearer`], if any.
pub fn auth_user<U: Send + Sync + 'static>(ctx: &RequestContext) -> Option<&U> {
    ctx.auth_user::<U>()
}

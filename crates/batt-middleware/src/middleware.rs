//! Handler chain: endpoints, middleware and the [`Chain`] that runs them.
//!
//! An [`Endpoint`] produces the final response for a request. A
//! [`Middleware`] runs in front of it and either short-circuits with its own
//! response or calls [`Next::run`] to continue. Errors are not translated on
//! the way out: every stage returns a [`HandlerResult`] and only the protocol
//! layer (or [`Chain::respond`]) turns an error into a response.
//!
//! # Example
//!
//! ```
//! use batt_core::RequestContext;
//! use batt_middleware::{BoxFuture, HandlerResult, Middleware, Next, Request};
//!
//! struct LogRequests;
//!
//! impl Middleware for LogRequests {
//!     fn name(&self) -> &'static str {
//!         "log_requests"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RequestContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move {
//!             tracing::info!(request_id = %ctx.request_id(), uri = %request.uri(), "request");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::handler::HandlerError;
use crate::types::{Request, Response};
use batt_core::RequestContext;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a handler or middleware.
pub type HandlerResult = Result<Response, HandlerError>;

/// The protocol handler at the end of a chain.
///
/// The returned future owns everything it needs: the context is cloned into
/// it, so no borrow outlives the call.
pub trait Endpoint: Send + Sync + 'static {
    /// Handles one request.
    fn call(&self, ctx: &mut RequestContext, request: Request) -> BoxFuture<'static, HandlerResult>;
}

/// A stage that runs before the endpoint.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once
/// - A short-circuit response is returned as `Ok`, never both a response and
///   a call to `next`
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, optionally calling `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// Callback to invoke the rest of the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that runs `middleware` and then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Self) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that calls the endpoint.
    pub fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Invokes the next middleware or the endpoint.
    ///
    /// This consumes `self` so it can only be called once.
    pub async fn run(self, ctx: &mut RequestContext, request: Request) -> HandlerResult {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                tracing::trace!(middleware = middleware.name(), "entering middleware");
                middleware.process(ctx, request, *next).await
            }
            NextInner::Endpoint(endpoint) => endpoint.call(ctx, request).await,
        }
    }
}

/// An endpoint with the middleware that guards it.
///
/// Middleware runs in the order it was added.
///
/// # Example
///
/// ```
/// use batt_core::{AppError, MessageResponse, NoParam, RequestContext};
/// use batt_middleware::{handler, Chain};
/// use bytes::Bytes;
/// use http::StatusCode;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ping = handler(
///     |_ctx: RequestContext, _req: NoParam| async {
///         Ok::<_, AppError>(MessageResponse::base("pong"))
///     },
///     StatusCode::OK,
/// );
/// let chain = Chain::new(ping);
///
/// let response = chain.respond(http::Request::new(Bytes::new())).await;
/// assert_eq!(response.status(), StatusCode::OK);
/// # }
/// ```
#[derive(Clone)]
pub struct Chain {
    middleware: Vec<Arc<dyn Middleware>>,
    endpoint: Arc<dyn Endpoint>,
}

impl Chain {
    /// Creates a chain with no middleware.
    pub fn new(endpoint: impl Endpoint) -> Self {
        Self {
            middleware: Vec::new(),
            endpoint: Arc::new(endpoint),
        }
    }

    /// Appends a middleware.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Returns the middleware names in execution order.
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Runs the request through the chain, returning errors unmodified.
    pub async fn handle(&self, ctx: &mut RequestContext, request: Request) -> HandlerResult {
        let mut next = Next::endpoint(self.endpoint.as_ref());
        for middleware in self.middleware.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next.run(ctx, request).await
    }

    /// Runs the request with a fresh context and converts errors with
    /// [`HandlerError::into_response`].
    pub async fn respond(&self, request: Request) -> Response {
        let mut ctx = RequestContext::new();
        match self.handle(&mut ctx, request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    status = %err.status_code(),
                    error = %err,
                    "request failed"
                );
                err.into_response()
            }
        }
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("middleware", &self.middleware_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;

    #[derive(Debug, Clone, PartialEq)]
    struct Visited(Vec<&'static str>);

    struct Record {
        name: &'static str,
    }

    impl Middleware for Record {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                let mut visited = ctx
                    .remove_extension::<Visited>()
                    .unwrap_or(Visited(Vec::new()));
                visited.0.push(self.name);
                ctx.insert_extension(visited);
                next.run(ctx, request).await
            })
        }
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut RequestContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Ok(Response::message(StatusCode::FORBIDDEN, "stop")) })
        }
    }

    // Echoes the visited middleware names as the body.
    struct Echo;

    impl Endpoint for Echo {
        fn call(
            &self,
            ctx: &mut RequestContext,
            _request: Request,
        ) -> BoxFuture<'static, HandlerResult> {
            let visited = ctx
                .extension::<Visited>()
                .map(|v| v.0.join(","))
                .unwrap_or_default();
            Box::pin(async move { Ok(Response::json(StatusCode::OK, visited)) })
        }
    }

    #[tokio::test]
    async fn test_middleware_runs_in_order() {
        let chain = Chain::new(Echo)
            .with(Record { name: "first" })
            .with(Record { name: "second" });

        assert_eq!(chain.middleware_names(), vec!["first", "second"]);

        let mut ctx = RequestContext::new();
        let response = chain
            .handle(&mut ctx, http::Request::new(Bytes::new()))
            .await
            .unwrap();

        assert_eq!(response.body().as_ref(), b"first,second");
    }

    #[tokio::test]
    async fn test_short_circuit_skips_endpoint() {
        let chain = Chain::new(Echo)
            .with(ShortCircuit)
            .with(Record { name: "never" });

        let mut ctx = RequestContext::new();
        let response = chain
            .handle(&mut ctx, http::Request::new(Bytes::new()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(ctx.extension::<Visited>().is_none());
    }

    #[tokio::test]
    async fn test_next_endpoint() {
        let mut ctx = RequestContext::new();
        let response = Next::endpoint(&Echo)
            .run(&mut ctx, http::Request::new(Bytes::new()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

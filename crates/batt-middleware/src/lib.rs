//! # Batt Middleware
//!
//! Turns business logic into protocol handlers and guards them.
//!
//! ```text
//! Request → [AuthBearer] → ... → TypedHandler
//!                                   │ bind (query → params → body → validate)
//!                                   │ logic.execute(ctx, request)
//!                                   ↓ serialize with the success status
//! Response ← HandlerError::into_response (protocol layer) ←┘
//! ```
//!
//! - [`handler`] / [`handler_with_config`] - wrap a [`BusinessLogic`](batt_core::BusinessLogic) as an [`Endpoint`]
//! - [`Chain`] - an endpoint plus the [`Middleware`] that runs before it
//! - [`AuthBearer`] - bearer token gate storing an [`AuthUser`](batt_core::AuthUser)
//!
//! Errors travel back through the chain unmodified as [`HandlerError`]. The
//! protocol layer decides how to render them; [`HandlerError::into_response`]
//! is the default.

#![doc(html_root_url = "https://docs.rs/batt-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod handler;
pub mod middleware;
pub mod types;

pub use auth::{auth_user, AuthBearer, AuthResponders, Responder, BEARER_SCHEME};
pub use handler::{handler, handler_with_config, HandlerError, TypedHandler};
pub use middleware::{BoxFuture, Chain, Endpoint, HandlerResult, Middleware, Next};
pub use types::{Request, Response, ResponseExt};

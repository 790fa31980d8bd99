//! # Batt
//!
//! Expose `async fn(RequestContext, Req) -> Result<Res, E>` business logic as
//! an HTTP-style endpoint. The request type describes where its fields come
//! from; the adapter binds, validates, calls the logic and serializes the
//! result with a fixed success status.
//!
//! Around that core:
//!
//! - [`AuthBearer`](middleware::AuthBearer) - resolves a bearer token to a user
//!   and stores it in the request context
//! - [`Cache`](cache::Cache) - string and JSON get/set over a pluggable
//!   key/value store, with first-writer-wins keys that never expire
//! - [`Retrier`](tasks::Retrier) - runs fallible background work on a bounded
//!   pool with a fixed number of attempts
//! - [`ConfigLoader`](config::ConfigLoader) and
//!   [`init_logging`](telemetry::init_logging) - startup wiring
//!
//! ## Quick Start
//!
//! ```rust
//! use batt::prelude::*;
//! use http::StatusCode;
//!
//! #[derive(Debug, Default, Bind)]
//! #[bind(crate = "::batt::extract")]
//! struct GetUser {
//!     #[bind(params = "id")]
//!     id: String,
//!     #[bind(query = "verbose")]
//!     verbose: bool,
//! }
//!
//! async fn get_user(_ctx: RequestContext, req: GetUser) -> Result<MessageResponse, AppError> {
//!     Ok(MessageResponse::base(format!("user {} (verbose: {})", req.id, req.verbose)))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let chain = Chain::new(handler(get_user, StatusCode::OK));
//!
//! let mut request = http::Request::builder()
//!     .uri("/users/7?verbose=true")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//! request.extensions_mut().insert(Params::new().with("id", "7"));
//!
//! let response = chain.respond(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/batt/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use batt_core as core;

// Re-export binding types
pub use batt_extract as extract;

// Re-export the derive so `#[derive(batt::Bind)]` works
pub use batt_extract::Bind;

// Re-export handler adapter and auth gate
pub use batt_middleware as middleware;

// Re-export cache facade
pub use batt_cache as cache;

// Re-export background tasks
pub use batt_tasks as tasks;

// Re-export configuration
pub use batt_config as config;

// Re-export logging setup
pub use batt_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use batt::prelude::*;
/// ```
pub mod prelude {
    pub use batt_core::{
        AppError, AppResult, AuthUser, BusinessLogic, FieldErrors, MessageResponse, NoParam,
        RequestContext, RequestId,
    };

    pub use batt_extract::{
        Bind, BindStage, BinderConfig, ExtractionError, Params, RawRequest, Validate,
    };

    pub use batt_middleware::{
        auth_user, handler, handler_with_config, AuthBearer, AuthResponders, Chain, Endpoint,
        HandlerError, Middleware, Next, Request, Response, ResponseExt,
    };

    pub use batt_cache::{Cache, CacheConfig, CacheError, KeyValueStore, Ttl};

    pub use batt_tasks::{PoolConfig, Retrier, RetryPolicy, TaskHandle, TaskOutcome, WorkerPool};

    pub use batt_config::{BattConfig, ConfigLoader};

    pub use batt_telemetry::{init_logging, LogConfig};
}

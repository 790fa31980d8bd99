//! The handler adapter.
//!
//! [`handler`] wraps a piece of [`BusinessLogic`] and a success status into an
//! [`Endpoint`]. The request type is analyzed once, when the handler is built;
//! each call then binds the request, runs the logic and serializes the result.
//! Exactly one of two things comes out of a call: a serialized success
//! response, or the first error encountered, unmodified.

use crate::middleware::{BoxFuture, Endpoint, HandlerResult};
use crate::types::{Request, Response, ResponseExt};
use batt_core::{AppError, BusinessLogic, RequestContext};
use batt_extract::{Bind, Binder, BinderConfig, ExtractionError, RawRequest, RequestDescriptor};
use http::StatusCode;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Error produced by a [`TypedHandler`].
///
/// Binding and business errors are carried as-is so the protocol layer can
/// inspect them; [`HandlerError::status_code`] and
/// [`HandlerError::into_response`] are the default translation.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request could not be bound.
    #[error(transparent)]
    Binding(#[from] ExtractionError),

    /// The business logic returned an error.
    #[error("{0}")]
    Logic(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The business logic's result could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl HandlerError {
    /// Wraps a business-logic error.
    pub fn logic(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Logic(Box::new(err))
    }

    /// Returns the business-logic error as `E`, if it is one.
    pub fn logic_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Logic(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns the binding error, if binding failed.
    pub const fn binding(&self) -> Option<&ExtractionError> {
        match self {
            Self::Binding(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the default HTTP status for this error.
    ///
    /// Binding errors use their own status and [`AppError`] business errors
    /// their category status. Anything else is a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Binding(err) => err.status_code(),
            Self::Logic(err) => err
                .downcast_ref::<AppError>()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, AppError::status_code),
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a `{"message": ...}` response.
    ///
    /// Details of unknown business errors and serialization failures are not
    /// exposed.
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Binding(err) => err.to_string(),
            Self::Logic(err) => err
                .downcast_ref::<AppError>()
                .map_or_else(|| "Internal Server Error".to_string(), AppError::public_message),
            Self::Serialization(_) => "Internal Server Error".to_string(),
        };
        Response::message(status, &message)
    }
}

/// Creates a handler with the default [`BinderConfig`].
///
/// # Example
///
/// ```
/// use batt_core::{AppError, RequestContext};
/// use batt_extract::Bind;
/// use batt_middleware::handler;
/// use http::StatusCode;
/// use serde::Serialize;
///
/// #[derive(Default, Bind)]
/// struct GetUser {
///     #[bind(params = "id")]
///     id: u64,
/// }
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
/// }
///
/// async fn get_user(_ctx: RequestContext, req: GetUser) -> Result<User, AppError> {
///     Ok(User { id: req.id })
/// }
///
/// let endpoint = handler(get_user, StatusCode::OK);
/// assert!(endpoint.descriptor().has_input());
/// ```
pub fn handler<L, Req, Res>(logic: L, status: StatusCode) -> TypedHandler<L, Req, Res>
where
    L: BusinessLogic<Req, Res>,
    Req: Bind + Send + 'static,
    Res: Serialize + Send + 'static,
{
    handler_with_config(logic, status, BinderConfig::default())
}

/// Creates a handler with explicit binder settings.
pub fn handler_with_config<L, Req, Res>(
    logic: L,
    status: StatusCode,
    config: BinderConfig,
) -> TypedHandler<L, Req, Res>
where
    L: BusinessLogic<Req, Res>,
    Req: Bind + Send + 'static,
    Res: Serialize + Send + 'static,
{
    TypedHandler {
        logic: Arc::new(logic),
        binder: Binder::new(config),
        status,
        _marker: PhantomData,
    }
}

/// Business logic exposed as an [`Endpoint`].
pub struct TypedHandler<L, Req, Res> {
    logic: Arc<L>,
    binder: Binder<Req>,
    status: StatusCode,
    _marker: PhantomData<fn() -> Res>,
}

impl<L, Req, Res> TypedHandler<L, Req, Res>
where
    Req: Bind,
{
    /// Returns the descriptor computed for the request type.
    pub const fn descriptor(&self) -> RequestDescriptor {
        self.binder.descriptor()
    }

    /// Returns the status sent on success.
    pub const fn success_status(&self) -> StatusCode {
        self.status
    }
}

impl<L, Req, Res> Endpoint for TypedHandler<L, Req, Res>
where
    L: BusinessLogic<Req, Res>,
    Req: Bind + Send + 'static,
    Res: Serialize + Send + 'static,
{
    fn call(&self, ctx: &mut RequestContext, request: Request) -> BoxFuture<'static, HandlerResult> {
        let bound = self.binder.bind(&RawRequest::from_http(request));
        let logic = Arc::clone(&self.logic);
        let ctx = ctx.clone();
        let status = self.status;

        Box::pin(async move {
            let request = bound?;
            let value = logic
                .execute(ctx, request)
                .await
                .map_err(HandlerError::logic)?;
            let body = serde_json::to_vec(&value).map_err(HandlerError::Serialization)?;
            Ok(Response::json(status, body))
        })
    }
}

impl<L, Req, Res> Clone for TypedHandler<L, Req, Res> {
    fn clone(&self) -> Self {
        Self {
            logic: Arc::clone(&self.logic),
            binder: self.binder.clone(),
            status: self.status,
            _marker: PhantomData,
        }
    }
}

impl<L, Req, Res> std::fmt::Debug for TypedHandler<L, Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedHandler")
            .field("binder", &self.binder)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

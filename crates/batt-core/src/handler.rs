//! Business-logic trait.
//!
//! [`BusinessLogic`] is the shape every handler body has:
//! `(RequestContext, Req) -> Result<Res, Error>`. Plain async closures and
//! `async fn`s implement it through a blanket impl, so most applications never
//! name the trait.

use crate::RequestContext;
use std::future::Future;

/// A unit of business logic exposed through a protocol handler.
///
/// The error type is opaque to the adapter: it is propagated unmodified and
/// only the protocol layer decides what status code it maps to.
///
/// # Example
///
/// ```
/// use batt_core::{AppError, BusinessLogic, MessageResponse, RequestContext};
///
/// async fn ping(_ctx: RequestContext, _req: ()) -> Result<MessageResponse, AppError> {
///     Ok(MessageResponse::base("pong"))
/// }
///
/// fn assert_logic<L: BusinessLogic<(), MessageResponse>>(_: &L) {}
/// assert_logic(&ping);
/// ```
pub trait BusinessLogic<Req, Res>: Send + Sync + 'static {
    /// The error returned by this logic.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs the logic for one bound request.
    fn execute(
        &self,
        ctx: RequestContext,
        request: Req,
    ) -> impl Future<Output = Result<Res, Self::Error>> + Send;
}

impl<F, Fut, Req, Res, E> BusinessLogic<Req, Res> for F
where
    F: Fn(RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn execute(
        &self,
        ctx: RequestContext,
        request: Req,
    ) -> impl Future<Output = Result<Res, Self::Error>> + Send {
        self(ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppError, MessageResponse};

    struct Greeter {
        greeting: &'static str,
    }

    impl BusinessLogic<String, MessageResponse> for Greeter {
        type Error = AppError;

        async fn execute(
            &self,
            _ctx: RequestContext,
            request: String,
        ) -> Result<MessageResponse, AppError> {
            if request.is_empty() {
                return Err(AppError::validation("name is required"));
            }
            Ok(MessageResponse::base(format!("{}, {request}!", self.greeting)))
        }
    }

    #[tokio::test]
    async fn test_struct_logic() {
        let logic = Greeter { greeting: "Hello" };

        let res = logic
            .execute(RequestContext::mock(), "World".to_string())
            .await
            .unwrap();
        assert_eq!(res.message, "Hello, World!");

        let err = logic
            .execute(RequestContext::mock(), String::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_closure_logic() {
        let logic = |ctx: RequestContext, n: u32| async move {
            let _ = ctx.request_id();
            Ok::<_, AppError>(n * 2)
        };

        assert_eq!(
            BusinessLogic::execute(&logic, RequestContext::mock(), 21)
                .await
                .unwrap(),
            42
        );
    }
}

//! # Batt Core
//!
//! Core types and traits shared by the batt crates.
//!
//! - [`RequestContext`] - Per-request context carrying the request ID and typed extensions
//! - [`RequestId`] - UUID v7 request identifier
//! - [`AuthUser`] - Typed carrier for the authenticated user of one request
//! - [`AppError`] - Categorized business-logic errors
//! - [`BusinessLogic`] - The `(context, Request) -> Result<Response, Error>` shape
//! - [`NoParam`] / [`MessageResponse`] - Empty request marker and `{message}` envelope

#![doc(html_root_url = "https://docs.rs/batt-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod identity;
mod response;

pub use context::{RequestContext, RequestId};
pub use error::{AppError, AppResult, ErrorCategory, FieldErrors};
pub use handler::BusinessLogic;
pub use identity::AuthUser;
pub use response::{MessageResponse, NoParam};

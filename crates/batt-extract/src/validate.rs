//! Validation hook for bound requests.

use batt_core::FieldErrors;

/// Business-rule validation of a fully bound request.
///
/// Runs after the body stage when validation is enabled in
/// [`BinderConfig`](crate::BinderConfig). The default accepts every value.
/// `#[derive(Bind)]` emits an empty impl unless the type is marked
/// `#[bind(validate)]`, in which case the impl is written by hand.
///
/// # Example
///
/// ```rust
/// use batt_extract::{Bind, FieldErrors, Validate};
///
/// #[derive(Default, Bind)]
/// #[bind(validate)]
/// struct Signup {
///     #[bind(json = "email")]
///     email: String,
/// }
///
/// impl Validate for Signup {
///     fn validate(&self) -> Result<(), FieldErrors> {
///         let mut errors = FieldErrors::new();
///         if !self.email.contains('@') {
///             errors.add("email", "must be an email address");
///         }
///         errors.into_result()
///     }
/// }
///
/// let invalid = Signup { email: "nope".into() };
/// assert!(invalid.validate().is_err());
/// ```
pub trait Validate {
    /// Returns the per-field rule violations, if any.
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

//! Authenticated user carrier.

use std::ops::Deref;

/// The authenticated user of the current request.
///
/// Written once by the bearer auth gate and read any number of times
/// downstream via [`RequestContext::auth_user`](crate::RequestContext::auth_user).
/// The wrapper keeps a user type from colliding with an unrelated extension
/// of the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser<U>(U);

impl<U> AuthUser<U> {
    /// Wraps a resolved user.
    pub const fn new(user: U) -> Self {
        Self(user)
    }

    /// Returns a reference to the user.
    pub const fn get(&self) -> &U {
        &self.0
    }

    /// Consumes the wrapper and returns the user.
    pub fn into_inner(self) -> U {
        self.0
    }
}

impl<U> Deref for AuthUser<U> {
    type Target = U;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_accessors() {
        let user = AuthUser::new(42_u64);
        assert_eq!(*user.get(), 42);
        assert_eq!(*user, 42);
        assert_eq!(user.into_inner(), 42);
    }
}

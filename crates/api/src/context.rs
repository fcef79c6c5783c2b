use almox_auth::{Session, User};
use almox_core::SessionToken;

/// Authenticated request context: the session resolved from the bearer token.
///
/// Injected by the auth middleware; present on every protected route.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    session: Session,
}

impl CurrentUser {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> SessionToken {
        self.session.token
    }

    pub fn user(&self) -> &User {
        &self.session.user
    }

    pub fn is_admin(&self) -> bool {
        self.session.user.is_admin()
    }
}

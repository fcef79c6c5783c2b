//! Explicit login sessions.
//!
//! Sessions are held in process memory behind opaque bearer tokens; logout
//! removes the entry deterministically. There is no persistent "remember me"
//! cache.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use almox_core::SessionToken;

use crate::user::User;

/// One authenticated session: the user snapshot taken at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

/// In-memory session registry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionToken, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for an authenticated user and hand out its token.
    pub fn open(&self, user: User) -> Session {
        let session = Session {
            token: SessionToken::new(),
            user,
            issued_at: Utc::now(),
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token, session.clone());
        session
    }

    /// Look up the session behind a bearer token.
    pub fn resolve(&self, token: SessionToken) -> Option<Session> {
        self.sessions.lock().unwrap().get(&token).cloned()
    }

    /// Close a session. Returns whether one existed.
    pub fn close(&self, token: SessionToken) -> bool {
        self.sessions.lock().unwrap().remove(&token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Role, UserStatus};
    use almox_core::UserId;

    fn user() -> User {
        User {
            id: UserId::new(),
            name: "Maria".to_string(),
            username: "maria".to_string(),
            password: "pw".to_string(),
            role: Role::User,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn open_then_resolve_round_trips() {
        let store = SessionStore::new();
        let session = store.open(user());
        let resolved = store.resolve(session.token).unwrap();
        assert_eq!(resolved, session);
    }

    #[test]
    fn close_tears_the_session_down() {
        let store = SessionStore::new();
        let session = store.open(user());
        assert!(store.close(session.token));
        assert!(store.resolve(session.token).is_none());
        assert!(!store.close(session.token));
    }

    #[test]
    fn unknown_tokens_do_not_resolve() {
        let store = SessionStore::new();
        assert!(store.resolve(SessionToken::new()).is_none());
    }
}

//! `almox-auth` — user accounts, registration/login rules and sessions.

pub mod session;
pub mod user;

pub use session::{Session, SessionStore};
pub use user::{Role, User, UserStatus, authenticate, register};

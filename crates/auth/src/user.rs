//! User accounts and the registration/login rules.
//!
//! Usernames are unique case-insensitively. Self-registered accounts start
//! `Pending` and cannot log in until an administrator activates them.

use serde::{Deserialize, Serialize};

use almox_core::{DomainError, DomainResult, UserId};

/// Access role. Administrators additionally manage products and accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// Account lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    Pending,
    Inactive,
}

/// A user account.
///
/// Passwords are stored as entered; hardening authentication infrastructure
/// is outside this system's boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

fn username_taken(users: &[User], username: &str) -> bool {
    users
        .iter()
        .any(|u| u.username.eq_ignore_ascii_case(username))
}

/// Register a new account against the current user list.
///
/// Fails with `Conflict` when the username is already taken
/// (case-insensitive); in that case no record is produced. The new account
/// starts as a `Pending` regular user awaiting approval.
pub fn register(
    users: &[User],
    name: &str,
    username: &str,
    password: &str,
) -> DomainResult<User> {
    let name = name.trim();
    let username = username.trim();

    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if username.is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    if password.is_empty() {
        return Err(DomainError::validation("password cannot be empty"));
    }
    if username_taken(users, username) {
        return Err(DomainError::conflict("username already exists"));
    }

    Ok(User {
        id: UserId::new(),
        name: name.to_string(),
        username: username.to_lowercase(),
        password: password.to_string(),
        role: Role::User,
        status: UserStatus::Pending,
    })
}

/// Authenticate a username/password pair against the current user list.
///
/// Unknown usernames and wrong passwords are indistinguishable
/// (`Unauthorized`); pending and inactive accounts are rejected with an
/// invariant error so the caller can explain what is wrong.
pub fn authenticate<'a>(
    users: &'a [User],
    username: &str,
    password: &str,
) -> DomainResult<&'a User> {
    let user = users
        .iter()
        .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
        .ok_or(DomainError::Unauthorized)?;

    if user.password != password {
        return Err(DomainError::Unauthorized);
    }

    match user.status {
        UserStatus::Active => Ok(user),
        UserStatus::Pending => Err(DomainError::invariant("account awaiting approval")),
        UserStatus::Inactive => Err(DomainError::invariant("account is inactive")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(name: &str, username: &str, password: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn register_creates_pending_regular_user() {
        let users = [active("Admin", "admin", "123", Role::Admin)];
        let user = register(&users, "Maria Souza", "maria", "segredo").unwrap();
        assert_eq!(user.username, "maria");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Pending);
    }

    #[test]
    fn register_rejects_duplicate_username_case_insensitive() {
        let users = [active("Maria", "maria", "x", Role::User)];
        let err = register(&users, "Outra Maria", "MARIA", "y").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn register_normalizes_username_to_lowercase() {
        let user = register(&[], "João", "  JoAo  ", "pw").unwrap();
        assert_eq!(user.username, "joao");
    }

    #[test]
    fn register_rejects_blank_fields() {
        assert!(register(&[], "  ", "maria", "pw").is_err());
        assert!(register(&[], "Maria", "  ", "pw").is_err());
        assert!(register(&[], "Maria", "maria", "").is_err());
    }

    #[test]
    fn authenticate_matches_username_case_insensitively() {
        let users = [active("Admin", "admin", "123", Role::Admin)];
        let user = authenticate(&users, "ADMIN", "123").unwrap();
        assert!(user.is_admin());
    }

    #[test]
    fn authenticate_rejects_wrong_password() {
        let users = [active("Admin", "admin", "123", Role::Admin)];
        let err = authenticate(&users, "admin", "wrong").unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn authenticate_rejects_unknown_user() {
        let err = authenticate(&[], "ghost", "pw").unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn pending_and_inactive_accounts_cannot_log_in() {
        let mut pending = active("Maria", "maria", "pw", Role::User);
        pending.status = UserStatus::Pending;
        let mut inactive = active("José", "jose", "pw", Role::User);
        inactive.status = UserStatus::Inactive;

        let users = [pending, inactive];
        assert!(authenticate(&users, "maria", "pw").is_err());
        assert!(authenticate(&users, "jose", "pw").is_err());
    }
}

/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the sign-up, verification, login
 * and current-user handlers.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::users::User;

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    /// User's chosen username (3-30 chars, alphanumeric + underscore)
    pub username: String,
    pub email: String,
    /// Plain password, hashed before storage
    pub password: String,
}

/// Login request
///
/// `username` may also hold the account's email address.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct VerificationRequest {
    pub token: String,
}

/// Returned by login; the token is also set as the session cookie
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// User information safe to return to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            verified: user.verified,
        }
    }
}

//! Authentication Module
//!
//! User accounts, email verification and JWT cookie sessions.
//!
//! - **`users`** - User model and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`cookies`** - Session cookie formatting and extraction
//! - **`handlers`** - HTTP handlers for the `/api/auth/*` endpoints
//!
//! # Authentication Flow
//!
//! 1. **Sign-up**: username, email, password → unverified user + mailed verification link
//! 2. **Verification**: token from the link → account verified
//! 3. **Login**: credentials of a verified account → JWT in the `token` cookie
//! 4. **Logout**: cookie expired
//!
//! Passwords are hashed with bcrypt and never returned.

pub mod users;
pub mod sessions;
pub mod cookies;
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest, UserResponse, VerificationRequest};
pub use handlers::{get_me, login, logout, signup, verify_user};

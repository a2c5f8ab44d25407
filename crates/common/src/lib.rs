// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between blog clients and the auth service.
//! This module defines the request/response bodies of every exposed operation.

use serde::{Deserialize, Serialize};

/// Register a new account
/// # Fields
/// * `username` - 4 to 20 characters, unique
/// * `email` - 7 to 35 characters, unique
/// * `password` - 8 to 120 characters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Authenticate with a username or an email plus password
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Either the username or the email of the account
    pub login: String,
    pub password: String,
}

/// Returned by both `Signup` and `Login`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Signed identity token
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsernameUsedRequest {
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmailUsedRequest {
    pub email: String,
}

/// Answer to a username/email probe.
/// A `false` answer is not a reservation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedResponse {
    pub used: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUserRequest {
    pub token: String,
}

/// Identity asserted by a valid token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Error body returned for every failed operation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `CONFLICT_001`
    pub code: String,
    /// Human-readable message safe to show to the caller
    pub message: String,
}

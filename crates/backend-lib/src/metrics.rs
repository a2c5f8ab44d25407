// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SIGNUP_OK: &str = "auth.signup.ok";
pub const SIGNUP_CONFLICT: &str = "auth.signup.conflict";
pub const LOGIN_OK: &str = "auth.login.ok";
pub const LOGIN_REJECTED: &str = "auth.login.rejected";
pub const TOKEN_REJECTED: &str = "auth.token.rejected";
pub const STORE_TIMEOUT: &str = "auth.store.timeout";

// ============================
// crates/backend-lib/src/models.rs
// ============================
//! Account record and the identity types derived from it.
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Persisted identity record.
///
/// Serialized field names are also the token payload format, so they
/// must stay stable across releases.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    /// PHC-formatted scrypt hash, never the plaintext
    #[serde(rename = "Password")]
    pub password_hash: String,
}

impl Account {
    /// Build a new account with a freshly generated id
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
        }
    }

    /// Identity fields that are safe to hand back to a caller
    pub fn claims(&self) -> IdentityClaims {
        IdentityClaims {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity asserted by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<IdentityClaims> for blogauth_common::AuthUserResponse {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            id: claims.id.to_string(),
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Signed, self-contained bearer token.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub(crate) fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_json_keys() {
        let account = Account::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$scrypt$hash".to_string(),
        );
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["Username"], "alice");
        assert_eq!(value["Email"], "alice@example.com");
        assert_eq!(value["Password"], "$scrypt$hash");
        assert_eq!(value["ID"], account.id.to_string());
    }

    #[test]
    fn test_fresh_ids_differ() {
        let a = Account::new("alice".into(), "a@example.com".into(), "h".into());
        let b = Account::new("alice".into(), "a@example.com".into(), "h".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = IdentityToken::new("secret.token.value".to_string());
        assert_eq!(format!("{token:?}"), "IdentityToken(..)");
    }
}

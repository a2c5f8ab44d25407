// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed identity tokens.
//!
//! A token is a compact HS256 JWT whose only claim, `data`, holds the JSON
//! serialized account snapshot. There is no expiry claim; a token stays valid
//! for as long as the signing secret does.
use crate::models::{Account, IdentityToken};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens are always HS256; anything else is rejected on decode
const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(String),

    /// Bad signature, malformed structure or unparseable payload
    #[error("invalid token")]
    Decode,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    data: String,
}

/// Encodes and verifies identity tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a snapshot of `account`
    pub fn encode(&self, account: &Account) -> Result<IdentityToken, TokenError> {
        let data = serde_json::to_string(account).map_err(|e| TokenError::Encode(e.to_string()))?;
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &TokenClaims { data },
            &self.encoding,
        )
        .map_err(|e| TokenError::Encode(e.to_string()))?;
        Ok(IdentityToken::new(token))
    }

    /// Verify the signature, then recover the snapshot.
    /// The payload is never read unless the signature checks out.
    pub fn decode(&self, token: &str) -> Result<Account, TokenError> {
        let verified = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Decode)?;
        serde_json::from_str(&verified.claims.data).map_err(|_| TokenError::Decode)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

//! HTTP handlers. They only marshal; behavior lives in the credential service.

pub mod auth;

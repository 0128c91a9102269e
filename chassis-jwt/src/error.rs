// Error types for token operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token missing")]
    MissingCredential,

    #[error("authorization header must be of the form: Bearer <token>")]
    MalformedCredential,

    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

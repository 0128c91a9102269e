// Token claim structures

use serde::{Deserialize, Serialize};

/// The authenticated identity embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    pub id: i64,
    /// Primary account id.
    pub account_id: i64,
    /// Business-side account id.
    pub business_id: i64,
    /// Identity at an external provider.
    pub external_id: String,
    pub name: String,
    pub username: String,
}

/// Wire form of a token payload: user claims beside the registered fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub user: UserClaims,

    /// Subject: the user id as a string.
    pub sub: String,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Bare user id attached to the request extensions for fast access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

// Token service: issue, verify, refresh

use crate::{AuthConfig, AuthError, Result, TokenClaims, UserClaims};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Stateless token operations over one shared secret.
#[derive(Clone)]
pub struct TokenService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token for the given claims: subject is the user id, expiry is
    /// now plus the effective duration.
    pub fn issue(&self, claims: &UserClaims) -> Result<String> {
        let now = Utc::now();
        let payload = TokenClaims {
            user: claims.clone(),
            sub: claims.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.config.effective_duration()).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Reissue with a fresh expiry and identical claims. The presented token
    /// must still be valid: an expired token cannot be refreshed and the
    /// subject never changes.
    pub fn refresh(&self, token: &str) -> Result<String> {
        let claims = self.verify(token)?;
        self.issue(&claims.user)
    }

    /// The unix expiry a token issued right now would carry.
    pub fn token_deadline(&self) -> i64 {
        (Utc::now() + self.config.effective_duration()).timestamp()
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn sign_raw(&self, payload: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), payload, &self.encoding_key)
            .map_err(AuthError::Signing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserClaims {
        UserClaims {
            id: 42,
            account_id: 1,
            business_id: 2,
            external_id: "wx-42".to_string(),
            name: "Alice".to_string(),
            username: "alice".to_string(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(AuthConfig::new("test-secret"))
    }

    #[test]
    fn test_round_trip() {
        let service = service();
        let token = service.issue(&user()).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user, user());
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_issue_respects_effective_duration() {
        let service = TokenService::new(AuthConfig::new("s").with_effective_minutes(30));
        let before = service.token_deadline();
        let token = service.issue(&user()).unwrap();
        let claims = service.verify(&token).unwrap();

        // Deadline computed just before issuing brackets the token's expiry.
        assert!((claims.exp - before).abs() <= 1);
        assert!(claims.exp - claims.iat >= 29 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let stale = TokenClaims {
            user: user(),
            sub: "42".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.sign_raw(&stale).unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(&user()).unwrap();
        let other = TokenService::new(AuthConfig::new("other-secret"));

        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_refresh_keeps_claims() {
        let service = service();
        let token = service.issue(&user()).unwrap();
        let refreshed = service.refresh(&token).unwrap();
        let claims = service.verify(&refreshed).unwrap();

        assert_eq!(claims.user, user());
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn test_refresh_requires_valid_token() {
        let service = service();
        let now = Utc::now().timestamp();
        let stale = TokenClaims {
            user: user(),
            sub: "42".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.sign_raw(&stale).unwrap();

        assert!(matches!(service.refresh(&token), Err(AuthError::Expired)));
    }
}

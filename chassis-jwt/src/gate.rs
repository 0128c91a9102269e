// Auth gate: verifies the bearer token on every non-whitelisted request

use crate::claims::UserId;
use crate::{AuthError, TokenService, Whitelist};
use async_trait::async_trait;
use chassis_core::{Error, Gate, GateDecision, HttpRequest, HttpResponse};

/// Pipeline gate enforcing `Authorization: Bearer <token>`.
///
/// A whitelisted path skips the gate entirely. On success the whole claims
/// object and the bare user id are attached to the request extensions; any
/// failure answers 401 immediately and aborts the pipeline.
pub struct AuthGate {
    service: TokenService,
    whitelist: Whitelist,
}

impl AuthGate {
    pub fn new(service: TokenService, whitelist: Whitelist) -> Self {
        Self { service, whitelist }
    }

    pub fn service(&self) -> &TokenService {
        &self.service
    }

    fn bearer_token<'a>(&self, header: &'a str) -> Result<&'a str, AuthError> {
        let (scheme, token) = header
            .split_once(' ')
            .ok_or(AuthError::MalformedCredential)?;
        if scheme != "Bearer" {
            return Err(AuthError::MalformedCredential);
        }
        Ok(token)
    }
}

#[async_trait]
impl Gate for AuthGate {
    async fn apply(&self, request: &mut HttpRequest) -> Result<GateDecision, Error> {
        if self.whitelist.is_exempt(&request.path) {
            return Ok(GateDecision::Continue);
        }

        let Some(header) = request.header("Authorization").cloned() else {
            return Ok(unauthorized(AuthError::MissingCredential));
        };

        let token = match self.bearer_token(&header) {
            Ok(token) => token,
            Err(e) => return Ok(unauthorized(e)),
        };

        match self.service.verify(token) {
            Ok(claims) => {
                request.extensions.insert(UserId(claims.user.id));
                request.extensions.insert(claims.user);
                Ok(GateDecision::Continue)
            }
            Err(e) => Ok(unauthorized(e)),
        }
    }
}

fn unauthorized(err: AuthError) -> GateDecision {
    GateDecision::Respond(HttpResponse::failure(401, err.to_string()))
}

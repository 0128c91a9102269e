// Error types for the Chassis framework

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("data store error: {0}")]
    Store(String),

    #[error("boot failure: {0}")]
    Boot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by this error when it reaches the transport edge.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) | Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::BadRequest(_) | Error::Deserialization(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            Error::Conflict(_) => 409,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::RouteNotFound("GET /x".into()).status_code(), 404);
        assert_eq!(Error::Unauthorized("no token".into()).status_code(), 401);
        assert_eq!(Error::BadRequest("bad".into()).status_code(), 400);
        assert_eq!(Error::Store("down".into()).status_code(), 500);
    }

    #[test]
    fn test_error_classes() {
        assert!(Error::BadRequest("x".into()).is_client_error());
        assert!(Error::Internal("x".into()).is_server_error());
        assert!(!Error::Unauthorized("x".into()).is_server_error());
    }
}

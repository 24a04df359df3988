use thiserror::Error;

/// Everything that can go wrong on a gateway call.
///
/// HTTP failures keep the status and the backend-provided message; callers decide what a given
/// status means for them (eg, a 422 from `/auth/register` is a validation failure).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// Access credential was rejected and the session could not be refreshed. Stored credentials
    /// have already been cleared when this is returned.
    #[error("session expired (HTTP {status}: {message}); login required")]
    SessionExpired {
        status: u16,
        message: String,
        #[source]
        reason: Box<ApiError>,
    },

    #[error("no refresh credential stored")]
    NotAuthenticated,

    /// Body didn't match the expected payload (or a request body couldn't be encoded)
    #[error("JSON encoding or decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("credential storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }

    /// HTTP status associated with the failure, if any. A `SessionExpired` reports the status of
    /// the original rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::SessionExpired { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[test]
fn test_status() {
    let err = ApiError::Http {
        status: 404,
        message: "post not found".to_string(),
        code: None,
    };
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "HTTP 404: post not found");
    assert!(!err.is_unauthorized());

    let err = ApiError::SessionExpired {
        status: 401,
        message: "token expired".to_string(),
        reason: Box::new(ApiError::NotAuthenticated),
    };
    assert!(err.is_unauthorized());
    assert!(ApiError::NotAuthenticated.status().is_none());

    let err: ApiError = serde_json::from_str::<serde_json::Value>("<html>")
        .unwrap_err()
        .into();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(err.status().is_none());
}

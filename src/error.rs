use http::StatusCode;

/// Missing or unusable configuration. Fatal: surfaced at startup, never recovered per request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Why a cart token was rejected.
///
/// Callers treat every variant the same way (no cart session); the distinction only exists for
/// logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidToken {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// Failure to produce a token for a cart.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("cart id must not be empty")]
    EmptyCartId,

    #[error("signing key was rejected")]
    InvalidKey,

    #[error("failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure talking to the remote storefront API.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    #[error("storefront request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Shopify API error: {0}")]
    Status(StatusCode),

    /// Top-level GraphQL `errors`, messages joined with newlines.
    #[error("{0}")]
    GraphQl(String),

    /// Mutation `userErrors`, messages joined with newlines.
    #[error("{0}")]
    UserErrors(String),

    #[error("storefront response is missing `{0}`")]
    MissingData(&'static str),
}

/// Errors surfaced by cart session operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The request was rejected locally before contacting the storefront.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error(transparent)]
    Token(#[from] IssueError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl CartError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status used when this error reaches a client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Storefront(_) | Self::Token(_) | Self::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
